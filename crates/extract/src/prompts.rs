//! Fixed instruction templates sent ahead of every prescription payload.
//!
//! Both templates share the abbreviation tables, extraction rules and output
//! shape; only the framing differs between an image and a free-text
//! description. The model's reply is expected to follow `OUTPUT FORMAT`, which
//! mirrors [`PrescriptionExtraction`](crate::PrescriptionExtraction).

macro_rules! expert_preamble {
    () => {
        "You are an expert medical prescription analyzer with deep knowledge of:
- Common medication names and their variants
- Standard dosage formats and units
- Prescription abbreviations (Latin and common)
- Typical prescription layouts
"
    };
}

macro_rules! extraction_rules {
    () => {
        "
IMPORTANT CONTEXT:
- Common abbreviations to recognize:
  * Dosing: OD/QD(once), BID/BD(twice), TID/TD(3x), QID(4x), PRN(as needed)
  * Units: mg(milligram), ml(milliliter), IU(units), mcg(microgram), gm(gram), tab(tablet), cap(capsule)
  * Routes: PO(oral), IV(intravenous), IM(intramuscular), TOP(topical)
  * Timing: HS(bedtime), AC(before meals), PC(after meals), STAT(immediately)

EXTRACTION RULES:
1. Medication Name: Use generic name if available, otherwise brand name
2. Dosage: Extract numeric value only (without unit)
3. Dosage Unit: Extract unit separately (mg, ml, IU, tab, cap, etc.)
4. Frequency: Convert ALL abbreviations to plain English:
   - \"OD\"/\"QD\"/\"Once\" -> \"once daily\"
   - \"BID\"/\"BD\"/\"Twice\" -> \"twice daily\"
   - \"TID\"/\"TD\" -> \"three times daily\"
   - \"QID\" -> \"four times daily\"
   - \"HS\" -> \"at bedtime\"
   - \"PRN\" -> \"as needed\"
5. Times: Suggest appropriate times based on frequency:
   - once daily -> [\"08:00\"]
   - twice daily -> [\"08:00\", \"20:00\"]
   - three times daily -> [\"08:00\", \"14:00\", \"20:00\"]
   - four times daily -> [\"08:00\", \"12:00\", \"16:00\", \"20:00\"]
   - at bedtime -> [\"22:00\"]
6. Instructions: Extract any special notes (with food, avoid alcohol, etc.)
7. Confidence:
   - \"high\" if text is very clear and complete
   - \"medium\" if readable but some uncertainty
   - \"low\" if hard to read or incomplete

OUTPUT FORMAT (JSON only, NO markdown, NO explanations):
{
  \"medications\": [
    {
      \"name\": \"medication name\",
      \"dosage\": \"100\",
      \"dosageUnit\": \"mg\",
      \"frequency\": \"once daily\",
      \"times\": [\"08:00\"],
      \"instructions\": \"take with food\",
      \"confidence\": \"high\"
    }
  ],
  \"doctorName\": \"Dr. Name (if visible)\",
  \"date\": \"YYYY-MM-DD (if visible)\",
  \"pharmacyName\": \"Pharmacy name (if visible)\"
}

Use null for doctorName, date or pharmacyName when they are not present.

CRITICAL: Return ONLY valid JSON. No markdown code blocks, no extra text.
"
    };
}

/// Template sent before the inline prescription image.
pub const IMAGE_EXTRACTION_PROMPT: &str = concat!(
    expert_preamble!(),
    "
TASK: Extract structured medication data from this prescription image.
- Prescriptions may be handwritten or printed
",
    extraction_rules!(),
    "
Now analyze this prescription image carefully:
"
);

/// Template sent before the patient's free-text description.
pub const TEXT_EXTRACTION_PROMPT: &str = concat!(
    expert_preamble!(),
    "
TASK: Extract structured medication data from the patient's own description
of their prescription, given after this message.
- The description may be informal, misspelled, or mix brand and generic names
- When the description states explicit times or meal timing, prefer those
  over the suggested times below (e.g. \"after breakfast\" -> \"08:00\",
  \"after dinner\" -> \"20:00\", \"before bed\" -> \"22:00\")
- Only include medications the description actually mentions
",
    extraction_rules!(),
    "
Now analyze the following prescription description carefully:
"
);

/// Which kind of payload accompanies a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionSource {
    Image,
    Text,
}

impl ExtractionSource {
    /// Template to send ahead of the payload.
    pub fn template(self) -> &'static str {
        match self {
            ExtractionSource::Image => IMAGE_EXTRACTION_PROMPT,
            ExtractionSource::Text => TEXT_EXTRACTION_PROMPT,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionSource::Image => "image",
            ExtractionSource::Text => "text",
        }
    }
}
