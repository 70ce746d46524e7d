use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How sure the model is about a single medication record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    /// Also used for missing or unrecognised values.
    #[default]
    #[serde(other)]
    Low,
}

/// One medication line extracted from a prescription.
///
/// Decoding is lenient about what models commonly get wrong: numeric
/// dosages, `null` strings and missing optional fields. Use
/// [`is_complete`](Self::is_complete) to check the required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    /// Generic name when known, otherwise the brand name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Numeric part of the dose, kept as text (`"500"`, `"0.5"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dosage_unit: String,
    /// Plain-English frequency such as `"twice daily"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub frequency: String,
    /// Suggested administration times as `HH:MM`, in order.
    #[serde(default, deserialize_with = "lenient_times")]
    pub times: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: Confidence,
}

impl MedicationRecord {
    /// True when name, dosage, frequency and at least one time are present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.dosage.trim().is_empty()
            && !self.frequency.trim().is_empty()
            && !self.times.is_empty()
    }
}

/// Everything extracted from one prescription.
///
/// `medications` is never empty when returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionExtraction {
    pub medications: Vec<MedicationRecord>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub pharmacy_name: Option<String>,
}

impl PrescriptionExtraction {
    /// Number of records failing [`MedicationRecord::is_complete`].
    pub fn incomplete_count(&self) -> usize {
        self.medications.iter().filter(|m| !m.is_complete()).count()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

fn lenient_times<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_confidence<'de, D>(deserializer: D) -> Result<Confidence, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Confidence>::deserialize(deserializer)?.unwrap_or_default())
}
