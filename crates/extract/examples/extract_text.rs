//! Send a free-text prescription description to Gemini and print the result.
//!
//! ```text
//! GEMINI_API_KEY=... cargo run -p rx-extract --example extract_text -- \
//!     "Amoxicillin 500mg three times a day for a week"
//! ```

use std::sync::Arc;

use extract::{GeminiClient, GeminiConfig, PrescriptionGateway};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "I take Metformin 500mg after breakfast and dinner".to_string());

    let config = GeminiConfig {
        api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
        ..Default::default()
    };
    let gateway = PrescriptionGateway::new(Arc::new(GeminiClient::new(&config)?));

    let extraction = gateway.extract_from_text(&text).await?;
    for med in &extraction.medications {
        println!(
            "{} {}{} | {} | {:?} | confidence={:?}",
            med.name, med.dosage, med.dosage_unit, med.frequency, med.times, med.confidence
        );
        if !med.is_complete() {
            println!("  (incomplete record)");
        }
    }
    println!("{}", serde_json::to_string_pretty(&extraction)?);
    Ok(())
}
