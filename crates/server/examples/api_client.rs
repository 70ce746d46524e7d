//! Example calls against a running SehatYaad server
//!
//! ```text
//! cargo run -p sehatyaad-server --example api_client -- path/to/prescription.jpg
//! ```

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Free-text description
    println!("2. Process Prescription Text:");
    let resp = client
        .post(format!("{SERVER_URL}/api/process-medication-text"))
        .json(&json!({
            "text": "I take 500mg Metformin every morning after breakfast and Atorvastatin 10mg at night"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Blank text is rejected before the model is called
    println!("3. Blank Text:");
    let resp = client
        .post(format!("{SERVER_URL}/api/process-medication-text"))
        .json(&json!({ "text": "   " }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: Image upload, if a path was given
    if let Some(path) = std::env::args().nth(1) {
        println!("4. Process Prescription Image ({path}):");
        let bytes = tokio::fs::read(&path).await?;
        let filename = std::path::Path::new(&path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prescription.jpg".to_string());

        let form = Form::new().part("image", Part::bytes(bytes).file_name(filename));
        let resp = client
            .post(format!("{SERVER_URL}/api/process-medication-image"))
            .multipart(form)
            .send()
            .await?;
        println!("Status: {}", resp.status());
        println!("Body: {}", resp.text().await?);
    } else {
        println!("4. Skipping image upload (pass a file path to try it)");
    }

    Ok(())
}
