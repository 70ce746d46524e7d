//! SehatYaad extraction layer
//!
//! Sends a prescription (an image or a free-text description) to a
//! generative model together with a fixed instruction template, then turns
//! the reply into a typed [`PrescriptionExtraction`].
//!
//! ## Pieces
//!
//! - [`GenerativeModel`] is the seam to the model provider. [`GeminiClient`]
//!   talks to the Gemini REST API; [`FakeModel`] answers with a canned reply.
//! - [`PrescriptionGateway`] builds the request, cleans the reply with
//!   [`extract_json_body`] and decodes it with [`parse_extraction`].
//! - [`ExtractError`] separates caller-facing failures (bad input, unusable
//!   reply) from upstream ones.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use extract::{FakeModel, PrescriptionGateway};
//!
//! # tokio_test::block_on(async {
//! let model = Arc::new(FakeModel::replying(
//!     r#"{"medications": [{"name": "Metformin", "dosage": "500", "dosageUnit": "mg",
//!        "frequency": "once daily", "times": ["08:00"], "confidence": "high"}]}"#,
//! ));
//! let gateway = PrescriptionGateway::new(model);
//!
//! let extraction = gateway.extract_from_text("Metformin 500mg once a day").await.unwrap();
//! assert_eq!(extraction.medications[0].name, "Metformin");
//! # });
//! ```
mod config;
mod error;
mod fake;
mod gateway;
mod gemini;
mod json;
mod model;
mod prompts;
mod types;

pub use crate::config::{GeminiConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
pub use crate::error::ExtractError;
pub use crate::fake::FakeModel;
pub use crate::gateway::{parse_extraction, PrescriptionGateway};
pub use crate::gemini::GeminiClient;
pub use crate::json::extract_json_body;
pub use crate::model::{GenerativeModel, Part};
pub use crate::prompts::{ExtractionSource, IMAGE_EXTRACTION_PROMPT, TEXT_EXTRACTION_PROMPT};
pub use crate::types::{Confidence, MedicationRecord, PrescriptionExtraction};
