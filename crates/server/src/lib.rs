//! SehatYaad Server - HTTP API for prescription extraction
//!
//! Exposes the extraction pipeline over HTTP. Patients upload a photo of a
//! prescription, or type what their doctor prescribed, and get back a list
//! of structured medication records.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     config.validate()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /metrics` - Prometheus metrics
//! - `POST /api/process-medication-image` - multipart upload, field `image`
//! - `POST /api/process-medication-text` - JSON body `{"text": "..."}`
//!
//! Every `/api` response uses the envelope `{"success": true, "data": ...}`
//! or `{"success": false, "error": "..."}`.
//!
//! # Testing without the network
//!
//! [`ServerState::new`] takes any [`extract::GenerativeModel`], so tests
//! build the router around [`extract::FakeModel`] and drive it with
//! `tower::ServiceExt::oneshot`.

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use envelope::ResponseEnvelope;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
