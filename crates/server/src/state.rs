use crate::config::ServerConfig;
use extract::{GenerativeModel, PrescriptionGateway};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Extraction gateway (shared across requests)
    pub gateway: Arc<PrescriptionGateway>,

    /// Prometheus render handle; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state around an already-built model client
    pub fn new(config: ServerConfig, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(PrescriptionGateway::new(model)),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `GET /metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
