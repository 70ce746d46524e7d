//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (request IDs, logging, timeout, compression, CORS)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::middleware::{envelope_timeouts, log_requests, request_id};
use crate::routes::{api_info, health, medication, method_not_allowed, not_found};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use extract::{GeminiClient, GenerativeModel};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// How often buffered histogram samples are folded into the registry
const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// CORS policy for the `/api` routes
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring_invalid_cors_origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Build the Axum router with all routes and middleware
///
/// - Host routes: `/`, `/health`, `/metrics`
/// - API routes: `/api/process-medication-image`, `/api/process-medication-text`
///
/// Layers run outermost first: request ID, request logging, tracing,
/// timeout enveloping, timeout, compression. CORS, the body limit and the
/// 405 fallback apply to `/api` only.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/process-medication-image",
            post(medication::process_medication_image),
        )
        .route(
            "/process-medication-text",
            post(medication::process_medication_text),
        )
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(cors_layer(&state.config));

    Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(from_fn(envelope_timeouts))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .with_state(state)
}

/// Start the SehatYaad HTTP server
///
/// Initializes logging, builds the Gemini client and metrics recorder, then
/// serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     config.validate()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    health::mark_start();

    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(&config.gemini)?);
    let mut state = ServerState::new(config.clone(), model);
    if config.metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        spawn_metrics_upkeep(handle.clone(), METRICS_UPKEEP_INTERVAL);
        state = state.with_metrics(handle);
    }

    let app = build_router(Arc::new(state));

    // Parse bind address
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        addr = %addr,
        environment = %config.environment,
        model = %config.gemini.model,
        "server_starting"
    );
    tracing::info!(
        timeout_secs = config.timeout_secs,
        max_body_size_mb = config.max_body_size_mb,
        allowed_origins = ?config.allowed_origins,
        metrics_enabled = config.metrics_enabled,
        "server_limits"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server_shutdown_complete");
    Ok(())
}

/// Drain the recorder's histogram buffers on a fixed period
///
/// `install_recorder` leaves upkeep to the caller; without it samples only
/// drain when `/metrics` is scraped.
pub fn spawn_metrics_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received_ctrl_c"),
        _ = terminate => tracing::info!("received_sigterm"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn metrics_upkeep_keeps_running() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::histogram!("prescription_extraction_seconds", "endpoint" => "text")
                .record(0.25);
        });

        let task = spawn_metrics_upkeep(handle.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());
        task.abort();

        let rendered = handle.render();
        assert!(rendered.contains("prescription_extraction_seconds"));
    }
}
