//! HTTP telemetry server.
//!
//! Serves a JSON backfill of the last 12 hours at one-minute resolution and a
//! server-sent event feed that pushes one freshly generated sample per second.
//! There is no shared application state: every request stands alone.

pub mod live;

use axum::{
    Router,
    http::header,
    response::{IntoResponse, Json, sse::Sse},
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;

use streamdash_core::{TelemetrySample, historical_window, now_ms};

pub use live::{FeedState, LIVE_INTERVAL, LiveFeed};

/// Bind address for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_historical() -> Json<Vec<TelemetrySample>> {
    Json(historical_window(now_ms()))
}

async fn handle_metrics() -> impl IntoResponse {
    log::debug!("live feed connection opened");
    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(LiveFeed::new(LIVE_INTERVAL)),
    )
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: streamdash_core::VERSION,
    })
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "streamdash server",
        "version": streamdash_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/historical": {
                "method": "GET",
                "description": "Backfill: 721 samples one minute apart, oldest first, newest stamped now",
            },
            "/metrics": {
                "method": "GET",
                "description": "Server-sent events, one JSON sample per second until the client disconnects",
            },
            "/health": "Health check",
        },
    }))
}

/// Build the axum router.
pub fn build_router() -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/historical", get(handle_historical))
        .route("/metrics", get(handle_metrics))
        .route("/health", get(handle_health))
}

/// Serve on an already-bound listener until the process stops.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("streamdash server listening on http://{addr}");
    }
    axum::serve(listener, build_router()).await
}

/// Bind `config.addr()` and serve.
pub async fn run_server(config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.addr()).await?;
    serve(listener).await
}
