//! HTTP surface: `POST /api/chat` plus health checks.

mod chat;
mod error;
mod health;

pub use chat::chat_routes;
pub use error::ApiError;
pub use health::health_routes;

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::relay::TurnRelay;

const MAX_BODY_SIZE_1MB: usize = 1024 * 1024;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<TurnRelay>,
    /// Cancelled on shutdown; in-flight turns stop polling.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(relay: TurnRelay, shutdown: CancellationToken) -> Self {
        Self {
            relay: Arc::new(relay),
            shutdown,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(chat_routes())
        .merge(health_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_1MB))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    ApiError::internal().into_response()
}

/// Serve until `shutdown` is cancelled.
pub async fn start_server(config: &RelayConfig, shutdown: CancellationToken) -> Result<()> {
    let relay = TurnRelay::from_config(config)?;
    let app = router(
        AppState::new(relay, shutdown.clone()),
        &config.server.allowed_origins,
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| RelayError::configuration(format!("Invalid address: {e}")))?;

    tracing::info!("Starting chat relay on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Chat relay stopped");
    Ok(())
}
