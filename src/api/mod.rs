//! HTTP API
//!
//! ```text
//! GET  /?orderBy=a,b  - list records, capped at max-urls-in-search-results
//! POST /              - submit {"url": "..."}
//! GET  /stats         - store totals and engine counters
//! ```

mod handlers;

pub use handlers::{ApiError, ListQuery, StatsResponse, SubmitRequest, SubmitResponse};

use crate::config::ServerConfig;
use crate::tracker::Tracker;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    pub max_results: usize,
}

/// Builds the router with tracing, CORS and request timeout layers
pub fn build_router(tracker: Tracker, config: &ServerConfig) -> Router {
    let state = AppState {
        tracker,
        max_results: config.max_urls_in_search_results as usize,
    };

    Router::new()
        .route("/", get(handlers::list_urls).post(handlers::submit_url))
        .route("/stats", get(handlers::stats))
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any http(s) origin may call the API; no credentials are involved
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.as_bytes().starts_with(b"https://") || origin.as_bytes().starts_with(b"http://")
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300))
}

/// Binds the configured address and serves until `shutdown` resolves
pub async fn serve<F>(tracker: Tracker, config: &ServerConfig, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let ip: IpAddr = config.bind_address.parse().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid bind address '{}': {}", config.bind_address, e),
        )
    })?;
    let address = SocketAddr::new(ip, config.http_port);

    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(tracker, config))
        .with_graceful_shutdown(shutdown)
        .await
}
