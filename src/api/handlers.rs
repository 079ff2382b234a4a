//! Request handlers
//!
//! Thin adapters: parse the request, call the tracker, encode the answer.

use crate::api::AppState;
use crate::engine::EngineSnapshot;
use crate::store::{OrderKey, StoreSummary, UrlRecord};
use crate::UrlStatsError;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query string of the list route
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Comma-separated order keys, e.g. `hitCountDesc,createdAt`
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
}

/// Body of the submit route
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub url: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_count: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub store: StoreSummary,
    pub engine: EngineSnapshot,
}

/// Errors turned into HTTP responses
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl From<UrlStatsError> for ApiError {
    fn from(error: UrlStatsError) -> Self {
        match error {
            UrlStatsError::Url(e) => Self::BadRequest(e.to_string()),
            UrlStatsError::Engine(e) => Self::Unavailable(e.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
            Self::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

/// `GET /` - records ordered by `orderBy`, capped at the configured maximum
pub async fn list_urls(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<UrlRecord>> {
    let order = OrderKey::parse_list(query.order_by.as_deref().unwrap_or_default());
    Json(state.tracker.list(&order, state.max_results))
}

/// `POST /` - submits one URL
///
/// Waits for queue space when the URL is new and the engine is saturated.
pub async fn submit_url(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let submission = state.tracker.submit(&request.url).await?;
    tracing::debug!(url = %request.url, status = submission.status(), "URL submitted");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            url: request.url,
            status: submission.status(),
            hit_count: submission.hit_count(),
        }),
    ))
}

/// `GET /stats` - store totals and engine counters
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        store: state.tracker.store().summary(),
        engine: state.tracker.engine().stats(),
    })
}
