//! Submission handling
//!
//! A submission either counts a hit on a registered URL or queues the URL's
//! first download. Registration itself happens later, when that download
//! succeeds.

use crate::engine::EngineHandle;
use crate::store::{StatsStore, StoreError};
use crate::{UrlError, UrlStatsError};
use url::Url;

/// Result of one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The URL was already registered; its hit counter was incremented
    Counted { hit_count: u64 },

    /// The URL is new; its first download was queued
    Queued,
}

impl Submission {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Counted { .. } => "counted",
            Self::Queued => "queued",
        }
    }

    /// Hit count after the submission, when the URL was already registered
    pub fn hit_count(&self) -> Option<u64> {
        match self {
            Self::Counted { hit_count } => Some(*hit_count),
            Self::Queued => None,
        }
    }
}

/// Checks that `raw` is an absolute http(s) URL with a host
///
/// The URL itself is stored exactly as submitted; this only rejects input
/// that could never be downloaded.
pub fn validate_url(raw: &str) -> Result<(), UrlError> {
    let parsed = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(())
}

/// Counts a hit on a registered URL, or queues a new-URL download
///
/// Waits for queue space when the engine queue is full.
pub async fn submit_url(
    store: &dyn StatsStore,
    engine: &EngineHandle,
    url: &str,
) -> Result<Submission, UrlStatsError> {
    if store.exists(url) {
        match store.increment_hit(url) {
            Ok(hit_count) => return Ok(Submission::Counted { hit_count }),
            // Deleted between the two calls: treat it as new again
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(url, "URL vanished before its hit was counted")
            }
            Err(e) => return Err(e.into()),
        }
    }

    engine.submit_new(url).await?;
    Ok(Submission::Queued)
}
