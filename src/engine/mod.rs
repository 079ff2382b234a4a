//! Fetch engine
//!
//! This module contains the download machinery, including:
//! - HTTP fetching with a bounded request time
//! - Fetch jobs and their `Queued -> InFlight -> Completed` lifecycle
//! - A fixed-size worker pool consuming a bounded job queue
//! - Completion events, one per attempt, delivered over a channel

mod fetcher;
mod job;
mod pool;

pub use fetcher::{build_http_client, fetch_url, FetchError, FetchSuccess};
pub use job::{FetchCompletion, FetchJob, JobKind, JobState};
pub use pool::{EngineHandle, EngineSnapshot, EngineStats, FetchEngine};

use thiserror::Error;

/// Errors returned to engine submitters
///
/// A full queue is not an error: submitters wait for space instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Fetch engine is shut down")]
    Closed,
}
