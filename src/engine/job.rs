//! Fetch job definitions and the per-job state machine

use crate::engine::fetcher::{FetchError, FetchSuccess};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Why a URL is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// First download of a submitted URL that is not registered yet
    New,

    /// Periodic re-check of a registered URL
    Recheck,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Recheck => "recheck",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of one fetch job
///
/// `Queued -> InFlight -> Completed`. There is no retry state: a completed
/// job is terminal whatever its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Queued,
    InFlight,
    Completed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::InFlight) | (Self::InFlight, Self::Completed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::InFlight => "in-flight",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A unit of fetch work waiting in, or taken from, the engine queue
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub url: String,
    pub kind: JobKind,
    state: JobState,
    enqueued_at: Instant,
}

impl FetchJob {
    pub fn new(url: impl Into<String>, kind: JobKind) -> Self {
        Self {
            url: url.into(),
            kind,
            state: JobState::Queued,
            enqueued_at: Instant::now(),
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Time since the job was submitted
    pub fn age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    /// Moves the job to `next`, returning false when the transition is not
    /// allowed
    pub fn advance(&mut self, next: JobState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }
}

/// Event emitted by a worker after every fetch attempt
#[derive(Debug, Clone)]
pub struct FetchCompletion {
    pub url: String,
    pub kind: JobKind,
    pub outcome: Result<FetchSuccess, FetchError>,
}

impl FetchCompletion {
    pub fn is_new(&self) -> bool {
        self.kind == JobKind::New
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Body size of the attempt; 0 for a failed attempt
    pub fn bytes(&self) -> u64 {
        self.outcome.as_ref().map_or(0, |success| success.bytes)
    }

    /// Duration of the attempt; zero for a failed attempt
    pub fn elapsed(&self) -> Duration {
        self.outcome
            .as_ref()
            .map_or(Duration::ZERO, |success| success.elapsed)
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }
}
