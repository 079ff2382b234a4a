//! Store trait and error types
//!
//! This module defines the trait interface for statistics stores and the
//! associated error types.

use crate::store::{OrderKey, StoreSummary, UrlRecord};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("URL not found: {0}")]
    NotFound(String),

    #[error("URL already registered: {0}")]
    AlreadyExists(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for per-URL statistics stores
///
/// Implementations must be safe to share between the fetch workers, the
/// re-check scheduler and request handlers. Every operation is atomic with
/// respect to the record it touches, and no operation hands out a reference
/// into the store: readers always receive independent copies.
pub trait StatsStore: Send + Sync {
    /// Returns true if a record exists for `url`
    fn exists(&self, url: &str) -> bool;

    /// Creates a record with one hit and zeroed download counters
    ///
    /// # Errors
    ///
    /// * `StoreError::AlreadyExists` - `url` is already registered; the
    ///   existing record is left untouched
    fn register_new(&self, url: &str) -> StoreResult<()>;

    /// Increments the hit counter of `url` and returns the new count
    fn increment_hit(&self, url: &str) -> StoreResult<u64>;

    /// Records the outcome of one download attempt
    ///
    /// Overwrites the last byte count and download time, and increments the
    /// success or failure counter.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` - `url` is not registered; nothing is mutated
    fn record_fetch_outcome(
        &self,
        url: &str,
        success: bool,
        bytes: u64,
        elapsed: Duration,
    ) -> StoreResult<()>;

    /// Returns a copy of the record for `url`
    fn get(&self, url: &str) -> Option<UrlRecord>;

    /// Returns copies of all records, ordered and truncated to `limit`
    ///
    /// Each key is applied as a full stable sort pass, in order, so the last
    /// key dominates and earlier keys only break its ties.
    fn list(&self, order: &[OrderKey], limit: usize) -> Vec<UrlRecord>;

    /// Returns the `n` records with the most hits, most hits first
    fn top_by_hits(&self, n: usize) -> Vec<UrlRecord> {
        self.list(&[OrderKey::HitCountDesc], n)
    }

    /// Removes the record for `url`
    fn delete(&self, url: &str) -> StoreResult<()>;

    /// Number of registered URLs
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregated counters over all records
    fn summary(&self) -> StoreSummary;
}
