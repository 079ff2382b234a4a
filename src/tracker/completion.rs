//! Completion listener
//!
//! Applies fetch completion events to the store. Exactly one listener
//! consumes the engine's completion channel, so workers never wait on store
//! locks or on this policy.

use crate::engine::{FetchCompletion, JobKind};
use crate::store::{StatsStore, StoreError, StoreResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What applying one completion did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionEffect {
    /// A new URL was downloaded and registered
    Registered,

    /// A new-URL job finished for a URL another job had already registered;
    /// its submission was counted as a hit on the existing record
    Merged { hit_count: u64 },

    /// A new URL failed its first download and was not registered
    Dropped,

    /// A re-check outcome was recorded
    Rechecked,
}

/// Applies one completion event to `store`
///
/// # Policy
///
/// | Job | Outcome | Store calls |
/// |-----|---------|-------------|
/// | new | success | `register_new`, `record_fetch_outcome(true)` |
/// | new | failure, URL unknown | none |
/// | new | failure, URL registered | `increment_hit`, `record_fetch_outcome(false)` |
/// | recheck | any | `record_fetch_outcome(success)` |
///
/// # Errors
///
/// * `StoreError::NotFound` - a re-check finished for a URL that is not
///   registered. Canonical flows never produce this.
pub fn apply_completion(
    store: &dyn StatsStore,
    completion: &FetchCompletion,
) -> StoreResult<CompletionEffect> {
    let url = completion.url.as_str();

    if let Some(error) = completion.error() {
        tracing::warn!(url, kind = %completion.kind, "Download failed: {}", error);
    }

    match completion.kind {
        JobKind::New => {
            if !completion.is_success() {
                // A concurrent job for the same URL may have registered it;
                // this submission still counts as a hit on that record
                return match store.increment_hit(url) {
                    Ok(hit_count) => {
                        store.record_fetch_outcome(
                            url,
                            false,
                            completion.bytes(),
                            completion.elapsed(),
                        )?;
                        tracing::warn!(url, hit_count, "URL registered by a concurrent job");
                        Ok(CompletionEffect::Merged { hit_count })
                    }
                    Err(StoreError::NotFound(_)) => Ok(CompletionEffect::Dropped),
                    Err(e) => Err(e),
                };
            }

            let effect = match store.register_new(url) {
                Ok(()) => CompletionEffect::Registered,
                Err(StoreError::AlreadyExists(_)) => {
                    // Two submissions raced past the existence check
                    let hit_count = store.increment_hit(url)?;
                    tracing::warn!(url, hit_count, "URL registered by a concurrent job");
                    CompletionEffect::Merged { hit_count }
                }
                Err(e) => return Err(e),
            };

            store.record_fetch_outcome(url, true, completion.bytes(), completion.elapsed())?;
            tracing::info!(
                url,
                bytes = completion.bytes(),
                elapsed_ms = completion.elapsed().as_millis() as u64,
                "Registered new URL"
            );
            Ok(effect)
        }
        JobKind::Recheck => {
            store.record_fetch_outcome(
                url,
                completion.is_success(),
                completion.bytes(),
                completion.elapsed(),
            )?;
            tracing::info!(
                url,
                success = completion.is_success(),
                bytes = completion.bytes(),
                elapsed_ms = completion.elapsed().as_millis() as u64,
                "Re-checked URL"
            );
            Ok(CompletionEffect::Rechecked)
        }
    }
}

/// Spawns the task that drains `completions` into `store`
///
/// The task ends once every worker has dropped its sender, and returns the
/// number of events it applied.
pub fn spawn_completion_listener(
    store: Arc<dyn StatsStore>,
    mut completions: mpsc::UnboundedReceiver<FetchCompletion>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut applied = 0u64;
        while let Some(completion) = completions.recv().await {
            match apply_completion(store.as_ref(), &completion) {
                Ok(_) => applied += 1,
                Err(e) => tracing::error!(
                    url = %completion.url,
                    kind = %completion.kind,
                    "Failed to apply download result: {}",
                    e
                ),
            }
        }
        tracing::debug!(applied, "Completion listener stopped");
        applied
    })
}
