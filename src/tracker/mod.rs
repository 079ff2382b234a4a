//! Process wiring for the tracker
//!
//! This module builds the running system out of its parts:
//! - One statistics store, shared by reference counting
//! - The fetch engine and its completion listener
//! - The periodic re-check scheduler
//! - The submission path used by request handlers

mod completion;
mod scheduler;
mod submission;

pub use completion::{apply_completion, spawn_completion_listener, CompletionEffect};
pub use scheduler::RecheckScheduler;
pub use submission::{submit_url, validate_url, Submission};

use crate::config::Config;
use crate::engine::{build_http_client, EngineHandle, FetchEngine};
use crate::store::{MemoryStore, OrderKey, StatsStore, UrlRecord};
use crate::UrlStatsError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cloneable front door to the store and the engine
#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn StatsStore>,
    engine: EngineHandle,
}

impl Tracker {
    pub fn new(store: Arc<dyn StatsStore>, engine: EngineHandle) -> Self {
        Self { store, engine }
    }

    /// Starts every background component with a fresh in-memory store
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<TrackerRuntime, UrlStatsError> {
        Self::start_with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Starts every background component on top of `store`
    pub fn start_with_store(
        config: &Config,
        store: Arc<dyn StatsStore>,
    ) -> Result<TrackerRuntime, UrlStatsError> {
        let client = build_http_client(&config.engine, &config.user_agent)?;
        let (engine, completions) = FetchEngine::start(&config.engine, client);
        let listener = spawn_completion_listener(Arc::clone(&store), completions);

        let cancel = CancellationToken::new();
        let scheduler =
            RecheckScheduler::from_config(Arc::clone(&store), engine.handle(), &config.recheck)
                .spawn(cancel.clone());

        Ok(TrackerRuntime {
            tracker: Self::new(store, engine.handle()),
            engine,
            listener,
            scheduler,
            cancel,
        })
    }

    /// Validates and submits one URL
    ///
    /// Waits for queue space when the URL is new and the engine queue is full.
    pub async fn submit(&self, url: &str) -> Result<Submission, UrlStatsError> {
        validate_url(url)?;
        submit_url(self.store.as_ref(), &self.engine, url).await
    }

    pub fn list(&self, order: &[OrderKey], limit: usize) -> Vec<UrlRecord> {
        self.store.list(order, limit)
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}

/// Owner of the background tasks started by [`Tracker::start`]
pub struct TrackerRuntime {
    tracker: Tracker,
    engine: FetchEngine,
    listener: JoinHandle<u64>,
    scheduler: JoinHandle<()>,
    cancel: CancellationToken,
}

impl TrackerRuntime {
    pub fn tracker(&self) -> Tracker {
        self.tracker.clone()
    }

    /// Stops the scheduler, then the engine, then drains the listener
    ///
    /// Every attempt that finished before the workers stopped is applied to
    /// the store by the time this returns.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.scheduler.await {
            tracing::error!("Re-check scheduler panicked: {}", e);
        }

        self.engine.shutdown().await;

        match self.listener.await {
            Ok(applied) => tracing::info!(applied, "Tracker stopped"),
            Err(e) => tracing::error!("Completion listener panicked: {}", e),
        }
    }
}
