//! Periodic re-check scheduler
//!
//! On every tick the scheduler reads the most submitted URLs from the store
//! and queues a re-check for each of them, in rank order.
//!
//! Ticks are never skipped: when a tick waits on a full queue, the following
//! ticks fire late, back to back, rather than being dropped. Cancelling the
//! token stops the loop, including a tick that is waiting for queue space.

use crate::config::RecheckConfig;
use crate::engine::{EngineError, EngineHandle};
use crate::store::StatsStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Shortest accepted tick period; a zero period is raised to this
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct RecheckScheduler {
    store: Arc<dyn StatsStore>,
    engine: EngineHandle,
    interval: Duration,
    top_n: usize,
}

impl RecheckScheduler {
    pub fn new(
        store: Arc<dyn StatsStore>,
        engine: EngineHandle,
        interval: Duration,
        top_n: usize,
    ) -> Self {
        if interval < MIN_INTERVAL {
            tracing::warn!(
                interval_ms = interval.as_millis() as u64,
                "Re-check interval too short, using {}ms",
                MIN_INTERVAL.as_millis()
            );
        }
        Self {
            store,
            engine,
            interval: interval.max(MIN_INTERVAL),
            top_n,
        }
    }

    pub fn from_config(
        store: Arc<dyn StatsStore>,
        engine: EngineHandle,
        config: &RecheckConfig,
    ) -> Self {
        Self::new(store, engine, config.interval(), config.top_n as usize)
    }

    /// Queues a re-check for each of the current top URLs by hits
    ///
    /// Returns the number of jobs queued.
    pub async fn run_tick(&self) -> Result<usize, EngineError> {
        let summary = self.store.summary();
        tracing::info!(
            total_urls = summary.total_urls,
            total_hits = summary.total_hits,
            successes = summary.total_download_successes,
            failures = summary.total_download_failures,
            "Starting re-check of the {} most submitted URLs",
            self.top_n
        );

        let top = self.store.top_by_hits(self.top_n);
        for record in &top {
            self.engine.submit_recheck(&record.url).await?;
        }
        Ok(top.len())
    }

    /// Runs ticks until `cancel` fires or the engine shuts down
    ///
    /// The first tick happens one interval after the call.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            top_n = self.top_n,
            "Re-check scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Re-check scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::info!("Re-check scheduler shutting down during a tick");
                            break;
                        }
                        result = self.run_tick() => match result {
                            Ok(queued) => tracing::debug!(queued, "Re-check tick queued"),
                            Err(e) => {
                                tracing::warn!("Stopping re-check scheduler: {}", e);
                                break;
                            }
                        },
                    }
                }
            }
        }
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
