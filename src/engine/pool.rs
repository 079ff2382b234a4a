//! Fixed-size worker pool consuming the bounded job queue
//!
//! The number of workers is the only concurrency limit: each worker takes one
//! job, runs it to completion, reports it, and only then takes the next one.

use crate::config::EngineConfig;
use crate::engine::fetcher::fetch_url;
use crate::engine::job::{FetchCompletion, FetchJob, JobKind, JobState};
use crate::engine::EngineError;
use reqwest::Client;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Live counters shared by the workers and every handle
#[derive(Debug, Default)]
pub struct EngineStats {
    submitted: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl EngineStats {
    fn job_started(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn job_finished(&self, success: bool) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub submitted: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub succeeded: u64,
    pub failed: u64,
}

impl EngineSnapshot {
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Cloneable submission side of the engine
#[derive(Debug, Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<FetchJob>,
    stats: Arc<EngineStats>,
}

impl EngineHandle {
    pub(crate) fn new(sender: mpsc::Sender<FetchJob>, stats: Arc<EngineStats>) -> Self {
        Self { sender, stats }
    }

    /// Queues the first download of an unregistered URL
    ///
    /// Waits while the queue is full.
    pub async fn submit_new(&self, url: &str) -> Result<(), EngineError> {
        self.submit(FetchJob::new(url, JobKind::New)).await
    }

    /// Queues a re-check of a registered URL
    ///
    /// Waits while the queue is full.
    pub async fn submit_recheck(&self, url: &str) -> Result<(), EngineError> {
        self.submit(FetchJob::new(url, JobKind::Recheck)).await
    }

    async fn submit(&self, job: FetchJob) -> Result<(), EngineError> {
        tracing::debug!(url = %job.url, kind = %job.kind, "Queueing fetch job");
        self.sender.send(job).await.map_err(|_| EngineError::Closed)?;
        self.stats.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of free slots left in the queue
    pub fn queue_capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn stats(&self) -> EngineSnapshot {
        self.stats.snapshot()
    }
}

/// Running worker pool
pub struct FetchEngine {
    handle: EngineHandle,
    workers: Vec<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl FetchEngine {
    /// Spawns `config.max_parallel_downloads` workers on the current runtime
    ///
    /// # Returns
    ///
    /// The engine and the receiving end of the completion channel. Exactly one
    /// event arrives on it per fetch attempt.
    pub fn start(
        config: &EngineConfig,
        client: Client,
    ) -> (Self, mpsc::UnboundedReceiver<FetchCompletion>) {
        let (sender, receiver) = mpsc::channel(config.queue_size.max(1) as usize);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let stats = Arc::new(EngineStats::default());
        let cancel = CancellationToken::new();

        let workers = (0..config.max_parallel_downloads.max(1))
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&receiver),
                    client.clone(),
                    completion_tx.clone(),
                    Arc::clone(&stats),
                    cancel.clone(),
                ))
            })
            .collect::<Vec<_>>();

        tracing::info!(
            workers = workers.len(),
            queue_size = config.queue_size,
            "Fetch engine started"
        );

        let engine = Self {
            handle: EngineHandle::new(sender, stats),
            workers,
            cancel,
        };
        (engine, completion_rx)
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops the workers and waits for them to exit
    ///
    /// Workers stop taking jobs; a fetch already in flight runs to completion
    /// (bounded by the request timeout) and is still reported. Jobs left in
    /// the queue are dropped.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!("Fetch worker panicked: {}", e);
            }
        }
        tracing::info!("Fetch engine stopped");
    }
}

async fn worker_loop(
    worker_id: u32,
    receiver: Arc<Mutex<mpsc::Receiver<FetchJob>>>,
    client: Client,
    completions: mpsc::UnboundedSender<FetchCompletion>,
    stats: Arc<EngineStats>,
    cancel: CancellationToken,
) {
    tracing::trace!(worker_id, "Fetch worker started");

    loop {
        let next = {
            let mut receiver = receiver.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                job = receiver.recv() => job,
            }
        };

        let Some(mut job) = next else {
            break;
        };

        advance_job(worker_id, &mut job, JobState::InFlight);
        stats.job_started();
        tracing::debug!(
            worker_id,
            url = %job.url,
            kind = %job.kind,
            queued_ms = job.age().as_millis() as u64,
            "Fetching"
        );

        let outcome = fetch_url(&client, &job.url).await;

        stats.job_finished(outcome.is_ok());
        advance_job(worker_id, &mut job, JobState::Completed);

        let completion = FetchCompletion {
            url: job.url,
            kind: job.kind,
            outcome,
        };
        if completions.send(completion).is_err() {
            tracing::warn!(worker_id, "Completion listener is gone, stopping worker");
            break;
        }
    }

    tracing::trace!(worker_id, "Fetch worker stopped");
}

/// Moves `job` to `next`, logging a rejected transition
///
/// Returns whether the transition was applied.
fn advance_job(worker_id: u32, job: &mut FetchJob, next: JobState) -> bool {
    let from = job.state();
    let applied = job.advance(next);
    if !applied {
        tracing::error!(
            worker_id,
            url = %job.url,
            "Invalid job state transition {} -> {}",
            from,
            next
        );
    }
    applied
}
