//! Asynchronous reformat job dispatch.
//!
//! The dispatcher decouples fast traffic processing from slow
//! beautification: submission is fire-and-forget onto a bounded queue, and
//! a small pool of worker threads drains it. A full queue drops the job
//! with a backpressure signal instead of blocking the caller — live
//! traffic must never stall on reformatting backlog.
//!
//! Workers enforce the at-most-once guarantee by claiming the content hash
//! in the [`DedupLedger`] before touching the engine; duplicate jobs are
//! discarded without output or result records.

mod ledger;

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};

pub use ledger::{Claim, DedupLedger, LedgerState};

use crate::beautify::BeautifyEngine;
use crate::error_handling::{ProcessingStats, SiftEvent};
use crate::models::{RecordStatus, ReformatJob};
use crate::sink::ResultSink;

/// Everything a worker thread needs, cloned per worker.
struct WorkerContext {
    jobs: Receiver<ReformatJob>,
    engine: Arc<BeautifyEngine>,
    ledger: Arc<DedupLedger>,
    sink: Arc<ResultSink>,
    stats: Arc<ProcessingStats>,
}

/// Bounded worker pool executing reformat jobs off the traffic path.
pub struct WorkDispatcher {
    queue: Option<Sender<ReformatJob>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
    stats: Arc<ProcessingStats>,
}

impl WorkDispatcher {
    /// Spawns `pool_size` workers over a queue of `queue_capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if a worker thread cannot be
    /// spawned.
    pub fn new(
        pool_size: usize,
        queue_capacity: usize,
        engine: Arc<BeautifyEngine>,
        ledger: Arc<DedupLedger>,
        sink: Arc<ResultSink>,
        stats: Arc<ProcessingStats>,
    ) -> std::io::Result<Self> {
        let capacity = queue_capacity.max(1);
        let (queue_tx, queue_rx) = crossbeam_channel::bounded::<ReformatJob>(capacity);

        let mut workers = Vec::with_capacity(pool_size.max(1));
        for index in 0..pool_size.max(1) {
            let context = WorkerContext {
                jobs: queue_rx.clone(),
                engine: Arc::clone(&engine),
                ledger: Arc::clone(&ledger),
                sink: Arc::clone(&sink),
                stats: Arc::clone(&stats),
            };
            let handle = thread::Builder::new()
                .name(format!("sift-worker-{index}"))
                .spawn(move || worker_loop(context))?;
            workers.push(handle);
        }
        log::debug!("Using {} beautify worker threads", workers.len());

        Ok(WorkDispatcher {
            queue: Some(queue_tx),
            workers,
            capacity,
            stats,
        })
    }

    /// Submits a reformat job. Never blocks.
    ///
    /// Returns `false` when the job was dropped: either the queue is full
    /// (backpressure — counted and logged) or the dispatcher has shut down.
    pub fn submit(&self, job: ReformatJob) -> bool {
        let Some(queue) = self.queue.as_ref() else {
            log::warn!(
                "Dispatcher is shut down; dropping job for {}",
                job.fingerprint.url
            );
            return false;
        };
        match queue.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                self.stats.increment(SiftEvent::JobDropped);
                log::warn!(
                    "Reformat queue is full ({} slots); dropping job for {}",
                    self.capacity,
                    job.fingerprint.url
                );
                false
            }
            Err(TrySendError::Disconnected(job)) => {
                log::warn!(
                    "Reformat queue is closed; dropping job for {}",
                    job.fingerprint.url
                );
                false
            }
        }
    }

    /// Closes the queue and joins the workers after they drain it.
    pub fn shutdown(&mut self) {
        self.queue.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Beautify worker thread panicked");
            }
        }
    }
}

impl Drop for WorkDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(context: WorkerContext) {
    for job in context.jobs.iter() {
        process_job(&context, job);
    }
}

fn process_job(context: &WorkerContext, job: ReformatJob) {
    let hash = job.fingerprint.content_hash;

    // The claim is the authoritative dedup point: whoever wins it owns the
    // hash and must drive it to a terminal state.
    if context.ledger.try_claim(hash) == Claim::AlreadyClaimed {
        context.stats.increment(SiftEvent::DuplicateContent);
        log::debug!(
            "Content {hash} already claimed; discarding duplicate job for {}",
            job.fingerprint.url
        );
        return;
    }

    let sequence = context.sink.append(&job.fingerprint);

    match context.engine.beautify(&job.source) {
        Ok(formatted) if !formatted.is_empty() => {
            // Output exists only after a successful beautify call; a crash
            // before this point leaves no partial file.
            if let Err(e) = write_output(&job.destination, &formatted) {
                context.ledger.mark_failed(hash);
                context.sink.complete(sequence, RecordStatus::Failed);
                context.stats.increment(SiftEvent::OutputWriteFailed);
                log::error!(
                    "Failed to write beautified output to {}: {e}",
                    job.destination.display()
                );
                return;
            }
            context.ledger.mark_done(hash);
            context.sink.complete(sequence, RecordStatus::Beautified);
            context.stats.increment(SiftEvent::JobCompleted);
            log::debug!(
                "Beautified {} into {}",
                job.fingerprint.url,
                job.destination.display()
            );
        }
        Ok(_) => {
            context.ledger.mark_failed(hash);
            context.sink.complete(sequence, RecordStatus::Failed);
            context.stats.increment(SiftEvent::BeautifyFailed);
            log::error!(
                "Beautify produced empty output for {}",
                job.fingerprint.url
            );
        }
        Err(e) => {
            context.ledger.mark_failed(hash);
            context.sink.complete(sequence, RecordStatus::Failed);
            context.stats.increment(SiftEvent::BeautifyFailed);
            log::error!("Beautify failed for {}: {e}", job.fingerprint.url);
        }
    }
}

fn write_output(destination: &Path, formatted: &str) -> std::io::Result<()> {
    std::fs::write(destination, formatted)
}
