//! Concurrent event processing.
//!
//! [`BatchedRunner`] owns N stepping actions, one per worker thread. A
//! batch of events is fed to the workers over a bounded crossbeam channel;
//! each worker processes whole events with its own processor and sends the
//! hits back over a reply channel. Results are re-ordered by event id, so
//! the output matches running the same events through an
//! [`EventRunner`](crate::EventRunner).
//!
//! Workers are scoped to a single [`run()`](BatchedRunner::run) call; the
//! processors persist across batches. The classifier is shared read-only.

use std::thread;

use crossbeam_channel::{bounded, unbounded};
use fhcal_core::EventId;
use fhcal_hits::EventHits;
use fhcal_step::{StepContext, StepProcessor};
use indexmap::IndexMap;
use tracing::debug;

use crate::runner::{process_event, RunError};
use crate::subsystem::ForwardHcalSubsystem;

/// Resolve a worker count: `None` means one per available CPU, clamped
/// to `[1, 64]`.
fn resolved_worker_count(workers: Option<usize>) -> usize {
    match workers {
        Some(n) => n.clamp(1, 64),
        None => thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .clamp(1, 64),
    }
}

/// Processes batches of events on a pool of worker threads.
#[derive(Debug)]
pub struct BatchedRunner {
    processors: Vec<StepProcessor>,
    next_event: EventId,
}

impl BatchedRunner {
    /// One stepping action per worker from an initialised subsystem.
    ///
    /// # Errors
    ///
    /// [`RunError::NoProcessor`] if the subsystem is inactive or
    /// `init_run()` has not been called.
    pub fn new(
        subsystem: &ForwardHcalSubsystem,
        workers: Option<usize>,
    ) -> Result<Self, RunError> {
        let count = resolved_worker_count(workers);
        let processors = (0..count)
            .map(|_| subsystem.processor().ok_or(RunError::NoProcessor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_processors(processors))
    }

    /// Use the given processors, one worker each.
    ///
    /// # Panics
    ///
    /// Panics if `processors` is empty.
    pub fn from_processors(processors: Vec<StepProcessor>) -> Self {
        assert!(
            !processors.is_empty(),
            "BatchedRunner requires at least one processor"
        );
        Self {
            processors,
            next_event: EventId(0),
        }
    }

    /// Number the next event `event`.
    pub fn starting_at(mut self, event: EventId) -> Self {
        self.next_event = event;
        self
    }

    /// Number of worker threads per batch.
    pub fn worker_count(&self) -> usize {
        self.processors.len()
    }

    /// Id the next event will get.
    pub fn next_event(&self) -> EventId {
        self.next_event
    }

    /// The per-worker stepping actions.
    pub fn processors(&self) -> &[StepProcessor] {
        &self.processors
    }

    /// Process a batch of events concurrently.
    ///
    /// Events are numbered consecutively in input order and returned in
    /// that order. Every event is processed even if some fail.
    ///
    /// # Errors
    ///
    /// The error of the lowest-numbered failing event, or a worker
    /// failure. Event ids of the whole batch are consumed either way.
    pub fn run<E, I>(&mut self, events: E) -> Result<Vec<EventHits>, RunError>
    where
        E: IntoIterator<Item = I>,
        I: IntoIterator<Item = StepContext> + Send,
    {
        let workers = self.processors.len();
        let (task_tx, task_rx) = bounded::<(EventId, I)>(workers * 2);
        let (reply_tx, reply_rx) = unbounded::<(EventId, Result<EventHits, RunError>)>();

        let mut next = self.next_event;
        let outcome = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for (index, processor) in self.processors.iter_mut().enumerate() {
                let task_rx = task_rx.clone();
                let reply_tx = reply_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("fhcal-event-{index}"))
                    .spawn_scoped(scope, move || {
                        while let Ok((event, steps)) = task_rx.recv() {
                            let result = process_event(processor, event, steps);
                            if reply_tx.send((event, result)).is_err() {
                                break;
                            }
                        }
                    });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        // Dropping the sender lets already spawned workers drain and exit.
                        drop(task_tx);
                        for handle in handles {
                            let _ = handle.join();
                        }
                        return Err(RunError::ThreadSpawnFailed {
                            reason: e.to_string(),
                        });
                    }
                }
            }
            drop(task_rx);
            drop(reply_tx);

            let mut submitted = 0usize;
            for steps in events {
                if task_tx.send((next, steps)).is_err() {
                    break;
                }
                next = next.next();
                submitted += 1;
            }
            drop(task_tx);

            let mut results = IndexMap::with_capacity(submitted);
            for (event, result) in reply_rx.iter() {
                results.insert(event, result);
            }

            for (worker, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    return Err(RunError::WorkerPanicked { worker });
                }
            }
            Ok(results)
        });
        self.next_event = next;

        let mut results = outcome?;
        results.sort_keys();
        debug!(
            workers,
            events = results.len(),
            next_event = %self.next_event,
            "batch processed"
        );
        results.into_values().collect()
    }
}
