//! Sequential event driver.
//!
//! [`EventRunner`] owns one stepping action and feeds it one event's steps
//! at a time, returning each event's hits.

use std::error::Error;
use std::fmt;

use fhcal_core::{EventId, StepError};
use fhcal_hits::EventHits;
use fhcal_step::{StepContext, StepProcessor, Steppable};
use tracing::warn;

use crate::config::ConfigError;

// ── RunError ───────────────────────────────────────────────────────

/// Error from driving events through a stepping action.
#[derive(Debug)]
pub enum RunError {
    /// A step of `event` failed; the event was discarded.
    Step {
        /// Event being processed.
        event: EventId,
        /// The underlying step error.
        error: StepError,
    },
    /// The subsystem could not provide a stepping action.
    Config(ConfigError),
    /// The subsystem is inactive or not initialised.
    NoProcessor,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A worker thread panicked.
    WorkerPanicked {
        /// Index of the worker.
        worker: usize,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step { event, error } => write!(f, "event {event}: {error}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NoProcessor => {
                write!(f, "subsystem is inactive or was not initialised")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::WorkerPanicked { worker } => write!(f, "event worker {worker} panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Step { error, .. } => Some(error),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Feed one event's steps to `processor` and take its hits.
///
/// On a step error the event's partial hits are dropped and the processor
/// is left ready for the next event.
pub(crate) fn process_event<I>(
    processor: &mut StepProcessor,
    event: EventId,
    steps: I,
) -> Result<EventHits, RunError>
where
    I: IntoIterator<Item = StepContext>,
{
    processor.begin_event(event);
    for step in steps {
        if let Err(error) = processor.process_step(&step) {
            warn!(processor = processor.name(), %event, %error, "discarding event");
            // Partial hits go with the event; a filing error here adds nothing.
            let _ = processor.end_event();
            return Err(RunError::Step { event, error });
        }
    }
    processor
        .end_event()
        .map_err(|error| RunError::Step { event, error })
}

// ── EventRunner ────────────────────────────────────────────────────

/// Runs events one after another through a single stepping action.
///
/// Events are numbered consecutively from the runner's first event id.
#[derive(Debug)]
pub struct EventRunner {
    processor: StepProcessor,
    next_event: EventId,
}

impl EventRunner {
    /// Drive `processor`, starting at `EventId(0)`.
    pub fn new(processor: StepProcessor) -> Self {
        Self {
            processor,
            next_event: EventId(0),
        }
    }

    /// Number the next event `event`.
    pub fn starting_at(mut self, event: EventId) -> Self {
        self.next_event = event;
        self
    }

    /// Process one event's steps and return its hits.
    ///
    /// # Errors
    ///
    /// [`RunError::Step`] on the first failing step. The event id is
    /// consumed either way.
    pub fn run_event<I>(&mut self, steps: I) -> Result<EventHits, RunError>
    where
        I: IntoIterator<Item = StepContext>,
    {
        let event = self.next_event;
        self.next_event = event.next();
        process_event(&mut self.processor, event, steps)
    }

    /// Process `events` in order, stopping at the first failure.
    pub fn run<E>(&mut self, events: E) -> Result<Vec<EventHits>, RunError>
    where
        E: IntoIterator,
        E::Item: IntoIterator<Item = StepContext>,
    {
        events
            .into_iter()
            .map(|steps| self.run_event(steps))
            .collect()
    }

    /// Id the next event will get.
    pub fn next_event(&self) -> EventId {
        self.next_event
    }

    /// The stepping action.
    pub fn processor(&self) -> &StepProcessor {
        &self.processor
    }

    /// Give the stepping action back.
    pub fn into_processor(self) -> StepProcessor {
        self.processor
    }
}
