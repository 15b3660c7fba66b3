//! The hit-aggregating step processor.
//!
//! # State machine
//!
//! Every (track, category, cell) context moves through
//!
//! ```text
//! NoHit ──first qualifying step──▶ Open ──same-context step──▶ Open
//!                                   │
//!                                   └─exit / stop / kill / sink / flush──▶ Closed
//! ```
//!
//! Closed records are filed into the event's collections and never
//! reopened; a track re-entering the same cell opens a fresh record. A
//! step entering through the boundary while its context is still open
//! (the exit was never reported) closes the old record first.
//! A track has at most one open context: when it shows up in another
//! context while one is still open (an exit step was never reported),
//! the stale record is closed before the new one opens.

use std::fmt;
use std::sync::Arc;

use fhcal_core::{Category, CellIndex, EventId, StepError, TrackId, VolumeClassifier};
use fhcal_hits::{CollectionLayout, EventHits, HitRecord, HitRef};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::ProcessorConfig;
use crate::context::StepContext;
use crate::steppable::{StepOutcome, Steppable};

// Compile-time assertion: a processor can move to an event worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<StepProcessor>();
    }
};

/// Identity of an open hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct ContextKey {
    track: TrackId,
    category: Category,
    cell: CellIndex,
}

/// Counters accumulated over the processor's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Steps handed to `process_step()`.
    pub steps: u64,
    /// Steps ignored (inert volume or disabled category).
    pub ignored: u64,
    /// Records opened.
    pub opened: u64,
    /// Records filed into a collection.
    pub filed: u64,
    /// Records closed without deposit and dropped.
    pub discarded: u64,
    /// Records closed because their track opened another context.
    pub superseded: u64,
    /// Records closed by a forced flush.
    pub flushed: u64,
    /// Tracks absorbed by a black hole.
    pub absorbed: u64,
}

/// Turns transport steps into hit records for one event stream.
///
/// Owns the event's [`EventHits`] and the table of open records. Create
/// one per event stream; the processor is [`Send`] but never shared.
/// Call [`end_event()`](StepProcessor::end_event) to flush dangling
/// records and take the event's hits.
pub struct StepProcessor {
    name: String,
    classifier: Arc<dyn VolumeClassifier>,
    layout: CollectionLayout,
    config: ProcessorConfig,
    hits: EventHits,
    open: IndexMap<ContextKey, HitRecord>,
    by_track: IndexMap<TrackId, ContextKey>,
    stats: ProcessorStats,
}

impl StepProcessor {
    /// Create a processor wired to `classifier`, producing the
    /// collections described by `layout`. The first event is `EventId(0)`.
    pub fn new(
        name: impl Into<String>,
        classifier: Arc<dyn VolumeClassifier>,
        layout: CollectionLayout,
        config: ProcessorConfig,
    ) -> Self {
        let hits = EventHits::new(EventId(0), &layout);
        Self {
            name: name.into(),
            classifier,
            layout,
            config,
            hits,
            open: IndexMap::new(),
            by_track: IndexMap::new(),
            stats: ProcessorStats::default(),
        }
    }

    /// Start collecting hits for `event`.
    ///
    /// Records still open from the previous event are flushed into that
    /// event's hits, which are then discarded; call
    /// [`end_event()`](StepProcessor::end_event) first to keep them.
    pub fn begin_event(&mut self, event: EventId) {
        if !self.open.is_empty() {
            warn!(
                processor = %self.name,
                event = %self.hits.event(),
                open = self.open.len(),
                "event started before the previous one was ended; flushing"
            );
            if let Err(error) = self.flush() {
                warn!(processor = %self.name, %error, "leftover hits lost");
            }
        }
        self.hits = EventHits::new(event, &self.layout);
    }

    /// Flush open records and hand over the event's hits.
    ///
    /// The processor continues with empty collections for the next event
    /// id, also when flushing fails.
    pub fn end_event(&mut self) -> Result<EventHits, StepError> {
        let flushed = self.flush();
        let next = EventHits::new(self.hits.event().next(), &self.layout);
        let done = std::mem::replace(&mut self.hits, next);
        let flushed = flushed?;
        debug!(
            processor = %self.name,
            event = %done.event(),
            hits = done.len(),
            flushed,
            "event ended"
        );
        Ok(done)
    }

    /// Hits filed so far in the current event.
    pub fn hits(&self) -> &EventHits {
        &self.hits
    }

    /// Records currently open, in opening order.
    pub fn open_hits(&self) -> impl Iterator<Item = &HitRecord> + '_ {
        self.open.values()
    }

    /// Number of records currently open.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> &ProcessorStats {
        &self.stats
    }

    /// Collection layout this processor fills.
    pub fn layout(&self) -> &CollectionLayout {
        &self.layout
    }

    /// Resolved settings.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Close the record for `key`, filing it if it carries content.
    fn close(&mut self, key: ContextKey) -> Result<Option<HitRef>, StepError> {
        if self.by_track.get(&key.track) == Some(&key) {
            self.by_track.swap_remove(&key.track);
        }
        match self.open.shift_remove(&key) {
            Some(hit) => self.file(hit),
            None => Ok(None),
        }
    }

    fn file(&mut self, hit: HitRecord) -> Result<Option<HitRef>, StepError> {
        if !hit.has_content() {
            self.stats.discarded += 1;
            trace!(track = %hit.track(), cell = %hit.cell(), "dropping hit without deposit");
            return Ok(None);
        }
        let (track, cell, edep) = (hit.track(), hit.cell(), hit.edep());
        let filed = self.hits.file(hit)?;
        if let Some(hit_ref) = filed {
            self.stats.filed += 1;
            debug!(
                processor = %self.name,
                %track,
                %cell,
                category = %hit_ref.category,
                key = %hit_ref.key,
                edep,
                "hit filed"
            );
        }
        Ok(filed)
    }

    fn validate_deposit(&self, step: &StepContext, sink: bool) -> Result<(), StepError> {
        let kinetic = if sink { step.kinetic_energy } else { 0.0 };
        for value in [step.edep, step.non_ionizing_edep, kinetic] {
            if !value.is_finite() || value < 0.0 {
                return Err(StepError::InvalidDeposit {
                    track: step.track,
                    value,
                });
            }
        }
        Ok(())
    }
}

impl Steppable for StepProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_step(&mut self, step: &StepContext) -> Result<StepOutcome, StepError> {
        self.stats.steps += 1;

        let classification =
            self.classifier
                .classify(step.volume)
                .map_err(|reason| StepError::Unclassifiable {
                    volume: step.volume,
                    reason,
                })?;
        let Some((category, cell)) = classification.sensitive() else {
            self.stats.ignored += 1;
            return Ok(StepOutcome::Ignored);
        };
        if !self.layout.is_enabled(category) {
            self.stats.ignored += 1;
            return Ok(StepOutcome::Ignored);
        }

        let sink = self.config.sinks.applies(category);
        self.validate_deposit(step, sink)?;
        let mut edep = step.edep;
        if sink {
            edep += step.kinetic_energy;
            self.stats.absorbed += 1;
        }

        let key = ContextKey {
            track: step.track,
            category,
            cell,
        };

        if let Some(previous) = self.by_track.get(&step.track).copied() {
            if previous != key {
                warn!(
                    processor = %self.name,
                    track = %step.track,
                    from = %previous.cell,
                    to = %cell,
                    "track changed hit context without an exit step; closing stale hit"
                );
                self.stats.superseded += 1;
                self.close(previous)?;
            }
        }

        if let Some(open) = self.open.get(&key) {
            if step.first_step && open.shower() != step.shower {
                debug!(track = %step.track, %cell, "first step of a new shower; closing stale hit");
                self.stats.superseded += 1;
                self.close(key)?;
            } else if step.pre.status.starts_context() {
                debug!(
                    track = %step.track,
                    %cell,
                    "entry step into a cell with an open hit; closing it"
                );
                self.stats.superseded += 1;
                self.close(key)?;
            }
        }

        if !self.open.contains_key(&key) {
            self.stats.opened += 1;
            trace!(track = %step.track, %category, %cell, "opening hit");
            self.open.insert(
                key,
                HitRecord::open(
                    category,
                    self.config.layer,
                    cell,
                    step.track,
                    step.shower,
                    step.pre.position,
                    step.pre.time,
                ),
            );
        }
        self.by_track.insert(step.track, key);

        let (eion, light_yield) = if category == Category::Active {
            let eion = step.ionizing_edep();
            (eion, self.config.light_model.light_yield(step, eion))
        } else {
            (0.0, 0.0)
        };

        if let Some(hit) = self.open.get_mut(&key) {
            if step.particle.geantino {
                hit.mark_geantino();
            }
            hit.fold(edep, eion, light_yield, step.post.position, step.post.time);
        }

        let keep_track =
            edep > 0.0 && (category == Category::Active || self.config.absorber_truth);

        if sink || step.ends_context() {
            self.close(key)?;
        }

        Ok(StepOutcome::Recorded {
            keep_track,
            kill_track: sink,
        })
    }

    fn flush(&mut self) -> Result<usize, StepError> {
        self.by_track.clear();
        let open = std::mem::take(&mut self.open);
        let mut filed = 0;
        for (_, hit) in open {
            self.stats.flushed += 1;
            if self.file(hit)?.is_some() {
                filed += 1;
            }
        }
        Ok(filed)
    }
}

impl fmt::Debug for StepProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepProcessor")
            .field("name", &self.name)
            .field("classifier", &self.classifier.name())
            .field("event", &self.hits.event())
            .field("open", &self.open.len())
            .field("stats", &self.stats)
            .finish()
    }
}
