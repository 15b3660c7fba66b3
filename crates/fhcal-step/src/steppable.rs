//! The [`Steppable`] capability and [`StepOutcome`].

use fhcal_core::StepError;

use crate::context::StepContext;

/// What a processed step means for the transport engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step is not of interest: inert volume or disabled category.
    /// Nothing was mutated.
    Ignored,
    /// The step was folded into a hit.
    Recorded {
        /// The track deposited energy where truth should be kept; the
        /// transport engine should retain its truth record.
        keep_track: bool,
        /// The track hit a black hole; the transport engine should kill it.
        kill_track: bool,
    },
}

impl StepOutcome {
    /// True unless the step was ignored.
    pub fn of_interest(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// True if the track should be killed after this step.
    pub fn kill_track(&self) -> bool {
        matches!(self, Self::Recorded { kill_track: true, .. })
    }

    /// True if the track's truth record should be kept.
    pub fn keep_track(&self) -> bool {
        matches!(self, Self::Recorded { keep_track: true, .. })
    }
}

/// Consumes transport steps one at a time.
///
/// # Contract
///
/// - `process_step()` is synchronous and called in transport order for
///   each track; steps of different tracks may interleave.
/// - An error is fatal for the event: the caller must stop feeding steps
///   and discard the event.
/// - `flush()` closes every open record; it is called at event end so
///   tracks that never reported an exit step are not lost. The open
///   table is empty afterwards even when it fails.
pub trait Steppable: Send {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str;

    /// Process one step.
    fn process_step(&mut self, step: &StepContext) -> Result<StepOutcome, StepError>;

    /// Force-close all open records. Returns how many were filed.
    fn flush(&mut self) -> Result<usize, StepError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_is_not_of_interest() {
        assert!(!StepOutcome::Ignored.of_interest());
        assert!(!StepOutcome::Ignored.kill_track());
        let recorded = StepOutcome::Recorded {
            keep_track: true,
            kill_track: false,
        };
        assert!(recorded.of_interest());
        assert!(recorded.keep_track());
        assert!(!recorded.kill_track());
    }
}
