//! Error types for volume classification and step processing.
//!
//! All are fatal for the event in which they occur: a classification
//! failure means the geometry and the volume table disagree, a bad
//! deposit means the transport engine handed over corrupt input, and a
//! full collection cannot key another hit.

use std::error::Error;
use std::fmt;

use crate::id::{TrackId, VolumeId};

/// Errors from a [`VolumeClassifier`](crate::VolumeClassifier).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifyError {
    /// The volume is not present in the classifier's mapping.
    UnknownVolume {
        /// The unrecognised volume.
        volume: VolumeId,
    },
    /// The same volume was registered twice while building a table.
    DuplicateVolume {
        /// The volume registered more than once.
        volume: VolumeId,
    },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVolume { volume } => {
                write!(f, "volume {volume} has no classification (incomplete mapping)")
            }
            Self::DuplicateVolume { volume } => {
                write!(f, "volume {volume} registered more than once")
            }
        }
    }
}

impl Error for ClassifyError {}

/// A hit collection has used up the sequence numbers of its keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionFull {
    /// Name of the collection.
    pub collection: String,
}

impl fmt::Display for CollectionFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "collection {} has no hit sequence numbers left",
            self.collection
        )
    }
}

impl Error for CollectionFull {}

/// Errors from processing a single transport step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The step's volume could not be classified.
    Unclassifiable {
        /// The volume the step started in.
        volume: VolumeId,
        /// The classifier's error.
        reason: ClassifyError,
    },
    /// The step carried a negative or non-finite energy deposit.
    InvalidDeposit {
        /// Track that took the step.
        track: TrackId,
        /// The offending value (GeV).
        value: f64,
    },
    /// A closed hit could not be filed.
    CollectionFull(CollectionFull),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclassifiable { volume, reason } => {
                write!(f, "cannot classify volume {volume}: {reason}")
            }
            Self::InvalidDeposit { track, value } => {
                write!(f, "track {track} deposited invalid energy {value} GeV")
            }
            Self::CollectionFull(e) => write!(f, "cannot file hit: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unclassifiable { reason, .. } => Some(reason),
            Self::CollectionFull(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CollectionFull> for StepError {
    fn from(e: CollectionFull) -> Self {
        Self::CollectionFull(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclassifiable_names_volume_and_chains_source() {
        let err = StepError::Unclassifiable {
            volume: VolumeId(17),
            reason: ClassifyError::UnknownVolume {
                volume: VolumeId(17),
            },
        };
        assert_eq!(
            err.to_string(),
            "cannot classify volume 17: volume 17 has no classification (incomplete mapping)"
        );
        assert!(err.source().is_some());
    }
}
