//! Test utilities and fixtures for FHCAL development.
//!
//! Provides a tower-grid [`VolumeTable`](fhcal_core::VolumeTable) fixture
//! ([`towers`]), a fluent [`StepBuilder`] for single steps, a
//! [`TrackWalk`] for chains of steps through one cell, and a
//! [`RecordingClassifier`] that counts classification calls.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod steps;
pub mod towers;

use std::sync::atomic::{AtomicUsize, Ordering};

use fhcal_core::{Classification, ClassifyError, VolumeClassifier, VolumeId};

pub use steps::{StepBuilder, TrackWalk};

/// Wraps a classifier and counts `classify()` calls.
///
/// Uses `AtomicUsize` so the wrapper stays `Sync` and can be shared
/// across event workers.
pub struct RecordingClassifier<C> {
    inner: C,
    calls: AtomicUsize,
}

impl<C: VolumeClassifier> RecordingClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `classify()` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<C: VolumeClassifier> VolumeClassifier for RecordingClassifier<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn classify(&self, volume: VolumeId) -> Result<Classification, ClassifyError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.classify(volume)
    }

    fn volume_count(&self) -> usize {
        self.inner.volume_count()
    }
}
