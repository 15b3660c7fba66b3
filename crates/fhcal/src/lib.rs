//! FHCAL: forward hadronic calorimeter step processing and hit aggregation.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all FHCAL sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use fhcal::prelude::*;
//! use fhcal::step::{Particle, StepPoint, StepStatus, TrackStatus};
//!
//! // One tower: scintillator volume 10, absorber volume 11.
//! let cell = CellIndex::tower(0, 0);
//! let table = VolumeTable::builder("towers")
//!     .active(VolumeId(10), cell)
//!     .absorber(VolumeId(11), cell)
//!     .build()
//!     .unwrap();
//!
//! // The tower map must exist; it is fingerprinted at construction.
//! let map = tempfile::NamedTempFile::new().unwrap();
//! let config = SubsystemConfig::new(MappingFile::new(map.path()));
//! let mut subsystem = ForwardHcalSubsystem::new(config).unwrap();
//! let mut processor = subsystem.init_run(Arc::new(table)).unwrap().unwrap();
//!
//! // A charged track crossing the scintillator in a single step.
//! let step = StepContext {
//!     volume: VolumeId(10),
//!     track: TrackId(1),
//!     parent: None,
//!     shower: Some(ShowerId(1)),
//!     particle: Particle { pdg: 211, charge: 1.0, geantino: false },
//!     pre: StepPoint::new(Point3::new(0.0, 0.0, 4000.0), 13.3, StepStatus::GeomBoundary),
//!     post: StepPoint::new(Point3::new(0.0, 0.0, 4002.3), 13.4, StepStatus::GeomBoundary),
//!     edep: 0.0005,
//!     non_ionizing_edep: 0.0,
//!     step_length: 2.3,
//!     kinetic_energy: 1.0,
//!     track_status: TrackStatus::Alive,
//!     first_step: false,
//! };
//! let outcome = processor.process_step(&step).unwrap();
//! assert!(outcome.keep_track());
//!
//! let hits = processor.end_event().unwrap();
//! assert_eq!(hits.active().name(), "G4HIT_FHCAL");
//! assert_eq!(hits.active().len(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fhcal-core` | IDs, geometry points, categories, the classifier trait, errors |
//! | [`hits`] | `fhcal-hits` | Hit records, collections, collection naming, shower ledger |
//! | [`step`] | `fhcal-step` | Step context, the step processor, light-yield models |
//! | [`subsystem`] | `fhcal-subsystem` | Configuration, run start, event runners |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`fhcal-core`).
///
/// Contains the identifier newtypes, [`types::CellIndex`], the
/// [`types::VolumeClassifier`] trait with its in-memory
/// [`types::VolumeTable`], and the classification and step errors.
pub use fhcal_core as types;

/// Hit records and collections (`fhcal-hits`).
pub use fhcal_hits as hits;

/// Step context and the hit-aggregating step processor (`fhcal-step`).
///
/// [`step::StepProcessor`] implements [`step::Steppable`].
pub use fhcal_step as step;

/// Subsystem configuration, run start and event runners
/// (`fhcal-subsystem`).
pub use fhcal_subsystem as subsystem;

/// Common imports for typical FHCAL usage.
///
/// ```rust
/// use fhcal::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use fhcal_core::{
        Category, CellIndex, Classification, EventId, HitKey, LayerId, Point3, ShowerId,
        TrackId, VolumeClassifier, VolumeId, VolumeTable,
    };

    // Errors
    pub use fhcal_core::{ClassifyError, StepError};
    pub use fhcal_subsystem::{ConfigError, RunError};

    // Hits
    pub use fhcal_hits::{CollectionLayout, EventHits, HitCollection, HitRecord};

    // Stepping
    pub use fhcal_step::{
        LightModel, ProcessorConfig, StepContext, StepOutcome, StepProcessor, Steppable,
    };

    // Subsystem
    pub use fhcal_subsystem::{
        BatchedRunner, EventRunner, ForwardHcalSubsystem, MappingFile, SubsystemConfig,
    };
}
