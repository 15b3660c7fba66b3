//! Core types and traits for FHCAL step processing.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, geometry primitives, volume classification and
//! error types shared by the hit bookkeeping and step processing crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod error;
pub mod geom;
pub mod id;

pub use classify::{Category, Classification, VolumeClassifier, VolumeTable, VolumeTableBuilder};
pub use error::{ClassifyError, CollectionFull, StepError};
pub use geom::Point3;
pub use id::{CellIndex, EventId, HitKey, LayerId, ShowerId, TrackId, VolumeId};
