//! Step context and the hit-aggregating step processor for FHCAL.
//!
//! The transport engine hands every step to a [`Steppable`]; the
//! [`StepProcessor`] implementation classifies the step's volume and
//! opens, extends or closes [`HitRecord`](fhcal_hits::HitRecord)s keyed
//! by (track, category, cell).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod light;
pub mod processor;
pub mod steppable;

pub use config::{ProcessorConfig, SinkPolicy};
pub use context::{Particle, StepContext, StepPoint, StepStatus, TrackStatus};
pub use light::{LightModel, POLYSTYRENE_BIRKS_CONSTANT};
pub use processor::{ProcessorStats, StepProcessor};
pub use steppable::{StepOutcome, Steppable};
