//! FHCAL subsystem: configuration, run start and event runners.
//!
//! [`SubsystemConfig`] is validated into a [`ForwardHcalSubsystem`]. At run
//! start it receives the geometry's classifier and hands out stepping
//! actions, which [`EventRunner`] drives sequentially and
//! [`BatchedRunner`] drives on a worker pool.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batched;
pub mod config;
pub mod runner;
pub mod subsystem;

pub use batched::BatchedRunner;
pub use config::{ConfigError, GeometryParams, MappingFile, SubsystemConfig};
pub use runner::{EventRunner, RunError};
pub use subsystem::ForwardHcalSubsystem;
