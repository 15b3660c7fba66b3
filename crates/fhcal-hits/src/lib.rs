//! Hit records, hit collections and shower bookkeeping for FHCAL.
//!
//! # Ownership
//!
//! ```text
//! EventHits (one per event, handed to the orchestrator at event end)
//! ├── HitCollection "G4HIT_<det>"            (always)
//! ├── HitCollection "G4HIT_ABSORBER_<det>"   (absorberactive)
//! ├── HitCollection "G4HIT_SUPPORT_<det>"    (supportactive)
//! └── ShowerLedger  (shower → finalized hit references)
//! ```
//!
//! Collections own their [`HitRecord`]s by value and only ever receive
//! finalized records; open records live in the step processor.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collection;
pub mod event;
pub mod hit;
pub mod layout;
pub mod shower;

pub use collection::HitCollection;
pub use event::EventHits;
pub use hit::HitRecord;
pub use layout::{CollectionLayout, NO_SUPER_DETECTOR};
pub use shower::{HitRef, ShowerLedger};
