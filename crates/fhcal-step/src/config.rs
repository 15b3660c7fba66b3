//! Resolved step-processor settings.

use fhcal_core::{Category, LayerId};

use crate::light::LightModel;

/// Categories configured as black holes.
///
/// A black-hole volume absorbs everything that reaches it: the track's
/// remaining kinetic energy is added to the deposit and the track is
/// killed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SinkPolicy {
    /// Scintillator volumes absorb.
    pub active: bool,
    /// Absorber volumes absorb.
    pub absorber: bool,
    /// Support volumes absorb.
    pub support: bool,
}

impl SinkPolicy {
    /// No category absorbs.
    pub const NONE: SinkPolicy = SinkPolicy {
        active: false,
        absorber: false,
        support: false,
    };

    /// Every category absorbs (the subsystem-wide `blackhole` flag).
    pub const ALL: SinkPolicy = SinkPolicy {
        active: true,
        absorber: true,
        support: true,
    };

    /// True if `category` absorbs.
    pub fn applies(&self, category: Category) -> bool {
        match category {
            Category::Active => self.active,
            Category::Absorber => self.absorber,
            Category::Support => self.support,
        }
    }
}

/// Settings the [`StepProcessor`](crate::StepProcessor) consumes.
///
/// Category enablement is not here: it comes from the
/// [`CollectionLayout`](fhcal_hits::CollectionLayout), so a category is
/// recorded exactly when it has a collection.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProcessorConfig {
    /// Layer stamped into every hit and hit key.
    pub layer: LayerId,
    /// Ask the transport engine to keep truth information for tracks that
    /// deposit in passive (absorber, support) volumes.
    pub absorber_truth: bool,
    /// Black-hole categories.
    pub sinks: SinkPolicy,
    /// Light-yield model for active deposits.
    pub light_model: LightModel,
}
