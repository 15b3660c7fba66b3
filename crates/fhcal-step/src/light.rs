//! Scintillator light-yield models.

use crate::context::StepContext;

/// Birks constant of polystyrene scintillator (mm/MeV).
pub const POLYSTYRENE_BIRKS_CONSTANT: f64 = 0.0794;

/// How the ionization deposit of an active step converts to light.
///
/// Light yield is expressed in GeV-equivalent so it can be compared with
/// `eion` directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightModel {
    /// Birks' law: `L = E / (1 + kB * dE/dx)`, `kB` in mm/MeV.
    Birks {
        /// Birks constant (mm/MeV).
        constant: f64,
    },
    /// Light proportional to the ionization deposit (no quenching).
    Ionization,
}

impl Default for LightModel {
    fn default() -> Self {
        Self::Birks {
            constant: POLYSTYRENE_BIRKS_CONSTANT,
        }
    }
}

impl LightModel {
    /// Light yield for a step whose ionization deposit is `eion` (GeV).
    ///
    /// Neutral particles and zero-length steps are not quenched.
    pub fn light_yield(&self, step: &StepContext, eion: f64) -> f64 {
        match *self {
            Self::Ionization => eion,
            Self::Birks { constant } => {
                if eion <= 0.0 || step.particle.charge == 0.0 || step.step_length <= 0.0 {
                    return eion;
                }
                let dedx_mev_per_mm = eion * 1000.0 / step.step_length;
                eion / (1.0 + constant * dedx_mev_per_mm)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Particle, StepPoint, StepStatus, TrackStatus};
    use fhcal_core::{Point3, TrackId, VolumeId};

    fn step(charge: f64, length: f64) -> StepContext {
        StepContext {
            volume: VolumeId(1),
            track: TrackId(1),
            parent: None,
            shower: None,
            particle: Particle {
                pdg: 211,
                charge,
                geantino: false,
            },
            pre: StepPoint::new(Point3::ORIGIN, 0.0, StepStatus::GeomBoundary),
            post: StepPoint::new(Point3::new(0.0, 0.0, length), 0.0, StepStatus::PostStep),
            edep: 0.001,
            non_ionizing_edep: 0.0,
            step_length: length,
            kinetic_energy: 1.0,
            track_status: TrackStatus::Alive,
            first_step: false,
        }
    }

    #[test]
    fn birks_quenches_dense_charged_deposits() {
        // 1 MeV over 1 mm with kB = 0.0794 mm/MeV.
        let light = LightModel::default().light_yield(&step(1.0, 1.0), 0.001);
        assert!((light - 0.001 / 1.0794).abs() < 1e-12);
        assert!(light < 0.001);
    }

    #[test]
    fn neutral_and_zero_length_steps_are_not_quenched() {
        let model = LightModel::default();
        assert_eq!(model.light_yield(&step(0.0, 1.0), 0.002), 0.002);
        assert_eq!(model.light_yield(&step(-1.0, 0.0), 0.002), 0.002);
    }

    #[test]
    fn ionization_model_is_identity() {
        assert_eq!(LightModel::Ionization.light_yield(&step(1.0, 1.0), 0.5), 0.5);
    }
}
