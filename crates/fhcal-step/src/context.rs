//! Per-step input handed over by the transport engine.
//!
//! [`StepContext`] is a plain value describing one transport step: where
//! it started and ended, how much energy it left behind, and who took
//! it. It is borrowed for the duration of one
//! [`process_step()`](crate::Steppable::process_step) call and never
//! stored.

use fhcal_core::{Point3, ShowerId, TrackId, VolumeId};

/// How a step point was reached, as reported by the transport engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The point lies on a volume boundary.
    GeomBoundary,
    /// The point lies on the boundary of the world volume.
    WorldBoundary,
    /// The step was limited by an at-rest process (track stopped).
    AtRest,
    /// The step was limited by a continuous process.
    AlongStep,
    /// The step was limited by a discrete interaction.
    PostStep,
    /// The step was limited by a user step limit.
    UserLimit,
    /// Status not set; the first step of a freshly created track.
    Undefined,
}

impl StepStatus {
    /// True for a post-step status after which the track is no longer
    /// inside the volume it stepped through.
    pub fn ends_context(&self) -> bool {
        matches!(self, Self::GeomBoundary | Self::WorldBoundary | Self::AtRest)
    }

    /// True for a pre-step status meaning the track just entered the
    /// volume or was just created in it.
    pub fn starts_context(&self) -> bool {
        matches!(self, Self::GeomBoundary | Self::Undefined)
    }
}

/// Track status after the step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TrackStatus {
    /// The track continues.
    #[default]
    Alive,
    /// Stopped, but at-rest processes may still act on it.
    StopButAlive,
    /// Stopped and removed by the transport engine.
    StopAndKill,
    /// Removed together with its secondaries.
    KillTrackAndSecondaries,
    /// Suspended and pushed back onto the stack.
    Suspend,
}

impl TrackStatus {
    /// True if the track will take no further steps.
    pub fn is_killed(&self) -> bool {
        matches!(self, Self::StopAndKill | Self::KillTrackAndSecondaries)
    }
}

/// One end of a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepPoint {
    /// Global position (mm).
    pub position: Point3,
    /// Global time (ns).
    pub time: f64,
    /// How this point was reached.
    pub status: StepStatus,
}

impl StepPoint {
    /// Construct a step point.
    pub fn new(position: Point3, time: f64, status: StepStatus) -> Self {
        Self {
            position,
            time,
            status,
        }
    }
}

/// Particle properties relevant to hit bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Particle {
    /// PDG code; 0 for geantinos.
    pub pdg: i32,
    /// Charge in units of the positron charge.
    pub charge: f64,
    /// True for geantinos (non-interacting particles for geometry scans).
    pub geantino: bool,
}

/// One transport step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    /// Volume the step took place in (the pre-step volume).
    pub volume: VolumeId,
    /// Track taking the step.
    pub track: TrackId,
    /// Parent track, `None` for primaries.
    pub parent: Option<TrackId>,
    /// Shower the track belongs to, if showers are tracked.
    pub shower: Option<ShowerId>,
    /// Particle properties.
    pub particle: Particle,
    /// Start of the step.
    pub pre: StepPoint,
    /// End of the step.
    pub post: StepPoint,
    /// Total energy deposited during the step (GeV).
    pub edep: f64,
    /// Non-ionizing part of `edep` (GeV).
    pub non_ionizing_edep: f64,
    /// Step length (mm).
    pub step_length: f64,
    /// Kinetic energy of the track after the step (GeV).
    pub kinetic_energy: f64,
    /// Track status after the step.
    pub track_status: TrackStatus,
    /// True if this is the first step of the track.
    pub first_step: bool,
}

impl StepContext {
    /// Ionizing part of the deposit (GeV), never negative.
    pub fn ionizing_edep(&self) -> f64 {
        (self.edep - self.non_ionizing_edep).max(0.0)
    }

    /// True if the hit context this step belongs to ends with it: the
    /// track leaves the volume, stops, or is killed.
    pub fn ends_context(&self) -> bool {
        self.post.status.ends_context() || self.track_status.is_killed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(post_status: StepStatus, track_status: TrackStatus) -> StepContext {
        StepContext {
            volume: VolumeId(1),
            track: TrackId(1),
            parent: None,
            shower: None,
            particle: Particle::default(),
            pre: StepPoint::new(Point3::ORIGIN, 0.0, StepStatus::GeomBoundary),
            post: StepPoint::new(Point3::new(0.0, 0.0, 1.0), 0.1, post_status),
            edep: 0.3,
            non_ionizing_edep: 0.1,
            step_length: 1.0,
            kinetic_energy: 1.0,
            track_status,
            first_step: false,
        }
    }

    #[test]
    fn leaving_or_dying_ends_context() {
        assert!(step(StepStatus::GeomBoundary, TrackStatus::Alive).ends_context());
        assert!(step(StepStatus::WorldBoundary, TrackStatus::Alive).ends_context());
        assert!(step(StepStatus::AtRest, TrackStatus::Alive).ends_context());
        assert!(step(StepStatus::PostStep, TrackStatus::StopAndKill).ends_context());
        assert!(!step(StepStatus::PostStep, TrackStatus::Alive).ends_context());
        assert!(!step(StepStatus::AlongStep, TrackStatus::Suspend).ends_context());
    }

    #[test]
    fn ionizing_edep_excludes_non_ionizing_part() {
        let s = step(StepStatus::PostStep, TrackStatus::Alive);
        assert!((s.ionizing_edep() - 0.2).abs() < 1e-12);
    }
}
