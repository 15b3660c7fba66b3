//! Builders for transport steps.

use fhcal_core::{Point3, ShowerId, TrackId, VolumeId};
use fhcal_step::{Particle, StepContext, StepPoint, StepStatus, TrackStatus};

/// Speed of light (mm/ns); walks advance time as if at `c`.
const C_MM_PER_NS: f64 = 299.792458;

/// Fluent builder for a single [`StepContext`].
///
/// Defaults: a charged particle entering the volume at the origin at
/// t = 0 and moving 1 mm along z without leaving it, zero deposit, 1 GeV
/// kinetic energy left.
pub struct StepBuilder {
    step: StepContext,
    explicit_length: bool,
}

impl StepBuilder {
    pub fn new(track: TrackId, volume: VolumeId) -> Self {
        Self {
            step: StepContext {
                volume,
                track,
                parent: None,
                shower: None,
                particle: Particle {
                    pdg: 211,
                    charge: 1.0,
                    geantino: false,
                },
                pre: StepPoint::new(Point3::ORIGIN, 0.0, StepStatus::GeomBoundary),
                post: StepPoint::new(
                    Point3::new(0.0, 0.0, 1.0),
                    1.0 / C_MM_PER_NS,
                    StepStatus::PostStep,
                ),
                edep: 0.0,
                non_ionizing_edep: 0.0,
                step_length: 1.0,
                kinetic_energy: 1.0,
                track_status: TrackStatus::Alive,
                first_step: false,
            },
            explicit_length: false,
        }
    }

    pub fn from(mut self, position: Point3, time: f64) -> Self {
        self.step.pre.position = position;
        self.step.pre.time = time;
        self
    }

    pub fn to(mut self, position: Point3, time: f64) -> Self {
        self.step.post.position = position;
        self.step.post.time = time;
        self
    }

    pub fn pre_status(mut self, status: StepStatus) -> Self {
        self.step.pre.status = status;
        self
    }

    pub fn post_status(mut self, status: StepStatus) -> Self {
        self.step.post.status = status;
        self
    }

    /// The step ends on the volume boundary.
    pub fn exits(self) -> Self {
        self.post_status(StepStatus::GeomBoundary)
    }

    pub fn track_status(mut self, status: TrackStatus) -> Self {
        self.step.track_status = status;
        self
    }

    pub fn shower(mut self, shower: ShowerId) -> Self {
        self.step.shower = Some(shower);
        self
    }

    pub fn edep(mut self, edep: f64) -> Self {
        self.step.edep = edep;
        self
    }

    pub fn non_ionizing(mut self, edep: f64) -> Self {
        self.step.non_ionizing_edep = edep;
        self
    }

    pub fn kinetic_energy(mut self, energy: f64) -> Self {
        self.step.kinetic_energy = energy;
        self
    }

    pub fn charge(mut self, charge: f64) -> Self {
        self.step.particle.charge = charge;
        self
    }

    /// Override the step length; otherwise it is the pre/post distance.
    pub fn length(mut self, length: f64) -> Self {
        self.step.step_length = length;
        self.explicit_length = true;
        self
    }

    /// Mark the step as the first of its track.
    pub fn first_step(mut self) -> Self {
        self.step.first_step = true;
        self.step.pre.status = StepStatus::Undefined;
        self
    }

    /// Turn the particle into a neutral geantino.
    pub fn geantino(mut self) -> Self {
        self.step.particle = Particle {
            pdg: 0,
            charge: 0.0,
            geantino: true,
        };
        self
    }

    pub fn build(mut self) -> StepContext {
        if !self.explicit_length {
            self.step.step_length = self.step.pre.position.distance(&self.step.post.position);
        }
        self.step
    }
}

/// A chain of steps taken by one track through one volume.
///
/// Each step starts where the previous one ended and advances along z.
/// The first step enters through the boundary; [`exit()`](TrackWalk::exit)
/// makes the last one leave through it, [`stay()`](TrackWalk::stay)
/// leaves the track inside.
pub struct TrackWalk {
    track: TrackId,
    volume: VolumeId,
    shower: Option<ShowerId>,
    entry: Point3,
    entry_time: f64,
    steps: Vec<(f64, f64)>,
}

impl TrackWalk {
    pub fn new(track: TrackId, volume: VolumeId) -> Self {
        Self {
            track,
            volume,
            shower: None,
            entry: Point3::new(0.0, 0.0, 4000.0),
            entry_time: 13.3,
            steps: Vec::new(),
        }
    }

    pub fn shower(mut self, shower: ShowerId) -> Self {
        self.shower = Some(shower);
        self
    }

    pub fn enter_at(mut self, position: Point3, time: f64) -> Self {
        self.entry = position;
        self.entry_time = time;
        self
    }

    /// Add a step depositing `edep` GeV over `dz` mm.
    pub fn step(mut self, edep: f64, dz: f64) -> Self {
        self.steps.push((edep, dz));
        self
    }

    /// Steps ending with the track leaving the volume.
    pub fn exit(self) -> Vec<StepContext> {
        self.build(StepStatus::GeomBoundary)
    }

    /// Steps ending with the track still inside the volume.
    pub fn stay(self) -> Vec<StepContext> {
        self.build(StepStatus::PostStep)
    }

    fn build(self, last_status: StepStatus) -> Vec<StepContext> {
        let mut position = self.entry;
        let mut time = self.entry_time;
        let n = self.steps.len();
        let mut out = Vec::with_capacity(n);
        for (i, (edep, dz)) in self.steps.into_iter().enumerate() {
            let next = Point3::new(position.x, position.y, position.z + dz);
            let next_time = time + dz / C_MM_PER_NS;
            let pre_status = if i == 0 {
                StepStatus::GeomBoundary
            } else {
                StepStatus::PostStep
            };
            let post_status = if i + 1 == n {
                last_status
            } else {
                StepStatus::PostStep
            };
            let mut builder = StepBuilder::new(self.track, self.volume)
                .from(position, time)
                .to(next, next_time)
                .pre_status(pre_status)
                .post_status(post_status)
                .edep(edep);
            if let Some(shower) = self.shower {
                builder = builder.shower(shower);
            }
            out.push(builder.build());
            position = next;
            time = next_time;
        }
        out
    }
}
