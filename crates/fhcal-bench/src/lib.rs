//! Synthetic shower profiles for benchmarking FHCAL step processing.
//!
//! - [`reference_profile`]: 16x16 towers, 200 tracks per event
//! - [`stress_profile`]: 64x64 towers, 5000 tracks per event
//! - [`generate_event`]: deterministic, interleaved steps for one event
//!
//! Events are generated from a seeded ChaCha8 RNG, so the same
//! `(profile, seed)` always yields the same steps.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;

use fhcal_core::{CellIndex, Point3, ShowerId, TrackId, VolumeId, VolumeTable};
use fhcal_step::StepContext;
use fhcal_test_utils::{towers, TrackWalk};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Shape of a synthetic event.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowerProfile {
    /// Tower columns.
    pub columns: u16,
    /// Tower rows.
    pub rows: u16,
    /// Tracks per event.
    pub tracks: u32,
    /// Upper bound of steps per track (at least one).
    pub max_steps: u32,
    /// Upper bound of a single step's deposit (GeV).
    pub max_edep: f64,
    /// Tracks sharing one shower id.
    pub tracks_per_shower: u32,
    /// Fraction of tracks in absorber volumes.
    pub absorber_fraction: f64,
    /// Fraction of tracks in support volumes.
    pub support_fraction: f64,
    /// Probability that a track's last step exits its volume; the others
    /// are left open for the end-of-event flush.
    pub exit_probability: f64,
}

/// 16x16 towers, 200 tracks of up to 8 steps.
pub fn reference_profile() -> ShowerProfile {
    ShowerProfile {
        columns: 16,
        rows: 16,
        tracks: 200,
        max_steps: 8,
        max_edep: 0.01,
        tracks_per_shower: 20,
        absorber_fraction: 0.6,
        support_fraction: 0.05,
        exit_probability: 0.9,
    }
}

/// 64x64 towers, 5000 tracks of up to 16 steps.
pub fn stress_profile() -> ShowerProfile {
    ShowerProfile {
        columns: 64,
        rows: 64,
        tracks: 5000,
        max_steps: 16,
        ..reference_profile()
    }
}

impl ShowerProfile {
    /// The tower table events of this profile step through.
    pub fn table(&self) -> VolumeTable {
        towers::table(self.columns, self.rows)
    }
}

/// Generate one event's steps.
///
/// Tracks are laid out independently, then their steps are interleaved
/// at random while each track's own steps stay in order.
pub fn generate_event(profile: &ShowerProfile, seed: u64) -> Vec<StepContext> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut walks: Vec<VecDeque<StepContext>> = (0..profile.tracks)
        .map(|t| generate_track(profile, &mut rng, t).into())
        .collect();

    let total = walks.iter().map(VecDeque::len).sum();
    let mut steps = Vec::with_capacity(total);
    let mut live: Vec<usize> = (0..walks.len()).filter(|i| !walks[*i].is_empty()).collect();
    while !live.is_empty() {
        let slot = rng.random_range(0..live.len());
        let walk = &mut walks[live[slot]];
        steps.extend(walk.pop_front());
        if walk.is_empty() {
            live.swap_remove(slot);
        }
    }
    steps
}

fn generate_track(profile: &ShowerProfile, rng: &mut ChaCha8Rng, index: u32) -> Vec<StepContext> {
    let cell = CellIndex::tower(
        rng.random_range(0..profile.columns.max(1)),
        rng.random_range(0..profile.rows.max(1)),
    );
    let roll: f64 = rng.random();
    let volume: VolumeId = if roll < profile.absorber_fraction {
        towers::absorber(cell)
    } else if roll < profile.absorber_fraction + profile.support_fraction {
        towers::support(cell)
    } else {
        towers::active(cell)
    };

    let entry = Point3::new(
        f64::from(cell.j) * 100.0 + rng.random_range(0.0..100.0),
        f64::from(cell.k) * 100.0 + rng.random_range(0.0..100.0),
        4000.0 + rng.random_range(0.0..1000.0),
    );
    let mut walk = TrackWalk::new(TrackId(index as i32 + 1), volume)
        .shower(ShowerId((index / profile.tracks_per_shower.max(1)) as i32 + 1))
        .enter_at(entry, 13.3 + rng.random_range(0.0..5.0));
    for _ in 0..rng.random_range(1..=profile.max_steps.max(1)) {
        walk = walk.step(
            rng.random_range(0.0..profile.max_edep),
            rng.random_range(0.1..2.0),
        );
    }
    if rng.random_bool(profile.exit_probability.clamp(0.0, 1.0)) {
        walk.exit()
    } else {
        walk.stay()
    }
}
