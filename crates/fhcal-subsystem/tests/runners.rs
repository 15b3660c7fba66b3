//! Event runners: sequential numbering, failure isolation, and batched
//! processing matching sequential processing.

use std::sync::Arc;

use fhcal_bench::{generate_event, reference_profile, ShowerProfile};
use fhcal_core::{Category, CellIndex, EventId, HitKey, StepError, TrackId, VolumeClassifier};
use fhcal_hits::{EventHits, HitRecord};
use fhcal_step::StepContext;
use fhcal_subsystem::{
    BatchedRunner, EventRunner, ForwardHcalSubsystem, MappingFile, RunError, SubsystemConfig,
};
use fhcal_test_utils::{towers, RecordingClassifier, StepBuilder, TrackWalk};
use proptest::prelude::*;
use tempfile::NamedTempFile;

fn small_profile() -> ShowerProfile {
    ShowerProfile {
        columns: 4,
        rows: 4,
        tracks: 30,
        ..reference_profile()
    }
}

/// Build a subsystem over a throwaway tower map; the map only has to
/// exist while the subsystem is constructed.
fn build(adjust: impl FnOnce(&mut SubsystemConfig)) -> ForwardHcalSubsystem {
    let map = NamedTempFile::new().unwrap();
    let mut config = SubsystemConfig::new(MappingFile::new(map.path()));
    adjust(&mut config);
    ForwardHcalSubsystem::new(config).unwrap()
}

fn subsystem(profile: &ShowerProfile) -> ForwardHcalSubsystem {
    let mut subsystem = build(|config| {
        config.absorber_active = true;
        config.support_active = true;
    });
    subsystem.init_run(Arc::new(profile.table())).unwrap();
    subsystem
}

fn records(hits: &EventHits) -> Vec<(Category, HitKey, HitRecord)> {
    Category::ALL
        .into_iter()
        .filter_map(|c| hits.collection(c))
        .flat_map(|col| col.iter().map(move |(k, h)| (col.category(), k, h.clone())))
        .collect()
}

fn bad_step() -> StepContext {
    StepBuilder::new(TrackId(1), towers::UNMAPPED).edep(0.1).build()
}

#[test]
fn sequential_events_are_numbered_from_the_start_id() {
    let profile = small_profile();
    let sub = subsystem(&profile);
    let mut runner = EventRunner::new(sub.processor().unwrap()).starting_at(EventId(10));
    let events: Vec<_> = (0..3).map(|s| generate_event(&profile, s)).collect();
    let hits = runner.run(events).unwrap();
    let ids: Vec<EventId> = hits.iter().map(EventHits::event).collect();
    assert_eq!(ids, vec![EventId(10), EventId(11), EventId(12)]);
    assert_eq!(runner.next_event(), EventId(13));
    assert!(hits.iter().all(|h| !h.is_empty()));
}

#[test]
fn failed_event_is_discarded_and_the_next_starts_clean() {
    let profile = small_profile();
    let sub = subsystem(&profile);
    let mut runner = EventRunner::new(sub.processor().unwrap());

    let cell = CellIndex::tower(0, 0);
    let mut broken = TrackWalk::new(TrackId(5), towers::active(cell))
        .step(0.2, 1.0)
        .stay();
    broken.push(bad_step());
    let err = runner.run_event(broken).unwrap_err();
    match err {
        RunError::Step { event, error } => {
            assert_eq!(event, EventId(0));
            assert!(matches!(error, StepError::Unclassifiable { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(runner.processor().open_count(), 0);

    let clean = TrackWalk::new(TrackId(6), towers::active(cell))
        .step(0.3, 1.0)
        .exit();
    let hits = runner.run_event(clean).unwrap();
    assert_eq!(hits.event(), EventId(1));
    assert_eq!(hits.active().len(), 1);
    assert!(hits.active().hits_for_track(TrackId(5)).next().is_none());
}

#[test]
fn batched_matches_sequential() {
    let profile = small_profile();
    let sub = subsystem(&profile);
    let events: Vec<_> = (0..12).map(|s| generate_event(&profile, s)).collect();

    let sequential = EventRunner::new(sub.processor().unwrap())
        .run(events.clone())
        .unwrap();
    let mut batched = BatchedRunner::new(&sub, Some(3)).unwrap();
    assert_eq!(batched.worker_count(), 3);
    let parallel = batched.run(events).unwrap();

    assert_eq!(parallel.len(), sequential.len());
    for (a, b) in sequential.iter().zip(&parallel) {
        assert_eq!(a.event(), b.event());
        assert_eq!(records(a), records(b));
        assert_eq!(a.showers().len(), b.showers().len());
    }
    assert_eq!(batched.next_event(), EventId(12));
}

#[test]
fn batches_continue_numbering() {
    let profile = small_profile();
    let sub = subsystem(&profile);
    let mut batched = BatchedRunner::new(&sub, Some(2)).unwrap();
    let first = batched.run((0..3).map(|s| generate_event(&profile, s))).unwrap();
    let second = batched.run((3..5).map(|s| generate_event(&profile, s))).unwrap();
    assert_eq!(first.last().unwrap().event(), EventId(2));
    assert_eq!(second[0].event(), EventId(3));
    assert_eq!(second[1].event(), EventId(4));
}

#[test]
fn batched_reports_lowest_failing_event() {
    let profile = small_profile();
    let sub = subsystem(&profile);
    let mut events: Vec<_> = (0..6).map(|s| generate_event(&profile, s)).collect();
    events[4].push(bad_step());
    events[2].insert(0, bad_step());

    let mut batched = BatchedRunner::new(&sub, Some(4)).unwrap();
    let err = batched.run(events).unwrap_err();
    assert!(matches!(err, RunError::Step { event: EventId(2), .. }));
    assert_eq!(batched.next_event(), EventId(6));
    assert!(batched.processors().iter().all(|p| p.open_count() == 0));
}

#[test]
fn classifier_is_shared_across_workers() {
    let profile = small_profile();
    let recording = Arc::new(RecordingClassifier::new(profile.table()));
    let classifier: Arc<dyn VolumeClassifier> = recording.clone();

    let mut sub = build(|_| {});
    sub.init_run(classifier).unwrap();
    let events: Vec<_> = (0..8).map(|s| generate_event(&profile, s)).collect();
    let steps: usize = events.iter().map(Vec::len).sum();

    BatchedRunner::new(&sub, Some(4)).unwrap().run(events).unwrap();
    assert_eq!(recording.calls(), steps);
}

#[test]
fn runner_needs_an_active_initialised_subsystem() {
    let mut sub = build(|config| config.active = false);
    assert!(matches!(
        BatchedRunner::new(&sub, Some(2)),
        Err(RunError::NoProcessor)
    ));
    sub.init_run(Arc::new(towers::table(2, 2))).unwrap();
    assert!(matches!(
        BatchedRunner::new(&sub, Some(2)),
        Err(RunError::NoProcessor)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn batched_equals_sequential_for_any_seed(seed in any::<u64>(), workers in 1usize..5, count in 1u64..8) {
        let profile = small_profile();
        let sub = subsystem(&profile);
        let events: Vec<_> = (0..count).map(|i| generate_event(&profile, seed ^ i)).collect();

        let sequential = EventRunner::new(sub.processor().unwrap()).run(events.clone()).unwrap();
        let parallel = BatchedRunner::new(&sub, Some(workers)).unwrap().run(events).unwrap();

        prop_assert_eq!(sequential.len(), parallel.len());
        for (a, b) in sequential.iter().zip(&parallel) {
            prop_assert_eq!(records(a), records(b));
        }
    }
}
