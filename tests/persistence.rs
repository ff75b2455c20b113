mod common;

use std::fs;

use common::village_scenario;
use econoville::{
    engine::{EngineBuilder, EngineSettings},
    error::PersistenceError,
    session::Session,
    snapshot::{load_world, save_world, HISTORY_HEADER},
    world::WorldSnapshot,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

#[test]
fn engine_runs_hook_each_tick_and_writes_snapshots() {
    let scenario = village_scenario();
    let mut world = scenario.build_world(&mut ChaCha8Rng::seed_from_u64(scenario.seed));
    let temp = tempdir().expect("tempdir");
    let mut engine = EngineBuilder::new(EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: 3,
        snapshot_dir: Some(temp.path().to_path_buf()),
    })
    .with_village_systems()
    .build();

    let mut ticks = Vec::new();
    let mut written = Vec::new();
    let ran = engine
        .run_with_hook(&mut world, 6, |report, _| {
            ticks.push(report.tick);
            written.extend(report.snapshot_path.clone());
        })
        .expect("run succeeds");

    assert_eq!(ran, 6);
    assert_eq!(ticks, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(written.len(), 2);
    let raw = fs::read_to_string(&written[1]).expect("snapshot readable");
    let snapshot: WorldSnapshot = serde_json::from_str(&raw).expect("snapshot parses");
    assert_eq!(snapshot.tick, 6);
    assert_eq!(snapshot.scenario, "village");
    assert_eq!(snapshot.farms.len(), 3);
}

#[test]
fn seeded_runs_are_reproducible() {
    let scenario = village_scenario();
    let run = || {
        let mut session = Session::from_scenario(&scenario, None);
        for _ in 0..200 {
            session.step().unwrap();
            if session.world().pending_decision.is_some() {
                break;
            }
        }
        serde_json::to_string(&session.snapshot()).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn save_then_load_restores_the_village() {
    let scenario = village_scenario();
    let mut session = Session::from_scenario(&scenario, None);
    for _ in 0..25 {
        session.step().unwrap();
    }
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("saves").join("village.json");
    session.save(&path).unwrap();

    let before = serde_json::to_value(session.world()).unwrap();
    let saved = load_world(&path).unwrap();
    assert_eq!(saved.scenario, "village");
    assert_eq!(serde_json::to_value(&saved.world).unwrap(), before);

    let mut fresh = Session::from_scenario(&scenario, None);
    fresh.load(&path).unwrap();
    assert_eq!(fresh.world().tick(), 25);
    assert_eq!(fresh.world().plots.len(), session.world().plots.len());
}

#[test]
fn corrupt_save_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_world(&path), Err(PersistenceError::Json(_))));

    let scenario = village_scenario();
    let mut session = Session::from_scenario(&scenario, None);
    session.step().unwrap();
    assert!(session.load(&path).is_err());
    assert_eq!(session.world().tick(), 1);
}

#[test]
fn history_is_recorded_and_exported() {
    let scenario = village_scenario();
    let mut session = Session::from_scenario(&scenario, None);
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("plain.json");
    save_world(&path, "village", session.world()).unwrap();

    for _ in 0..30 {
        session.step().unwrap();
    }
    let csv = session.history_csv();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(HISTORY_HEADER));
    let rows: Vec<&str> = lines.collect();
    assert!(!rows.is_empty());
    for row in rows {
        assert_eq!(row.split(',').count(), 8);
    }
}
