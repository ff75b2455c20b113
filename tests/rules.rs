mod common;

use common::{engine, FixedRng, LowRng};
use econoville::{
    buildings::BuildingKind,
    clock::Season,
    events::{DeathCause, SimEvent},
    milestones::MilestoneKey,
    session::{Gate, Session},
    world::WorldState,
};

fn victorious_village() -> WorldState {
    let mut world = WorldState::new();
    world.population.pop = 150;
    world.stock.food = 100_000.0;
    world.indicators.wage_above_13_years = 1;
    world.add_completed_building(BuildingKind::Market, 0.0, 0.0);
    for i in 0..3 {
        world.add_completed_building(BuildingKind::Mill, 40.0 * (i + 1) as f64, 0.0);
    }
    world
}

#[test]
fn famine_takes_fifteen_percent_and_resets_food() {
    let mut world = WorldState::new();
    world.population.pop = 100;
    world.clock.year = 3;
    world.stock.food = -50.0;
    let mut engine = engine("famine", 1);

    let report = engine.tick_with_rng(&mut world, &mut LowRng).unwrap();

    assert_eq!(world.population.pop, 85);
    assert_eq!(world.population.total_deaths, 15);
    // Five days of need at the pre-famine headcount.
    assert!((world.stock.food - 50.0).abs() < 1e-12);
    assert!(report.events.iter().any(|event| matches!(
        event,
        SimEvent::PopulationDied {
            cause: DeathCause::Famine,
            deaths: 15,
        }
    )));
}

#[test]
fn no_famine_before_the_third_year() {
    let mut world = WorldState::new();
    world.population.pop = 100;
    world.clock.year = 2;
    world.stock.food = -50.0;
    let mut engine = engine("famine-early", 1);

    let report = engine.tick_with_rng(&mut world, &mut LowRng).unwrap();

    assert_eq!(world.population.pop, 100);
    assert!(world.stock.food < -50.0);
    assert!(!report
        .events
        .iter()
        .any(|event| matches!(event, SimEvent::PopulationDied { .. })));
}

#[test]
fn victory_halts_the_run_and_the_session() {
    let mut world = victorious_village();
    let mut engine = engine("victory", 9);

    let ran = engine.run(&mut world, 50).unwrap();
    assert_eq!(ran, 1);
    assert!(world.victory_reached);
    assert_eq!(world.victory.progress(), 100);
    assert_eq!(engine.run(&mut world, 50).unwrap(), 0);
    assert_eq!(world.tick(), 1);

    let mut session = Session::new(world, engine, 1_000);
    assert_eq!(session.gate(), Some(Gate::Victory));
    assert!(session.step().unwrap().is_none());
    assert_eq!(session.world().tick(), 1);
}

#[test]
fn victory_progress_is_recomputed_each_tick() {
    let mut world = victorious_village();
    world.population.pop = 120;
    let mut engine = engine("progress", 2);
    let mut rng = FixedRng;

    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.victory.progress(), 75);
    assert!(!world.victory_reached);

    world.buildings.retain(|site| site.kind != BuildingKind::Mill);
    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.victory.progress(), 50);
    assert!(!world.victory.capital_goods);
}

#[test]
fn population_milestone_fires_once() {
    let mut world = WorldState::new();
    world.population.pop = 100;
    world.stock.food = 1_000.0;
    let mut engine = engine("hundred", 1);
    let mut rng = FixedRng;

    let mut reached = 0;
    for _ in 0..3 {
        let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
        reached += report
            .events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    SimEvent::MilestoneReached {
                        milestone: MilestoneKey::Population100
                    }
                )
            })
            .count();
    }
    assert_eq!(reached, 1);
    assert!(world.milestones.is_complete(MilestoneKey::Population100));
    assert!((world.indicators.tfp - 1.1).abs() < 1e-12);
}

#[test]
fn wage_streak_counts_prosperous_seasons_and_resets() {
    let mut world = WorldState::new();
    world.stock.food = 1_000.0;
    world.clock.day = 90;
    let mut engine = engine("wage", 1);
    let mut rng = FixedRng;

    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.clock.season, Season::Summer);
    assert_eq!(world.indicators.wage_above_13_years, 1);

    // The streak only moves at a season rollover.
    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.indicators.wage_above_13_years, 1);
    assert!(world.milestones.is_complete(MilestoneKey::SustainedWage));

    world.stock.food = 0.0;
    world.clock.day = 90;
    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.clock.season, Season::Autumn);
    assert_eq!(world.indicators.wage_above_13_years, 0);
}
