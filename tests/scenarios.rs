mod common;

use common::{engine, FixedRng};
use econoville::{
    buildings::BuildingKind,
    clock::Season,
    commands::{apply_command, Command},
    crops::CropKind,
    error::CommandError,
    events::{DeathCause, SimEvent},
    farm::{CropStage, FarmPlot},
    resources::{NodeKind, ResourceNode, REGROW_DELAY_YEARS},
    tech::TechKey,
    world::WorldState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn empty_village_food_follows_forage_minus_need() {
    let mut world = WorldState::new();
    let mut engine = engine("food", 1);
    let mut rng = FixedRng;

    for _ in 0..90 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();
    }

    // 8 gatherers forage 2.4, a quarter spoils, half the rest is tithed.
    let kept = 8.0 * 0.3 * 0.75 * 0.5;
    let expected = 20.0 + 90.0 * (kept - 8.0);
    assert_eq!(world.population.pop, 80);
    assert!(
        (world.stock.food - expected).abs() < 1e-6,
        "food {} expected {}",
        world.stock.food,
        expected
    );
}

#[test]
fn summer_barley_farm_feeds_through_spoilage_tithes_and_soil_drain() {
    let mut world = WorldState::new();
    world.clock.season = Season::Summer;
    let farm = world.add_completed_building(BuildingKind::Farm, 0.0, 0.0);
    let mut plot = FarmPlot::plant(CropKind::Barley, &world.clock);
    plot.mature = true;
    world.plots.insert(farm, plot);
    let mut engine = engine("barley-summer", 1);
    let mut rng = FixedRng;

    let (mut food, mut morale, mut land) = (20.0_f64, 0.6_f64, 1.0_f64);
    for tick in 1..=20 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();

        // One farm on all 100 land, 40 farmers of 80, summer, sunny.
        let farm_food = 2.0 * 0.9 * land * 10.0_f64.powf(0.6) * 0.5 * 0.6
            * (1.0 + (morale - 0.5) * 0.2);
        let gross = farm_food + 8.0 * 0.3;
        food += (gross - gross * 0.25) * 0.5 - 8.0;
        morale = if food > 56.0 {
            morale + 0.01
        } else if food < 24.0 {
            morale - 0.02
        } else {
            morale
        }
        .clamp(0.0, 1.0);
        land = (land - 0.018).max(0.5);

        assert!(
            (world.stock.food - food).abs() < 1e-9,
            "tick {tick}: food {} expected {food}",
            world.stock.food
        );
        assert!(
            (world.indicators.land_quality - land).abs() < 1e-9,
            "tick {tick}: land {} expected {land}",
            world.indicators.land_quality
        );
    }
    assert_eq!(world.stage_of(farm), CropStage::Mature);
    assert_eq!(world.population.pop, 80);
}

#[test]
fn no_births_while_food_is_in_deficit() {
    for seed in 0..40 {
        let mut world = WorldState::new();
        world.population.pop = 100;
        world.stock.food = -50.0;
        world.clock.season = Season::Winter;
        let mut engine = engine("deficit", seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut last_pop = world.population.pop;
        for _ in 0..30 {
            let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
            assert!(world.population.pop <= last_pop, "seed {seed}: population grew");
            assert!(world.population.pop >= 10);
            for event in &report.events {
                assert!(!matches!(event, SimEvent::PopulationBorn { .. }));
                if let SimEvent::PopulationDied {
                    cause: DeathCause::WinterDisease,
                    deaths,
                } = event
                {
                    assert!(*deaths >= 2, "seed {seed}: winter toll {deaths}");
                }
            }
            last_pop = world.population.pop;
        }
    }
}

#[test]
fn three_field_unlock_spends_once() {
    let mut world = WorldState::new();
    world.stock.materials = 25.0;
    let mut rng = FixedRng;

    let events = apply_command(
        &mut world,
        Command::UnlockTech {
            key: TechKey::ThreeField,
        },
        &mut rng,
    )
    .unwrap();
    assert!((world.stock.materials - 5.0).abs() < 1e-12);
    assert!((world.indicators.tfp - 1.15).abs() < 1e-12);
    assert!(world.techs.has(TechKey::ThreeField));
    assert!(events
        .iter()
        .any(|event| matches!(event, SimEvent::TechUnlocked { key: TechKey::ThreeField, .. })));

    let again = apply_command(
        &mut world,
        Command::UnlockTech {
            key: TechKey::ThreeField,
        },
        &mut rng,
    );
    assert_eq!(again, Err(CommandError::AlreadyUnlocked(TechKey::ThreeField)));
    assert!((world.stock.materials - 5.0).abs() < 1e-12);
    assert!((world.indicators.tfp - 1.15).abs() < 1e-12);
}

#[test]
fn barley_farm_builds_then_matures_on_schedule() {
    let mut world = WorldState::new();
    world.default_crop = CropKind::Barley;
    let mut engine = engine("barley", 1);
    let mut rng = FixedRng;
    let farm = world.place_building(BuildingKind::Farm, 100.0, 100.0).unwrap();
    assert_eq!(world.stage_of(farm), CropStage::Empty);

    // 24 builders put in 0.48 a tick against a duration of 5.
    for tick in 1..=10 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();
        assert!(!world.building(farm).unwrap().done, "done early at {tick}");
    }
    let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert!(world.building(farm).unwrap().done);
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, SimEvent::BuildingCompleted { id, .. } if *id == farm)));
    assert_eq!(world.stage_of(farm), CropStage::Growing);

    for _ in 0..119 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();
        assert_eq!(world.stage_of(farm), CropStage::Growing);
    }
    let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.stage_of(farm), CropStage::Mature);
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, SimEvent::CropMatured { farm: f, .. } if *f == farm)));
}

#[test]
fn gathered_node_is_exclusive_then_queued_for_regrowth() {
    let mut world = WorldState::new();
    world
        .nodes
        .push(ResourceNode::new("tree0", NodeKind::Tree, 500.0, 300.0));
    let mut engine = engine("gather", 1);
    let mut rng = FixedRng;

    world.harvest_node("tree0").unwrap();
    assert_eq!(
        world.harvest_node("tree0"),
        Err(CommandError::NodeBusy("tree0".to_string()))
    );
    assert_eq!(world.gather_jobs.len(), 1);

    let materials_before = world.stock.materials;
    for _ in 0..19 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();
        assert!(world.node("tree0").is_some());
    }
    engine.tick_with_rng(&mut world, &mut rng).unwrap();

    assert!(world.node("tree0").is_none());
    assert!(world.gather_jobs.is_empty());
    assert!((world.stock.materials - materials_before - 4.0).abs() < 1e-9);
    assert_eq!(world.regrow_queue.len(), 1);
    assert_eq!(
        world.regrow_queue[0].regen_year,
        world.clock.year + REGROW_DELAY_YEARS
    );
    assert_eq!(
        world.harvest_node("tree0"),
        Err(CommandError::UnknownNode("tree0".to_string()))
    );
}

#[test]
fn non_hardy_crops_die_only_on_entering_winter() {
    let mut world = WorldState::new();
    world.default_crop = CropKind::Legumes;
    world.clock.season = Season::Autumn;
    world.clock.day = 89;
    let legumes = world.add_completed_building(BuildingKind::Farm, 0.0, 0.0);
    let rye = world.add_completed_building(BuildingKind::Farm, 80.0, 0.0);
    world
        .plots
        .insert(legumes, FarmPlot::plant(CropKind::Legumes, &world.clock));
    world
        .plots
        .insert(rye, FarmPlot::plant(CropKind::Rye, &world.clock));
    let mut engine = engine("winter", 1);
    let mut rng = FixedRng;

    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.clock.season, Season::Autumn);
    assert!(world.plots.contains_key(&legumes));

    let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.clock.season, Season::Winter);
    assert!(!world.plots.contains_key(&legumes));
    assert!(world.plots.contains_key(&rye));
    assert!(report.events.iter().any(
        |event| matches!(event, SimEvent::CropsWinterKilled { farms } if farms == &vec![legumes])
    ));

    // Planted mid-winter, it survives the rest of the season.
    world
        .plots
        .insert(legumes, FarmPlot::plant(CropKind::Legumes, &world.clock));
    for _ in 0..10 {
        let report = engine.tick_with_rng(&mut world, &mut rng).unwrap();
        assert!(!report
            .events
            .iter()
            .any(|event| matches!(event, SimEvent::CropsWinterKilled { .. })));
    }
    assert!(world.plots.contains_key(&legumes));
}

#[test]
fn harvested_field_lies_fallow_until_planting_season() {
    let mut world = WorldState::new();
    world.clock.season = Season::Summer;
    world.default_crop = CropKind::Barley;
    let farm = world.add_completed_building(BuildingKind::Farm, 0.0, 0.0);
    let mut plot = FarmPlot::plant(CropKind::Barley, &world.clock);
    plot.mature = true;
    world.plots.insert(farm, plot);
    world.pools = econoville::labor::LaborPools::from_allocation(80, &world.labor);
    world.harvest_farm(farm).unwrap();

    let mut engine = engine("fallow", 1);
    let mut rng = FixedRng;
    for _ in 0..5 {
        engine.tick_with_rng(&mut world, &mut rng).unwrap();
    }
    assert_eq!(world.stage_of(farm), CropStage::Harvested);
    let snapshot = world.snapshot("fallow");
    assert_eq!(snapshot.farms[0].stage, CropStage::Harvested);

    world.clock.season = Season::Spring;
    engine.tick_with_rng(&mut world, &mut rng).unwrap();
    assert_eq!(world.stage_of(farm), CropStage::Growing);
    assert_eq!(world.plots[&farm].crop, CropKind::Barley);
}
