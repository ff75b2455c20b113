use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::{
    buildings::BuildingKind,
    crops::CropKind,
    labor::{LaborAllocation, LaborSkills, Role},
    resources::{spawn_initial_nodes, GroundBounds},
    tech::{TechKey, TechSet},
    weather::WeatherState,
    world::WorldState,
};

fn default_ticks() -> u64 {
    1_080
}

fn default_tick_ms() -> u64 {
    1_000
}

fn default_snapshot_interval_ticks() -> u64 {
    90
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pop() -> u32 {
    80
}

fn default_materials() -> f64 {
    30.0
}

fn default_food() -> f64 {
    20.0
}

fn default_health() -> f64 {
    0.6
}

fn default_morale() -> f64 {
    0.6
}

fn default_crop() -> CropKind {
    CropKind::Wheat
}

fn default_trees() -> usize {
    5
}

fn default_rocks() -> usize {
    3
}

fn default_techs() -> Vec<TechKey> {
    vec![TechKey::BasicFarming]
}

fn default_buildings() -> Vec<StartingBuilding> {
    let farms = (0..3).map(|i| StartingBuilding {
        kind: BuildingKind::Farm,
        x: 150.0 + i as f64 * 80.0,
        y: 100.0,
    });
    let houses = (0..2).map(|i| StartingBuilding {
        kind: BuildingKind::House,
        x: 200.0 + i as f64 * 80.0,
        y: 40.0,
    });
    farms.chain(houses).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub village: VillageConfig,
    #[serde(default)]
    pub labor: LaborAllocation,
    #[serde(default = "default_buildings")]
    pub buildings: Vec<StartingBuilding>,
    #[serde(default)]
    pub nodes: NodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VillageConfig {
    #[serde(default = "default_pop")]
    pub pop: u32,
    #[serde(default = "default_materials")]
    pub materials: f64,
    #[serde(default = "default_food")]
    pub food: f64,
    #[serde(default)]
    pub livestock: u32,
    #[serde(default = "default_health")]
    pub health: f64,
    #[serde(default = "default_morale")]
    pub morale: f64,
    #[serde(default = "default_crop")]
    pub crop: CropKind,
    #[serde(default = "default_techs")]
    pub techs: Vec<TechKey>,
}

impl Default for VillageConfig {
    fn default() -> Self {
        Self {
            pop: default_pop(),
            materials: default_materials(),
            food: default_food(),
            livestock: 0,
            health: default_health(),
            morale: default_morale(),
            crop: default_crop(),
            techs: default_techs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingBuilding {
    pub kind: BuildingKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_trees")]
    pub trees: usize,
    #[serde(default = "default_rocks")]
    pub rocks: usize,
    #[serde(default)]
    pub bounds: GroundBounds,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            trees: default_trees(),
            rocks: default_rocks(),
            bounds: GroundBounds::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.village.pop >= 10, "village.pop must be at least 10");
        ensure!(self.tick_ms > 0, "tick_ms must be positive");
        for role in Role::ALL {
            let share = self.labor.share(role);
            ensure!(
                share.is_finite() && share >= 0.0,
                "labor share for {role} must be non-negative, got {share}"
            );
        }
        for (field, value) in [("health", self.village.health), ("morale", self.village.morale)] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "village.{field} must be within [0, 1], got {value}"
            );
        }
        ensure!(
            self.labor.total() <= 1.0 + 1e-9,
            "labor shares sum to {:.2}, above 1.0",
            self.labor.total()
        );
        Ok(())
    }

    /// Builds the starting village. `rng` places resource nodes and rolls the
    /// opening weather.
    pub fn build_world(&self, rng: &mut dyn RngCore) -> WorldState {
        let mut world = WorldState::new();
        let village = &self.village;
        world.population.pop = village.pop;
        world.stock.materials = village.materials;
        world.stock.food = village.food;
        world.stock.livestock = village.livestock;
        world.indicators.health = village.health;
        world.indicators.morale = village.morale;
        world.default_crop = village.crop;
        world.techs = TechSet::with(village.techs.iter().copied());

        let mut labor = self.labor;
        labor.normalize();
        labor.set_intensity(labor.work_intensity);
        world.labor = labor;
        world.skills = LaborSkills::matching(&labor);

        for building in &self.buildings {
            world.add_completed_building(building.kind, building.x, building.y);
        }
        world.population.cap = world.housing_cap();

        world.bounds = self.nodes.bounds;
        world.nodes = spawn_initial_nodes(
            self.nodes.trees,
            self.nodes.rocks,
            &world.bounds,
            &world.buildings,
            rng,
        );
        world.weather = WeatherState::roll_initial(world.clock.season, rng);
        world
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.unwrap_or(self.ticks)
    }
}
