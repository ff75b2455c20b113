use std::path::PathBuf;

use anyhow::Result;
use rand::RngCore;
use tracing::{debug, info};

use crate::{
    clock::WorldClock,
    commands::{apply_command, Command},
    error::CommandError,
    events::SimEvent,
    rng::{RngManager, SystemRng},
    snapshot::SnapshotWriter,
    systems::{
        BookkeepingSystem, CalendarSystem, ConstructionSystem, CropSystem, DecisionSystem,
        EconomySystem, EnvironmentSystem, GatheringSystem, LaborSystem, MilestoneSystem,
        PolicySystem, PopulationSystem, RegrowthSystem, TradeSystem, VictorySystem,
        WellbeingSystem,
    },
    world::WorldState,
};

const COMMAND_STREAM: &str = "commands";

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: Option<PathBuf>,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System + Send>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + Send + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Registers the full village tick in its fixed order.
    pub fn with_village_systems(self) -> Self {
        self.with_system(LaborSystem::new())
            .with_system(ConstructionSystem::new())
            .with_system(RegrowthSystem::new())
            .with_system(MilestoneSystem::new())
            .with_system(GatheringSystem::new())
            .with_system(CropSystem::new())
            .with_system(EconomySystem::new())
            .with_system(WellbeingSystem::new())
            .with_system(PopulationSystem::new())
            .with_system(EnvironmentSystem::new())
            .with_system(PolicySystem::new())
            .with_system(TradeSystem::new())
            .with_system(CalendarSystem::new())
            .with_system(DecisionSystem::new())
            .with_system(BookkeepingSystem::new())
            .with_system(VictorySystem::new())
    }

    pub fn build(self) -> Engine {
        let snapshot_writer = self
            .settings
            .snapshot_dir
            .as_ref()
            .map(|dir| SnapshotWriter::new(dir, self.settings.snapshot_interval_ticks));
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer,
            settings: self.settings,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub clock: WorldClock,
    pub events: Vec<SimEvent>,
    pub snapshot_path: Option<PathBuf>,
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System + Send>>,
    snapshot_writer: Option<SnapshotWriter>,
    settings: EngineSettings,
}

impl Engine {
    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    /// Runs one tick, each system drawing from its own seeded stream.
    pub fn tick(&mut self, world: &mut WorldState) -> Result<TickReport> {
        let current_tick = world.tick();
        for system in &mut self.systems {
            let mut stream = self.rng.stream(system.name());
            let ctx = SystemContext {
                tick: current_tick,
                scenario_name: &self.settings.scenario_name,
            };
            system.run(&ctx, world, &mut stream)?;
        }
        self.finish_tick(world)
    }

    /// Runs one tick with every system sharing `rng`.
    pub fn tick_with_rng(
        &mut self,
        world: &mut WorldState,
        rng: &mut dyn RngCore,
    ) -> Result<TickReport> {
        let current_tick = world.tick();
        for system in &mut self.systems {
            let mut stream = SystemRng::borrowed(&mut *rng);
            let ctx = SystemContext {
                tick: current_tick,
                scenario_name: &self.settings.scenario_name,
            };
            system.run(&ctx, world, &mut stream)?;
        }
        self.finish_tick(world)
    }

    fn finish_tick(&mut self, world: &mut WorldState) -> Result<TickReport> {
        world.advance_tick();
        let events = world.drain_events();
        let snapshot_path = match &mut self.snapshot_writer {
            Some(writer) => writer.maybe_write(world, &self.settings.scenario_name)?,
            None => None,
        };
        debug!(
            tick = world.tick(),
            pop = world.population.pop,
            food = world.stock.food,
            events = events.len(),
            "tick complete"
        );
        Ok(TickReport {
            tick: world.tick(),
            clock: world.clock,
            events,
            snapshot_path,
        })
    }

    /// Runs up to `ticks` ticks, stopping early on victory. Returns the number
    /// of ticks run.
    pub fn run(&mut self, world: &mut WorldState, ticks: u64) -> Result<u64> {
        self.run_with_hook(world, ticks, |_, _| {})
    }

    pub fn run_with_hook<F>(&mut self, world: &mut WorldState, ticks: u64, mut hook: F) -> Result<u64>
    where
        F: FnMut(&TickReport, &WorldState),
    {
        let mut ran = 0;
        while ran < ticks && !world.victory_reached {
            let report = self.tick(world)?;
            hook(&report, world);
            ran += 1;
        }
        if world.victory_reached {
            info!(tick = world.tick(), "victory reached, stopping");
        }
        Ok(ran)
    }

    pub fn apply_command(
        &mut self,
        world: &mut WorldState,
        command: Command,
    ) -> Result<Vec<SimEvent>, CommandError> {
        let mut stream = self.rng.stream(COMMAND_STREAM);
        apply_command(world, command, &mut stream)
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
