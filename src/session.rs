use std::path::{Path, PathBuf};

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    commands::Command,
    engine::{Engine, EngineBuilder, EngineSettings, TickReport},
    error::{CommandError, PersistenceError},
    events::SimEvent,
    scenario::Scenario,
    snapshot::{self, history_csv},
    world::{WorldSnapshot, WorldState},
};

pub const MIN_SPEED_MS: u64 = 50;
pub const MAX_SPEED_MS: u64 = 10_000;

/// Driver controls. These never touch simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    SetSpeed { ms: u64 },
    Pause,
    Resume,
}

/// Why a step did not advance the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gate {
    Paused,
    AwaitingDecision,
    Victory,
}

/// Owns the village and its engine, and gates ticking on pause, pending
/// decisions and victory.
pub struct Session {
    world: WorldState,
    engine: Engine,
    scenario_name: String,
    paused: bool,
    speed_ms: u64,
}

impl Session {
    pub fn new(world: WorldState, engine: Engine, speed_ms: u64) -> Self {
        let scenario_name = engine.scenario_name().to_string();
        Self {
            world,
            engine,
            scenario_name,
            paused: false,
            speed_ms: speed_ms.clamp(MIN_SPEED_MS, MAX_SPEED_MS),
        }
    }

    pub fn from_scenario(scenario: &Scenario, snapshot_dir: Option<PathBuf>) -> Self {
        let mut setup_rng = ChaCha8Rng::seed_from_u64(scenario.seed);
        let world = scenario.build_world(&mut setup_rng);
        let engine = EngineBuilder::new(EngineSettings {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            snapshot_interval_ticks: scenario.snapshot_interval_ticks,
            snapshot_dir,
        })
        .with_village_systems()
        .build();
        Self::new(world, engine, scenario.tick_ms)
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn gate(&self) -> Option<Gate> {
        if self.world.victory_reached {
            Some(Gate::Victory)
        } else if self.world.pending_decision.is_some() {
            Some(Gate::AwaitingDecision)
        } else if self.paused {
            Some(Gate::Paused)
        } else {
            None
        }
    }

    /// Advances one tick unless gated.
    pub fn step(&mut self) -> Result<Option<TickReport>> {
        if self.gate().is_some() {
            return Ok(None);
        }
        self.engine.tick(&mut self.world).map(Some)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn set_speed(&mut self, ms: u64) {
        self.speed_ms = ms.clamp(MIN_SPEED_MS, MAX_SPEED_MS);
    }

    pub fn control(&mut self, control: Control) {
        match control {
            Control::SetSpeed { ms } => self.set_speed(ms),
            Control::Pause => self.pause(),
            Control::Resume => self.resume(),
        }
        info!(?control, paused = self.paused, speed_ms = self.speed_ms, "driver control");
    }

    pub fn apply(&mut self, command: Command) -> Result<Vec<SimEvent>, CommandError> {
        self.engine.apply_command(&mut self.world, command)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot(&self.scenario_name)
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        snapshot::save_world(path, &self.scenario_name, &self.world)
    }

    /// Replaces the world with a saved one. On failure the current world is
    /// kept.
    pub fn load(&mut self, path: &Path) -> Result<(), PersistenceError> {
        let save = snapshot::load_world(path)?;
        self.world = save.world;
        Ok(())
    }

    pub fn history_csv(&self) -> String {
        history_csv(&self.world.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decisions::{DecisionKind, PendingDecision};

    fn session() -> Session {
        let scenario: Scenario = serde_yaml::from_str("name: session\nseed: 3\n").unwrap();
        Session::from_scenario(&scenario, None)
    }

    #[test]
    fn pause_blocks_steps() {
        let mut session = session();
        session.pause();
        assert!(session.step().unwrap().is_none());
        assert_eq!(session.world().tick(), 0);
        session.resume();
        assert!(session.step().unwrap().is_some());
        assert_eq!(session.world().tick(), 1);
    }

    #[test]
    fn pending_decision_blocks_until_resolved() {
        let mut session = session();
        session.world.pending_decision = Some(PendingDecision {
            kind: DecisionKind::Festival,
            raised_tick: 0,
        });
        assert_eq!(session.gate(), Some(Gate::AwaitingDecision));
        assert!(session.step().unwrap().is_none());
        session
            .apply(Command::ResolveDecision { accept: false })
            .unwrap();
        assert_eq!(session.gate(), None);
    }

    #[test]
    fn speed_is_clamped() {
        let mut session = session();
        session.control(Control::SetSpeed { ms: 1 });
        assert_eq!(session.speed_ms(), MIN_SPEED_MS);
        session.control(Control::SetSpeed { ms: 250 });
        assert_eq!(session.speed_ms(), 250);
    }

    #[test]
    fn failed_load_keeps_world() {
        let mut session = session();
        session.step().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(session.load(&missing).is_err());
        assert_eq!(session.world().tick(), 1);
    }
}
