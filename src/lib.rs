pub mod buildings;
pub mod clock;
pub mod commands;
pub mod crops;
pub mod decisions;
pub mod engine;
pub mod error;
pub mod events;
pub mod farm;
pub mod labor;
pub mod milestones;
pub mod policy;
pub mod resources;
pub mod rng;
pub mod scenario;
pub mod session;
pub mod snapshot;
pub mod systems;
pub mod tech;
pub mod trade;
pub mod weather;
pub mod web;
pub mod world;

pub use commands::{apply_command, Command};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickReport};
pub use error::{CommandError, PersistenceError};
pub use events::SimEvent;
pub use scenario::{Scenario, ScenarioLoader};
pub use session::{Control, Session};
pub use world::{WorldSnapshot, WorldState};
