use serde::{Deserialize, Serialize};

use crate::{
    buildings::{BuildingId, BuildingKind},
    clock::Season,
    crops::CropKind,
    decisions::DecisionKind,
    milestones::MilestoneKey,
    policy::LandPolicy,
    resources::NodeKind,
    tech::TechKey,
    weather::Weather,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    WinterDisease,
    Disease,
    Famine,
    Riot,
}

/// Domain events produced by ticks and commands. Presentation layers turn
/// these into toasts, sounds and highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    BuildingPlaced {
        id: BuildingId,
        kind: BuildingKind,
        cost: f64,
    },
    BuildingCompleted {
        id: BuildingId,
        kind: BuildingKind,
    },
    CropSelectionRequested {
        farm: BuildingId,
    },
    CropPlanted {
        farm: BuildingId,
        crop: CropKind,
    },
    CropMatured {
        farm: BuildingId,
        crop: CropKind,
    },
    CropHarvested {
        farm: BuildingId,
        crop: CropKind,
        food: f64,
    },
    CropsWinterKilled {
        farms: Vec<BuildingId>,
    },
    GatherStarted {
        node_id: String,
        kind: NodeKind,
    },
    GatherCompleted {
        node_id: String,
        kind: NodeKind,
        materials: f64,
    },
    NodeRegrown {
        node_id: String,
        kind: NodeKind,
    },
    PopulationDied {
        cause: DeathCause,
        deaths: u32,
    },
    PopulationBorn {
        pop: u32,
    },
    LivestockBorn {
        livestock: u32,
    },
    MilestoneReached {
        milestone: MilestoneKey,
    },
    TechUnlocked {
        key: TechKey,
        cost: f64,
    },
    WeatherChanged {
        now: Weather,
        next: Weather,
    },
    SeasonChanged {
        season: Season,
        year: u32,
    },
    DecisionRaised {
        kind: DecisionKind,
    },
    DecisionResolved {
        kind: DecisionKind,
        accepted: bool,
    },
    PolicyChanged {
        policy: LandPolicy,
        enclosure_rate: f64,
    },
    EnclosureResumed {
        rate: f64,
    },
    GrainSold {
        amount: f64,
        price: f64,
        income: f64,
    },
    Victory {
        year: u32,
        pop: u32,
        total_deaths: u32,
    },
}
