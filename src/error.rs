use thiserror::Error;

use crate::{
    buildings::{BuildingId, BuildingKind},
    clock::Season,
    crops::CropKind,
    decisions::DecisionKind,
    policy::LandPolicy,
    tech::TechKey,
};

/// Reasons a command is refused. The world is left untouched whenever one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown technology '{0}'")]
    UnknownTech(String),
    #[error("{0} is already unlocked")]
    AlreadyUnlocked(TechKey),
    #[error("{tech} requires {missing:?}")]
    MissingPrerequisites { tech: TechKey, missing: Vec<TechKey> },
    #[error("not enough materials: need {needed}, have {available:.1}")]
    InsufficientMaterials { needed: f64, available: f64 },
    #[error("{kind} requires the {tech} technology")]
    TechRequired { kind: BuildingKind, tech: TechKey },
    #[error("need at least 5% gatherers to harvest")]
    NotEnoughGatherers,
    #[error("no resource node '{0}'")]
    UnknownNode(String),
    #[error("already gathering '{0}'")]
    NodeBusy(String),
    #[error("no building {0}")]
    UnknownBuilding(BuildingId),
    #[error("building {0} is not a farm")]
    NotAFarm(BuildingId),
    #[error("farm {0} is still under construction")]
    UnderConstruction(BuildingId),
    #[error("farm {0} already holds a mature crop")]
    PlotMature(BuildingId),
    #[error("{crop} cannot be planted in {season}")]
    OutOfSeason { crop: CropKind, season: Season },
    #[error("farm {0} has nothing to harvest this season")]
    NotHarvestable(BuildingId),
    #[error("land policy is already {0}")]
    PolicyUnchanged(LandPolicy),
    #[error("land is not enclosed")]
    NotEnclosed,
    #[error("no decision is pending")]
    NoPendingDecision,
    #[error("cannot afford to accept {0:?}")]
    DecisionUnaffordable(DecisionKind),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save schema {found} is not supported (expected {expected})")]
    SchemaMismatch { found: u32, expected: u32 },
}
