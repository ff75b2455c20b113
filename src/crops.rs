use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Season;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropKind {
    Wheat,
    Rye,
    Legumes,
    Barley,
}

#[derive(Debug, Clone, Copy)]
pub struct CropSpec {
    pub name: &'static str,
    pub yield_factor: f64,
    pub drought_multiplier: f64,
    /// Daily land-quality drain while planted. Negative values restore soil.
    pub soil_drain: f64,
    pub plant_seasons: &'static [Season],
    pub harvest_seasons: &'static [Season],
    pub growth_days: u32,
    pub winter_hardy: bool,
}

const WHEAT: CropSpec = CropSpec {
    name: "Winter Wheat",
    yield_factor: 1.0,
    drought_multiplier: 0.6,
    soil_drain: 0.02,
    plant_seasons: &[Season::Autumn],
    harvest_seasons: &[Season::Summer, Season::Autumn],
    growth_days: 270,
    winter_hardy: true,
};

const RYE: CropSpec = CropSpec {
    name: "Rye",
    yield_factor: 0.85,
    drought_multiplier: 0.95,
    soil_drain: 0.015,
    plant_seasons: &[Season::Autumn, Season::Winter],
    harvest_seasons: &[Season::Summer],
    growth_days: 240,
    winter_hardy: true,
};

const LEGUMES: CropSpec = CropSpec {
    name: "Peas & Beans",
    yield_factor: 0.75,
    drought_multiplier: 0.85,
    soil_drain: -0.015,
    plant_seasons: &[Season::Spring],
    harvest_seasons: &[Season::Autumn],
    growth_days: 180,
    winter_hardy: false,
};

const BARLEY: CropSpec = CropSpec {
    name: "Spring Barley",
    yield_factor: 0.9,
    drought_multiplier: 0.8,
    soil_drain: 0.018,
    plant_seasons: &[Season::Spring],
    harvest_seasons: &[Season::Summer],
    growth_days: 120,
    winter_hardy: false,
};

impl CropKind {
    pub const ALL: [CropKind; 4] = [
        CropKind::Wheat,
        CropKind::Rye,
        CropKind::Legumes,
        CropKind::Barley,
    ];

    pub fn spec(self) -> &'static CropSpec {
        match self {
            CropKind::Wheat => &WHEAT,
            CropKind::Rye => &RYE,
            CropKind::Legumes => &LEGUMES,
            CropKind::Barley => &BARLEY,
        }
    }

    pub fn can_plant(self, season: Season) -> bool {
        self.spec().plant_seasons.contains(&season)
    }

    pub fn can_harvest(self, season: Season) -> bool {
        self.spec().harvest_seasons.contains(&season)
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}
