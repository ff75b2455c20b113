use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechKey {
    BasicFarming,
    Livestock,
    ThreeField,
    Well,
    Granary,
    MarketAccess,
    HeavyPlough,
    Manure,
    SeedSelection,
    Irrigation,
    AnimalBreeding,
    Market,
    Woodworking,
    Mill,
    CharteredRights,
    CropRotation,
    Storage,
    GuildSystem,
    Accounting,
    Fertilizer,
}

impl TechKey {
    pub fn slug(self) -> &'static str {
        match self {
            TechKey::BasicFarming => "basic_farming",
            TechKey::Livestock => "livestock",
            TechKey::ThreeField => "three_field",
            TechKey::Well => "well",
            TechKey::Granary => "granary",
            TechKey::MarketAccess => "market_access",
            TechKey::HeavyPlough => "heavy_plough",
            TechKey::Manure => "manure",
            TechKey::SeedSelection => "seed_selection",
            TechKey::Irrigation => "irrigation",
            TechKey::AnimalBreeding => "animal_breeding",
            TechKey::Market => "market",
            TechKey::Woodworking => "woodworking",
            TechKey::Mill => "mill",
            TechKey::CharteredRights => "chartered_rights",
            TechKey::CropRotation => "crop_rotation",
            TechKey::Storage => "storage",
            TechKey::GuildSystem => "guild_system",
            TechKey::Accounting => "accounting",
            TechKey::Fertilizer => "fertilizer",
        }
    }
}

impl FromStr for TechKey {
    type Err = CommandError;

    /// Accepts snake_case or camelCase keys.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        TECH_TREE
            .iter()
            .map(|def| def.key)
            .find(|key| key.slug().replace('_', "") == normalized)
            .ok_or_else(|| CommandError::UnknownTech(raw.to_string()))
    }
}

impl fmt::Display for TechKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(definition(*self).display)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TechCategory {
    Agriculture,
    Infrastructure,
    Economic,
    Social,
}

#[derive(Debug, Clone, Copy)]
pub struct TechDefinition {
    pub key: TechKey,
    pub display: &'static str,
    pub category: TechCategory,
    pub tier: u8,
    pub cost: f64,
    pub prerequisites: &'static [TechKey],
    pub effect: &'static str,
}

const TECH_TREE: &[TechDefinition] = &[
    TechDefinition {
        key: TechKey::BasicFarming,
        display: "Basic Farming",
        category: TechCategory::Agriculture,
        tier: 1,
        cost: 0.0,
        prerequisites: &[],
        effect: "Enables farm construction",
    },
    TechDefinition {
        key: TechKey::Livestock,
        display: "Livestock Domestication",
        category: TechCategory::Agriculture,
        tier: 1,
        cost: 15.0,
        prerequisites: &[TechKey::BasicFarming],
        effect: "Enables livestock pens, +0.5 food/animal",
    },
    TechDefinition {
        key: TechKey::ThreeField,
        display: "Three-Field Rotation",
        category: TechCategory::Agriculture,
        tier: 1,
        cost: 20.0,
        prerequisites: &[TechKey::BasicFarming],
        effect: "+15% TFP, prevents soil degradation",
    },
    TechDefinition {
        key: TechKey::Well,
        display: "Well & Sanitation",
        category: TechCategory::Infrastructure,
        tier: 1,
        cost: 20.0,
        prerequisites: &[],
        effect: "+20% health, -50% disease risk",
    },
    TechDefinition {
        key: TechKey::Granary,
        display: "Granary Storage",
        category: TechCategory::Infrastructure,
        tier: 1,
        cost: 25.0,
        prerequisites: &[TechKey::BasicFarming],
        effect: "Food spoilage 25% -> 10%",
    },
    TechDefinition {
        key: TechKey::MarketAccess,
        display: "Market Road",
        category: TechCategory::Economic,
        tier: 1,
        cost: 20.0,
        prerequisites: &[TechKey::BasicFarming],
        effect: "Enables surplus trade routes",
    },
    TechDefinition {
        key: TechKey::HeavyPlough,
        display: "Heavy Plough",
        category: TechCategory::Agriculture,
        tier: 2,
        cost: 30.0,
        prerequisites: &[TechKey::Livestock, TechKey::ThreeField],
        effect: "+25% farm TFP",
    },
    TechDefinition {
        key: TechKey::Manure,
        display: "Manure Fertilization",
        category: TechCategory::Agriculture,
        tier: 2,
        cost: 18.0,
        prerequisites: &[TechKey::Livestock],
        effect: "+10% yield per livestock unit, up to +50%",
    },
    TechDefinition {
        key: TechKey::SeedSelection,
        display: "Seed Selection",
        category: TechCategory::Agriculture,
        tier: 2,
        cost: 22.0,
        prerequisites: &[TechKey::ThreeField],
        effect: "+10% crop yields",
    },
    TechDefinition {
        key: TechKey::Irrigation,
        display: "Irrigation Canals",
        category: TechCategory::Infrastructure,
        tier: 2,
        cost: 35.0,
        prerequisites: &[TechKey::Well],
        effect: "Drought penalty reduced to -10%",
    },
    TechDefinition {
        key: TechKey::AnimalBreeding,
        display: "Selective Breeding",
        category: TechCategory::Agriculture,
        tier: 2,
        cost: 25.0,
        prerequisites: &[TechKey::Livestock, TechKey::Manure],
        effect: "+50% livestock growth rate",
    },
    TechDefinition {
        key: TechKey::Market,
        display: "Market Charter",
        category: TechCategory::Economic,
        tier: 2,
        cost: 30.0,
        prerequisites: &[TechKey::MarketAccess],
        effect: "Enables Market building",
    },
    TechDefinition {
        key: TechKey::Woodworking,
        display: "Advanced Woodworking",
        category: TechCategory::Infrastructure,
        tier: 2,
        cost: 25.0,
        prerequisites: &[TechKey::Granary],
        effect: "-20% building material costs",
    },
    TechDefinition {
        key: TechKey::Mill,
        display: "Windmill Technology",
        category: TechCategory::Infrastructure,
        tier: 3,
        cost: 40.0,
        prerequisites: &[TechKey::HeavyPlough, TechKey::Woodworking],
        effect: "+15% TFP per mill",
    },
    TechDefinition {
        key: TechKey::CharteredRights,
        display: "Town Charter",
        category: TechCategory::Social,
        tier: 3,
        cost: 50.0,
        prerequisites: &[TechKey::Market],
        effect: "Lord tithe 40% -> 25%",
    },
    TechDefinition {
        key: TechKey::CropRotation,
        display: "Advanced Crop Rotation",
        category: TechCategory::Agriculture,
        tier: 3,
        cost: 35.0,
        prerequisites: &[TechKey::SeedSelection, TechKey::Manure],
        effect: "Soil quality recovers each day",
    },
    TechDefinition {
        key: TechKey::Storage,
        display: "Bulk Storage",
        category: TechCategory::Infrastructure,
        tier: 3,
        cost: 30.0,
        prerequisites: &[TechKey::Granary, TechKey::Market],
        effect: "Spoilage 10% -> 5%",
    },
    TechDefinition {
        key: TechKey::GuildSystem,
        display: "Craft Guilds",
        category: TechCategory::Social,
        tier: 3,
        cost: 40.0,
        prerequisites: &[TechKey::Market, TechKey::Woodworking],
        effect: "+10% TFP, +15% morale",
    },
    TechDefinition {
        key: TechKey::Accounting,
        display: "Double-Entry Bookkeeping",
        category: TechCategory::Economic,
        tier: 3,
        cost: 35.0,
        prerequisites: &[TechKey::Market],
        effect: "+1 material/year per 10 population",
    },
    TechDefinition {
        key: TechKey::Fertilizer,
        display: "Compost Science",
        category: TechCategory::Agriculture,
        tier: 3,
        cost: 30.0,
        prerequisites: &[TechKey::Manure, TechKey::CropRotation],
        effect: "+15% all crop yields",
    },
];

pub fn definition(key: TechKey) -> &'static TechDefinition {
    TECH_TREE
        .iter()
        .find(|def| def.key == key)
        .unwrap_or(&TECH_TREE[0])
}

pub fn all() -> &'static [TechDefinition] {
    TECH_TREE
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechSet(BTreeSet<TechKey>);

impl TechSet {
    pub fn with(keys: impl IntoIterator<Item = TechKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    pub fn has(&self, key: TechKey) -> bool {
        self.0.contains(&key)
    }

    pub(crate) fn insert(&mut self, key: TechKey) -> bool {
        self.0.insert(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TechKey> + '_ {
        self.0.iter().copied()
    }

    pub fn missing_prerequisites(&self, key: TechKey) -> Vec<TechKey> {
        definition(key)
            .prerequisites
            .iter()
            .copied()
            .filter(|dep| !self.has(*dep))
            .collect()
    }

    /// Techs that are not yet unlocked but whose prerequisites all are.
    pub fn available(&self) -> Vec<TechKey> {
        TECH_TREE
            .iter()
            .filter(|def| !self.has(def.key))
            .filter(|def| def.prerequisites.iter().all(|dep| self.has(*dep)))
            .map(|def| def.key)
            .collect()
    }
}
