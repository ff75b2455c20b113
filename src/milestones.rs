use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKey {
    FirstWinter,
    Population100,
    FirstMill,
    MarketBuilt,
    SustainedWage,
}

impl MilestoneKey {
    pub const ALL: [MilestoneKey; 5] = [
        MilestoneKey::FirstWinter,
        MilestoneKey::Population100,
        MilestoneKey::FirstMill,
        MilestoneKey::MarketBuilt,
        MilestoneKey::SustainedWage,
    ];

    pub fn reward(self) -> &'static str {
        match self {
            MilestoneKey::FirstWinter => "+15 materials",
            MilestoneKey::Population100 => "+10% TFP",
            MilestoneKey::FirstMill => "+20% morale",
            MilestoneKey::MarketBuilt => "+2 materials each season",
            MilestoneKey::SustainedWage => "prosperity recorded",
        }
    }
}

impl fmt::Display for MilestoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MilestoneKey::FirstWinter => "Survived First Winter",
            MilestoneKey::Population100 => "Population 100",
            MilestoneKey::FirstMill => "First Windmill",
            MilestoneKey::MarketBuilt => "Market Economy",
            MilestoneKey::SustainedWage => "Prosperity Sustained",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milestones(BTreeSet<MilestoneKey>);

impl Milestones {
    pub fn is_complete(&self, key: MilestoneKey) -> bool {
        self.0.contains(&key)
    }

    /// Marks a milestone. Returns `false` if it was already reached.
    pub fn complete(&mut self, key: MilestoneKey) -> bool {
        self.0.insert(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = MilestoneKey> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryChecklist {
    pub population_150: bool,
    pub sustained_wage: bool,
    pub market: bool,
    pub capital_goods: bool,
}

impl VictoryChecklist {
    pub fn progress(&self) -> u32 {
        [
            self.population_150,
            self.sustained_wage,
            self.market,
            self.capital_goods,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u32
            * 25
    }

    pub fn is_won(&self) -> bool {
        self.progress() >= 100
    }
}
