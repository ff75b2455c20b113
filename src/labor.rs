use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_INTENSITY: f64 = 0.5;
pub const MAX_INTENSITY: f64 = 1.5;

const SKILL_GROWTH: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Builder,
    Herder,
    Gatherer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Farmer, Role::Builder, Role::Herder, Role::Gatherer];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Farmer => "farmers",
            Role::Builder => "builders",
            Role::Herder => "herders",
            Role::Gatherer => "gatherers",
        };
        f.write_str(label)
    }
}

/// Fractions of the population assigned to each role. The remainder is idle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborAllocation {
    pub farmers: f64,
    pub builders: f64,
    pub herders: f64,
    pub gatherers: f64,
    pub work_intensity: f64,
}

impl Default for LaborAllocation {
    fn default() -> Self {
        Self {
            farmers: 0.5,
            builders: 0.3,
            herders: 0.1,
            gatherers: 0.1,
            work_intensity: 1.0,
        }
    }
}

impl LaborAllocation {
    pub fn share(&self, role: Role) -> f64 {
        match role {
            Role::Farmer => self.farmers,
            Role::Builder => self.builders,
            Role::Herder => self.herders,
            Role::Gatherer => self.gatherers,
        }
    }

    fn share_mut(&mut self, role: Role) -> &mut f64 {
        match role {
            Role::Farmer => &mut self.farmers,
            Role::Builder => &mut self.builders,
            Role::Herder => &mut self.herders,
            Role::Gatherer => &mut self.gatherers,
        }
    }

    pub fn total(&self) -> f64 {
        self.farmers + self.builders + self.herders + self.gatherers
    }

    pub fn idle(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }

    /// Sets one role's share, then rescales every share proportionally if the
    /// assigned total would exceed the whole population.
    pub fn set_share(&mut self, role: Role, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        *self.share_mut(role) = fraction;
        self.normalize();
    }

    pub fn normalize(&mut self) {
        let total = self.total();
        if total > 1.0 {
            let scale = 1.0 / total;
            for role in Role::ALL {
                *self.share_mut(role) *= scale;
            }
        }
    }

    pub fn set_intensity(&mut self, value: f64) {
        self.work_intensity = if value.is_finite() {
            value.clamp(MIN_INTENSITY, MAX_INTENSITY)
        } else {
            1.0
        };
    }
}

/// Whole workers per role, floored from the current population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborPools {
    pub farmers: u32,
    pub builders: u32,
    pub herders: u32,
    pub gatherers: u32,
}

impl LaborPools {
    pub fn from_allocation(pop: u32, labor: &LaborAllocation) -> Self {
        let pool = |share: f64| (pop as f64 * share).floor().max(0.0) as u32;
        Self {
            farmers: pool(labor.farmers),
            builders: pool(labor.builders),
            herders: pool(labor.herders),
            gatherers: pool(labor.gatherers),
        }
    }

    pub fn assigned(&self) -> u32 {
        self.farmers + self.builders + self.herders + self.gatherers
    }
}

/// Experience per role. Trails the allocation: training is slow, decay twice
/// as fast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaborSkills {
    pub skills: LaborAllocation,
    pub reallocation_cost: f64,
    pub efficiency: f64,
}

impl LaborSkills {
    pub fn matching(labor: &LaborAllocation) -> Self {
        Self {
            skills: *labor,
            reallocation_cost: 0.0,
            efficiency: 1.0,
        }
    }

    /// Moves skills one step toward the allocation and returns the resulting
    /// productivity factor, floored at 0.8.
    pub fn drift(&mut self, labor: &LaborAllocation) -> f64 {
        let mut change = 0.0;
        for role in Role::ALL {
            change += (labor.share(role) - self.skills.share(role)).abs();
        }
        self.reallocation_cost = change * 0.5;

        for role in Role::ALL {
            let target = labor.share(role);
            let current = self.skills.share_mut(role);
            if target > *current {
                *current = (*current + SKILL_GROWTH).min(target);
            } else if target < *current {
                *current = (*current - SKILL_GROWTH * 2.0).max(target);
            }
        }

        let mismatch: f64 = Role::ALL
            .iter()
            .map(|role| (labor.share(*role) - self.skills.share(*role)).abs())
            .sum();
        self.efficiency = (1.0 - mismatch * 0.1).max(0.8);
        self.efficiency
    }
}
