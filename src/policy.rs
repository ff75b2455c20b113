use std::fmt;

use serde::{Deserialize, Serialize};

/// Ticks an unrest settlement keeps enclosure halted.
pub const UNREST_PAUSE_TICKS: u32 = 365;
pub const ENCLOSURE_RESUME_RATE: f64 = 0.02;
const DISPLACEMENT_RATE: f64 = 0.15;
const ENCLOSED_RENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandPolicy {
    Commons,
    Enclosed,
}

impl fmt::Display for LandPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandPolicy::Commons => f.write_str("commons"),
            LandPolicy::Enclosed => f.write_str("enclosed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tithes {
    pub lord: f64,
    pub church: f64,
}

impl Default for Tithes {
    fn default() -> Self {
        Self {
            lord: 0.40,
            church: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnclosureState {
    pub enclosed_land_pct: f64,
    /// Share of land enclosed per year.
    pub rate: f64,
    pub landless_laborers: u32,
    pub wool_production: f64,
    pub efficiency: f64,
    /// Remaining ticks of an unrest pause, if one is running.
    pub resume_in: Option<u32>,
}

impl Default for EnclosureState {
    fn default() -> Self {
        Self {
            enclosed_land_pct: 0.0,
            rate: 0.0,
            landless_laborers: 0,
            wool_production: 0.0,
            efficiency: 1.0,
            resume_in: None,
        }
    }
}

impl EnclosureState {
    /// Daily drift of the enclosed share and its knock-on effects.
    pub fn advance(&mut self, pop: u32, completed_farms: usize, tfp: f64) {
        self.enclosed_land_pct = (self.enclosed_land_pct + self.rate / 365.0).clamp(0.0, 1.0);
        self.wool_production = completed_farms as f64 * self.enclosed_land_pct * 0.5 * tfp;
        self.landless_laborers =
            (pop as f64 * self.enclosed_land_pct * DISPLACEMENT_RATE).floor() as u32;
        self.efficiency = 1.0 + self.enclosed_land_pct * 0.25;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyState {
    pub land: LandPolicy,
    pub tithes: Tithes,
    pub enclosure: EnclosureState,
}

impl Default for PolicyState {
    fn default() -> Self {
        Self {
            land: LandPolicy::Commons,
            tithes: Tithes::default(),
            enclosure: EnclosureState::default(),
        }
    }
}

impl PolicyState {
    /// Food left to the village after lord and church (commons) or rent
    /// (enclosed) take their share.
    pub fn after_extraction(&self, net_food: f64) -> f64 {
        match self.land {
            LandPolicy::Commons => {
                let lord = net_food * self.tithes.lord;
                let church = net_food * self.tithes.church;
                net_food - lord - church
            }
            LandPolicy::Enclosed => net_food - net_food * ENCLOSED_RENT,
        }
    }

    pub fn production_bonus(&self) -> f64 {
        match self.land {
            LandPolicy::Commons => 1.0,
            LandPolicy::Enclosed => 1.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commons_pays_both_tithes() {
        let policy = PolicyState::default();
        assert!((policy.after_extraction(10.0) - 5.0).abs() < 1e-12);
        let chartered = PolicyState {
            tithes: Tithes {
                lord: 0.25,
                church: 0.10,
            },
            ..PolicyState::default()
        };
        assert!((chartered.after_extraction(10.0) - 6.5).abs() < 1e-12);
        let enclosed = PolicyState {
            land: LandPolicy::Enclosed,
            ..PolicyState::default()
        };
        assert!((enclosed.after_extraction(10.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn enclosure_displaces_villagers() {
        let mut enclosure = EnclosureState {
            enclosed_land_pct: 0.5,
            ..EnclosureState::default()
        };
        enclosure.advance(100, 4, 1.0);
        assert_eq!(enclosure.landless_laborers, 7);
        assert!((enclosure.wool_production - 1.0).abs() < 1e-12);
        assert!((enclosure.efficiency - 1.125).abs() < 1e-12);
    }
}
