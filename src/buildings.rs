use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tech::{TechKey, TechSet};

/// Footprint of a placed building in world pixels.
pub const BUILDING_FOOTPRINT: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub u64);

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    Farm,
    House,
    Well,
    Granary,
    LivestockPen,
    Market,
    Mill,
}

#[derive(Debug, Clone, Copy)]
pub struct BuildingSpec {
    pub name: &'static str,
    pub materials: f64,
    pub duration: f64,
    pub requires: Option<TechKey>,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 7] = [
        BuildingKind::Farm,
        BuildingKind::House,
        BuildingKind::Well,
        BuildingKind::Granary,
        BuildingKind::LivestockPen,
        BuildingKind::Market,
        BuildingKind::Mill,
    ];

    pub fn spec(self) -> BuildingSpec {
        match self {
            BuildingKind::Farm => BuildingSpec {
                name: "Farm",
                materials: 8.0,
                duration: 5.0,
                requires: None,
            },
            BuildingKind::House => BuildingSpec {
                name: "House",
                materials: 12.0,
                duration: 4.0,
                requires: None,
            },
            BuildingKind::Well => BuildingSpec {
                name: "Well",
                materials: 15.0,
                duration: 6.0,
                requires: Some(TechKey::Well),
            },
            BuildingKind::Granary => BuildingSpec {
                name: "Granary",
                materials: 20.0,
                duration: 7.0,
                requires: Some(TechKey::Granary),
            },
            BuildingKind::LivestockPen => BuildingSpec {
                name: "Livestock Pen",
                materials: 12.0,
                duration: 5.0,
                requires: Some(TechKey::Livestock),
            },
            BuildingKind::Market => BuildingSpec {
                name: "Market",
                materials: 30.0,
                duration: 6.0,
                requires: Some(TechKey::Market),
            },
            BuildingKind::Mill => BuildingSpec {
                name: "Windmill",
                materials: 40.0,
                duration: 8.0,
                requires: Some(TechKey::Mill),
            },
        }
    }

    /// Material cost after tech discounts.
    pub fn cost(self, techs: &TechSet) -> f64 {
        let base = self.spec().materials;
        if techs.has(TechKey::Woodworking) {
            (base * 0.8).floor()
        } else {
            base
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSite {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub x: f64,
    pub y: f64,
    pub done: bool,
    pub progress: f64,
    pub duration: f64,
}

impl BuildingSite {
    pub fn new(id: BuildingId, kind: BuildingKind, x: f64, y: f64) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            done: false,
            progress: 0.0,
            duration: kind.spec().duration,
        }
    }

    pub fn completed(id: BuildingId, kind: BuildingKind, x: f64, y: f64) -> Self {
        let mut site = Self::new(id, kind, x, y);
        site.progress = site.duration;
        site.done = true;
        site
    }

    /// Adds work to an unfinished site. Returns `true` exactly once, on the
    /// call that finishes construction.
    pub fn advance(&mut self, work: f64) -> bool {
        if self.done {
            return false;
        }
        self.progress += work.max(0.0);
        if self.progress >= self.duration {
            self.done = true;
            return true;
        }
        false
    }

    pub fn fraction_complete(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.progress / self.duration).min(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn woodworking_floors_discounted_cost() {
        let techs = TechSet::with([TechKey::Woodworking]);
        assert_eq!(BuildingKind::House.cost(&techs), 9.0);
        assert_eq!(BuildingKind::Well.cost(&techs), 12.0);
        assert_eq!(BuildingKind::House.cost(&TechSet::default()), 12.0);
    }

    #[test]
    fn site_completes_once() {
        let mut site = BuildingSite::new(BuildingId(1), BuildingKind::House, 0.0, 0.0);
        assert!(!site.advance(2.0));
        assert!(site.advance(2.5));
        assert!(!site.advance(5.0));
        assert!(site.done);
        assert_eq!(site.progress, 4.5);
    }
}
