use std::fmt;

use serde::{Deserialize, Serialize};

pub const DAYS_PER_SEASON: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn index(self) -> u8 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Aggregate harvest multiplier applied to farm output.
    pub fn harvest_multiplier(self) -> f64 {
        match self {
            Season::Spring => 0.2,
            Season::Summer => 0.6,
            Season::Autumn => 0.8,
            Season::Winter => 0.05,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    pub day: u32,
    pub season: Season,
    pub year: u32,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            day: 1,
            season: Season::Spring,
            year: 1,
        }
    }
}

impl WorldClock {
    /// Advances one day. Returns `true` when a season boundary was crossed.
    ///
    /// The year counter moves with every season rollover.
    pub fn advance_day(&mut self) -> bool {
        self.day += 1;
        if self.day > DAYS_PER_SEASON {
            self.day = 1;
            self.season = self.season.next();
            self.year += 1;
            true
        } else {
            false
        }
    }

    pub fn is_winter(&self) -> bool {
        self.season == Season::Winter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_rolls_into_next_season() {
        let mut clock = WorldClock {
            day: 89,
            season: Season::Autumn,
            year: 3,
        };
        assert!(!clock.advance_day());
        assert_eq!(clock.day, 90);
        assert!(clock.advance_day());
        assert_eq!(clock.day, 1);
        assert_eq!(clock.season, Season::Winter);
        assert_eq!(clock.year, 4);
    }

    #[test]
    fn winter_wraps_to_spring() {
        let mut clock = WorldClock {
            day: 90,
            season: Season::Winter,
            year: 4,
        };
        assert!(clock.advance_day());
        assert_eq!(clock.season, Season::Spring);
    }
}
