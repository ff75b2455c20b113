use serde::{Deserialize, Serialize};

use crate::{
    clock::{Season, WorldClock},
    crops::CropKind,
};

/// Lifecycle stage of a farm's field. `Empty` means no plot is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    Empty,
    Growing,
    Mature,
    Harvested,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPlot {
    pub crop: CropKind,
    pub planted_day: u32,
    pub planted_season: Season,
    pub planted_year: u32,
    pub days_growing: u32,
    pub mature: bool,
    pub harvested: bool,
}

impl FarmPlot {
    pub fn plant(crop: CropKind, clock: &WorldClock) -> Self {
        Self {
            crop,
            planted_day: clock.day,
            planted_season: clock.season,
            planted_year: clock.year,
            days_growing: 0,
            mature: false,
            harvested: false,
        }
    }

    pub fn stage(&self) -> CropStage {
        if self.harvested {
            CropStage::Harvested
        } else if self.mature {
            CropStage::Mature
        } else {
            CropStage::Growing
        }
    }

    /// One day of growth. Returns `true` on the day the plot matures.
    pub fn grow(&mut self) -> bool {
        if self.mature || self.harvested {
            return false;
        }
        self.days_growing += 1;
        if self.days_growing >= self.crop.spec().growth_days {
            self.mature = true;
            return true;
        }
        false
    }

    pub fn is_harvestable(&self, season: Season) -> bool {
        self.mature && !self.harvested && self.crop.can_harvest(season)
    }

    pub fn growth_fraction(&self) -> f64 {
        let days = self.crop.spec().growth_days.max(1) as f64;
        (self.days_growing as f64 / days).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barley_matures_on_growth_day() {
        let mut plot = FarmPlot::plant(CropKind::Barley, &WorldClock::default());
        assert_eq!(plot.stage(), CropStage::Growing);
        for _ in 0..119 {
            assert!(!plot.grow());
        }
        assert!(plot.grow());
        assert_eq!(plot.stage(), CropStage::Mature);
        assert!(!plot.grow());
        assert_eq!(plot.days_growing, 120);
        assert!(plot.is_harvestable(Season::Summer));
        assert!(!plot.is_harvestable(Season::Autumn));
    }
}
