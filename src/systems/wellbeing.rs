use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    tech::TechKey,
    world::WorldState,
};

/// Winter wear on health and morale, then the daily morale drift driven by
/// food reserves and work intensity.
pub struct WellbeingSystem;

impl WellbeingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WellbeingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for WellbeingSystem {
    fn name(&self) -> &str {
        "wellbeing"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let need = world.need_per_day();
        let food = world.stock.food;
        let well = world.techs.has(TechKey::Well);
        let winter = world.clock.is_winter();
        let intensity = world.labor.work_intensity;
        let indicators = &mut world.indicators;

        if winter {
            if !well {
                indicators.health = (indicators.health - 0.005).max(0.2);
            }
            if food < need * 30.0 {
                indicators.morale = (indicators.morale - 0.015).max(0.1);
            }
        }

        let penalty = (intensity - 1.0) * 0.3;
        let morale = if food > need * 7.0 {
            indicators.morale + 0.01 - penalty
        } else if food < need * 3.0 {
            indicators.morale - 0.02 - penalty
        } else {
            indicators.morale - penalty * 0.5
        };
        indicators.morale = morale.clamp(0.0, 1.0);
        Ok(())
    }
}
