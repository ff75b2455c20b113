use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::{HistoryEntry, WorldState},
};

const HISTORY_PERIOD_DAYS: u32 = 10;

pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.stock.materials = world.stock.materials.max(0.0);
        if world.clock.day % HISTORY_PERIOD_DAYS == 0 {
            world.history.push(HistoryEntry {
                year: world.clock.year,
                day: world.clock.day,
                pop: world.population.pop,
                real_wage: world.indicators.real_wage,
                food_stock: world.stock.food,
                livestock: world.stock.livestock,
                tfp: world.indicators.tfp,
                soil_quality: world.indicators.land_quality,
            });
        }
        Ok(())
    }
}
