use anyhow::Result;
use tracing::info;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    events::SimEvent,
    milestones::VictoryChecklist,
    rng::SystemRng,
    world::WorldState,
};

pub struct VictorySystem;

impl VictorySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VictorySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for VictorySystem {
    fn name(&self) -> &str {
        "victory"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.victory = VictoryChecklist {
            population_150: world.population.pop >= 150,
            sustained_wage: world.indicators.wage_above_13_years >= 1,
            market: world.has_completed(BuildingKind::Market),
            capital_goods: world.completed_count(BuildingKind::Mill) >= 3,
        };
        if world.victory.is_won() && !world.victory_reached {
            world.victory_reached = true;
            let (year, pop, total_deaths) = (
                world.clock.year,
                world.population.pop,
                world.population.total_deaths,
            );
            info!(year, pop, total_deaths, "agrarian victory");
            world.emit(SimEvent::Victory {
                year,
                pop,
                total_deaths,
            });
        }
        Ok(())
    }
}
