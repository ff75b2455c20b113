use anyhow::Result;
use tracing::info;

use crate::{
    buildings::BuildingKind,
    clock::Season,
    engine::{System, SystemContext},
    events::SimEvent,
    milestones::MilestoneKey,
    rng::SystemRng,
    world::WorldState,
};

pub struct MilestoneSystem;

impl MilestoneSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MilestoneSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MilestoneSystem {
    fn name(&self) -> &str {
        "milestones"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for key in MilestoneKey::ALL {
            if world.milestones.is_complete(key) || !reached(world, key) {
                continue;
            }
            world.milestones.complete(key);
            match key {
                MilestoneKey::FirstWinter => world.stock.materials += 15.0,
                MilestoneKey::Population100 => world.indicators.tfp *= 1.1,
                MilestoneKey::FirstMill => {
                    world.indicators.morale = (world.indicators.morale + 0.2).min(1.0);
                }
                MilestoneKey::MarketBuilt | MilestoneKey::SustainedWage => {}
            }
            info!(milestone = %key, reward = key.reward(), "milestone reached");
            world.emit(SimEvent::MilestoneReached { milestone: key });
        }
        Ok(())
    }
}

fn reached(world: &WorldState, key: MilestoneKey) -> bool {
    match key {
        MilestoneKey::FirstWinter => world.clock.season == Season::Spring && world.clock.year > 1,
        MilestoneKey::Population100 => world.population.pop >= 100,
        MilestoneKey::FirstMill => world.has_completed(BuildingKind::Mill),
        MilestoneKey::MarketBuilt => world.has_completed(BuildingKind::Market),
        MilestoneKey::SustainedWage => world.indicators.wage_above_13_years >= 1,
    }
}
