use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    labor::LaborPools,
    rng::SystemRng,
    world::WorldState,
};

/// Floors the role shares into whole workers and lets skills drift toward
/// the current allocation.
pub struct LaborSystem;

impl LaborSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LaborSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for LaborSystem {
    fn name(&self) -> &str {
        "labor"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.labor.normalize();
        let labor = world.labor;
        world.pools = LaborPools::from_allocation(world.population.pop, &labor);
        world.skills.drift(&labor);
        Ok(())
    }
}
