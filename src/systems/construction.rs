use anyhow::Result;
use tracing::info;

use crate::{
    buildings::{BuildingId, BuildingKind},
    engine::{System, SystemContext},
    events::SimEvent,
    rng::SystemRng,
    world::{WorldState, HOUSING_PER_HOUSE},
};

const WORK_PER_BUILDER: f64 = 0.02;

pub struct ConstructionSystem;

impl ConstructionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConstructionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConstructionSystem {
    fn name(&self) -> &str {
        "construction"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let work = world.pools.builders as f64 * WORK_PER_BUILDER * world.labor.work_intensity;
        let finished: Vec<(BuildingId, BuildingKind)> = world
            .buildings
            .iter_mut()
            .filter(|site| !site.done)
            .filter_map(|site| site.advance(work).then_some((site.id, site.kind)))
            .collect();

        for (id, kind) in finished {
            on_completed(world, id, kind);
        }
        Ok(())
    }
}

fn on_completed(world: &mut WorldState, id: BuildingId, kind: BuildingKind) {
    info!(%id, %kind, "construction complete");
    world.emit(SimEvent::BuildingCompleted { id, kind });
    match kind {
        BuildingKind::Farm => world.emit(SimEvent::CropSelectionRequested { farm: id }),
        BuildingKind::House => world.population.cap += HOUSING_PER_HOUSE,
        BuildingKind::Well => {
            world.indicators.health = (world.indicators.health + 0.2).min(1.0);
        }
        BuildingKind::LivestockPen => world.stock.livestock += 2,
        BuildingKind::Mill => world.indicators.tfp *= 1.15,
        BuildingKind::Granary | BuildingKind::Market => {}
    }
}
