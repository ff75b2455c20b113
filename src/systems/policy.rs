use anyhow::Result;
use tracing::info;

use crate::{
    buildings::BuildingKind,
    decisions::{DecisionKind, PendingDecision},
    engine::{System, SystemContext},
    events::SimEvent,
    rng::{RngExt, SystemRng},
    world::WorldState,
};

const UNREST_THRESHOLD: f64 = 0.4;
const UNREST_CHANCE: f64 = 0.01;

/// Gradual land enclosure: drift of the enclosed share, displaced laborers,
/// wool, and the unrest it provokes.
pub struct PolicySystem;

impl PolicySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PolicySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PolicySystem {
    fn name(&self) -> &str {
        "policy"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        world.tick_enclosure_pause();
        let farms = world.completed_count(BuildingKind::Farm);
        let pop = world.population.pop;
        let tfp = world.indicators.tfp;
        world.policy.enclosure.advance(pop, farms, tfp);

        if world.policy.enclosure.enclosed_land_pct > UNREST_THRESHOLD
            && world.pending_decision.is_none()
            && rng.chance(UNREST_CHANCE)
        {
            let kind = DecisionKind::EnclosureUnrest;
            info!(
                landless = world.policy.enclosure.landless_laborers,
                "enclosure unrest"
            );
            world.pending_decision = Some(PendingDecision {
                kind,
                raised_tick: ctx.tick,
            });
            world.emit(SimEvent::DecisionRaised { kind });
        }
        Ok(())
    }
}
