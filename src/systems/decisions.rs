use anyhow::Result;
use rand::Rng;
use tracing::info;

use crate::{
    decisions::{candidates, PendingDecision},
    engine::{System, SystemContext},
    events::SimEvent,
    rng::{RngExt, SystemRng},
    world::WorldState,
};

const DECISION_PERIOD_DAYS: u32 = 15;

/// Every fifteen days, may present one contextual decision the village
/// qualifies for.
pub struct DecisionSystem;

impl DecisionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DecisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DecisionSystem {
    fn name(&self) -> &str {
        "decisions"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if world.clock.day % DECISION_PERIOD_DAYS != 0
            || world.pending_decision.is_some()
            || !rng.chance(0.2)
        {
            return Ok(());
        }
        let options = candidates(world);
        if options.is_empty() || !rng.chance(0.4) {
            return Ok(());
        }
        let kind = options[rng.gen_range(0..options.len())];
        info!(?kind, "decision raised");
        world.pending_decision = Some(PendingDecision {
            kind,
            raised_tick: ctx.tick,
        });
        world.emit(SimEvent::DecisionRaised { kind });
        Ok(())
    }
}
