use anyhow::Result;
use tracing::info;

use crate::{
    engine::{System, SystemContext},
    events::SimEvent,
    resources::ResourceNode,
    rng::SystemRng,
    world::WorldState,
};

/// On the first day of each season, respawns cleared nodes whose regrow
/// year has come.
pub struct RegrowthSystem;

impl RegrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RegrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for RegrowthSystem {
    fn name(&self) -> &str {
        "regrowth"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if world.clock.day != 1 {
            return Ok(());
        }
        let year = world.clock.year;
        let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut world.regrow_queue)
            .into_iter()
            .partition(|entry| entry.regen_year <= year);
        world.regrow_queue = waiting;

        for entry in due {
            let old = entry.node;
            let node = ResourceNode::new(
                format!("{}_regen_{}", old.id, year),
                old.kind,
                old.x,
                old.y,
            );
            info!(node = %node.id, kind = %node.kind, "resource regrown");
            world.emit(SimEvent::NodeRegrown {
                node_id: node.id.clone(),
                kind: node.kind,
            });
            world.nodes.push(node);
        }
        Ok(())
    }
}
