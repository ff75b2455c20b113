use anyhow::Result;
use tracing::info;

use crate::{
    engine::{System, SystemContext},
    events::SimEvent,
    resources::{RegrowEntry, REGROW_DELAY_YEARS},
    rng::SystemRng,
    world::WorldState,
};

const WORK_PER_GATHERER: f64 = 0.05;

/// Works the head of the gathering queue. Later jobs wait their turn.
pub struct GatheringSystem;

impl GatheringSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GatheringSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GatheringSystem {
    fn name(&self) -> &str {
        "gathering"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let work = world.pools.gatherers as f64 * WORK_PER_GATHERER * world.labor.work_intensity;
        let Some(job) = world.gather_jobs.front_mut() else {
            return Ok(());
        };
        job.progress += work;
        if !job.is_complete() {
            return Ok(());
        }
        let Some(job) = world.gather_jobs.pop_front() else {
            return Ok(());
        };

        let materials = job.kind.materials_yield();
        world.stock.materials += materials;
        if let Some(index) = world.nodes.iter().position(|node| node.id == job.node_id) {
            let node = world.nodes.remove(index);
            world.regrow_queue.push(RegrowEntry {
                node,
                regen_year: world.clock.year + REGROW_DELAY_YEARS,
            });
        }
        info!(node = %job.node_id, kind = %job.kind, materials, "gathering complete");
        world.emit(SimEvent::GatherCompleted {
            node_id: job.node_id,
            kind: job.kind,
            materials,
        });
        Ok(())
    }
}
