use anyhow::Result;

use crate::{
    buildings::{BuildingId, BuildingKind},
    engine::{System, SystemContext},
    events::SimEvent,
    farm::FarmPlot,
    rng::SystemRng,
    world::WorldState,
};

/// Sows the default crop on fallow farms when its season allows, and grows
/// everything already planted.
pub struct CropSystem;

impl CropSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CropSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CropSystem {
    fn name(&self) -> &str {
        "crops"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let farms: Vec<BuildingId> = world
            .completed(BuildingKind::Farm)
            .map(|site| site.id)
            .collect();
        let default_crop = world.default_crop;
        let season = world.clock.season;

        for farm in farms {
            let fallow = world.plots.get(&farm).map_or(true, |plot| plot.harvested);
            if fallow {
                if default_crop.can_plant(season) {
                    let plot = FarmPlot::plant(default_crop, &world.clock);
                    world.plots.insert(farm, plot);
                    world.emit(SimEvent::CropPlanted {
                        farm,
                        crop: default_crop,
                    });
                }
                continue;
            }
            let matured = world
                .plots
                .get_mut(&farm)
                .map(|plot| (plot.grow(), plot.crop));
            if let Some((true, crop)) = matured {
                world.emit(SimEvent::CropMatured { farm, crop });
            }
        }
        Ok(())
    }
}
