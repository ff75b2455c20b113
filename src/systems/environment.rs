use anyhow::Result;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    rng::SystemRng,
    tech::TechKey,
    world::WorldState,
};

const MIN_LAND_QUALITY: f64 = 0.5;
const FALLBACK_DRAIN: f64 = 0.02;

/// Soil exhaustion from planted crops. Three-field rotation stops it.
pub struct EnvironmentSystem;

impl EnvironmentSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvironmentSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EnvironmentSystem {
    fn name(&self) -> &str {
        "environment"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !world.has_completed(BuildingKind::Farm) || world.techs.has(TechKey::ThreeField) {
            return Ok(());
        }
        let drains: Vec<f64> = world
            .plots
            .values()
            .filter(|plot| !plot.harvested)
            .map(|plot| plot.crop.spec().soil_drain)
            .collect();
        let drain = if drains.is_empty() {
            FALLBACK_DRAIN
        } else {
            drains.iter().sum::<f64>() / drains.len() as f64
        };
        let quality = &mut world.indicators.land_quality;
        *quality = (*quality - drain).clamp(MIN_LAND_QUALITY, 1.0);
        Ok(())
    }
}
