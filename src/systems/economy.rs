use anyhow::Result;
use tracing::debug;

use crate::{
    buildings::BuildingKind,
    crops::CropKind,
    engine::{System, SystemContext},
    rng::SystemRng,
    tech::TechKey,
    world::WorldState,
};

const BASE_FARM_YIELD: f64 = 2.0;
const LAND_EXPONENT: f64 = 0.6;
const FORAGE_PER_GATHERER: f64 = 0.3;
const FOOD_PER_ANIMAL: f64 = 0.5;

/// Sum of `2 × crop yield` over finished farms whose mature plot can be
/// harvested this season.
pub fn harvestable_base(world: &WorldState) -> f64 {
    let season = world.clock.season;
    world
        .completed(BuildingKind::Farm)
        .filter_map(|farm| world.plots.get(&farm.id))
        .filter(|plot| plot.is_harvestable(season))
        .map(|plot| BASE_FARM_YIELD * plot.crop.spec().yield_factor)
        .sum()
}

/// Scales a raw farm base by every productivity factor in play: TFP, soil,
/// diminishing returns to land, labor, season, weather, morale, policy, tech,
/// mills, enclosure and skill friction.
pub fn farm_output(world: &WorldState, base: f64) -> f64 {
    if base <= 0.0 {
        return 0.0;
    }
    let pop = world.population.pop.max(1) as f64;
    let indicators = &world.indicators;
    let farms = world.completed_count(BuildingKind::Farm).max(1) as f64;
    let land_per_farm = indicators.total_land / farms;
    let diminishing = (land_per_farm / 10.0).powf(LAND_EXPONENT);
    let farmer_share = world.pools.farmers as f64 / pop;
    let intensity = world.labor.work_intensity;
    let weather = world.weather_effect();

    let mut food = base
        * indicators.tfp
        * indicators.land_quality
        * diminishing
        * farmer_share
        * intensity
        * world.clock.season.harvest_multiplier()
        * weather.yield_multiplier;
    food *= 1.0 + (indicators.morale - 0.5) * 0.2;
    food *= world.policy.production_bonus();

    let techs = &world.techs;
    if techs.has(TechKey::Manure) {
        food *= 1.0 + (world.stock.livestock as f64 * 0.1).min(0.5);
    }
    if techs.has(TechKey::SeedSelection) {
        food *= 1.10;
    }
    if techs.has(TechKey::Fertilizer) {
        food *= 1.15;
    }
    let mills = world.completed_count(BuildingKind::Mill);
    if mills > 0 {
        food *= 1.0 + mills as f64 * 0.15;
    }
    food * world.policy.enclosure.efficiency * world.skills.efficiency
}

/// One day's gross output of a single farm growing `crop`.
pub fn single_farm_yield(world: &WorldState, crop: CropKind) -> f64 {
    farm_output(world, BASE_FARM_YIELD * crop.spec().yield_factor)
}

/// What reaches the food store from `gross` production once the weather's
/// spoilage and feudal extraction are taken.
pub fn net_yield(world: &WorldState, gross: f64) -> f64 {
    let spoiled = gross * world.weather_effect().spoilage;
    world.policy.after_extraction(gross - spoiled)
}

/// Food production, spoilage, feudal extraction, consumption and the real
/// wage.
pub struct EconomySystem;

impl EconomySystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EconomySystem {
    fn name(&self) -> &str {
        "economy"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut WorldState,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let pop = world.population.pop.max(1) as f64;
        let intensity = world.labor.work_intensity;
        let farm_food = farm_output(world, harvestable_base(world));
        let livestock_food =
            world.stock.livestock as f64 * FOOD_PER_ANIMAL * (world.pools.herders as f64 / pop);
        let foraged_food = if world.clock.is_winter() {
            0.0
        } else {
            world.pools.gatherers as f64 * FORAGE_PER_GATHERER * intensity
        };

        if world.techs.has(TechKey::CropRotation) {
            world.indicators.land_quality = (world.indicators.land_quality + 0.008).min(1.0);
        }

        let total = farm_food + livestock_food + foraged_food;
        let after_extraction = net_yield(world, total);

        world.indicators.last_food_production = after_extraction;
        world.stock.food += after_extraction;
        world.stock.food -= world.need_per_day();
        world.indicators.real_wage = (world.stock.food / pop) / 0.2;

        debug!(
            tick = ctx.tick,
            farm_food,
            livestock_food,
            foraged_food,
            kept = after_extraction,
            food = world.stock.food,
            "economy"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::Season, farm::FarmPlot, labor::LaborPools};

    #[test]
    fn nothing_grows_without_harvestable_plots() {
        let mut world = WorldState::new();
        let farm = world.add_completed_building(BuildingKind::Farm, 0.0, 0.0);
        world
            .plots
            .insert(farm, FarmPlot::plant(CropKind::Barley, &world.clock));
        assert_eq!(harvestable_base(&world), 0.0);
    }

    #[test]
    fn one_summer_barley_farm() {
        let mut world = WorldState::new();
        world.clock.season = Season::Summer;
        let farm = world.add_completed_building(BuildingKind::Farm, 0.0, 0.0);
        let mut plot = FarmPlot::plant(CropKind::Barley, &world.clock);
        plot.mature = true;
        world.plots.insert(farm, plot);
        world.pools = LaborPools::from_allocation(world.population.pop, &world.labor);

        let base = harvestable_base(&world);
        assert!((base - 1.8).abs() < 1e-12);
        // 1.8 × 10^0.6 × 0.5 farmer share × 0.6 summer × 1.02 morale
        let expected = 1.8 * 10f64.powf(0.6) * 0.5 * 0.6 * 1.02;
        assert!((farm_output(&world, base) - expected).abs() < 1e-9);
    }

    #[test]
    fn net_yield_takes_spoilage_then_tithes() {
        let mut world = WorldState::new();
        // Sunny: a quarter spoils, lord and church take half the rest.
        assert!((net_yield(&world, 4.0) - 1.5).abs() < 1e-12);
        world.techs.insert(TechKey::Granary);
        assert!((net_yield(&world, 4.0) - 1.8).abs() < 1e-12);
    }
}
