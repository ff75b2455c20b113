use anyhow::Result;
use tracing::{info, warn};

use crate::{
    engine::{System, SystemContext},
    events::{DeathCause, SimEvent},
    rng::{RngExt, SystemRng},
    tech::TechKey,
    world::WorldState,
};

/// Mortality (winter disease, disease, famine), births and livestock
/// breeding.
pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        mortality(world, rng);
        growth(world, rng);
        breeding(world, rng);
        Ok(())
    }
}

/// Death tolls are sized from the population at the start of the phase.
fn mortality(world: &mut WorldState, rng: &mut SystemRng<'_>) {
    let pop = world.population.pop as f64;
    let need = world.need_per_day();
    let disease = world.weather_effect().disease;

    if world.clock.is_winter() && world.stock.food < 0.0 && rng.chance(disease * 2.0) {
        let deaths = ((pop * 0.04).floor() as u32).max(2);
        let died = world.kill(deaths, DeathCause::WinterDisease);
        warn!(died, "winter disease");
    }

    if world.stock.food < 0.0 && rng.chance(disease) {
        let deaths = ((pop * 0.02).floor() as u32).max(1);
        let died = world.kill(deaths, DeathCause::Disease);
        warn!(died, "disease outbreak");
    }

    if world.clock.year >= 3 && world.stock.food < -need * 3.0 && rng.chance(0.1) {
        let deaths = (pop * 0.15).floor() as u32;
        let died = world.kill(deaths, DeathCause::Famine);
        world.stock.food = need * 5.0;
        warn!(died, "famine");
    }
}

fn fertility(year: u32, real_wage: f64) -> f64 {
    let (high, mid, low) = if year < 3 {
        (0.08, 0.05, 0.02)
    } else {
        (0.15, 0.10, 0.05)
    };
    if real_wage > 1.2 {
        high
    } else if real_wage > 0.9 {
        mid
    } else {
        low
    }
}

fn growth(world: &mut WorldState, rng: &mut SystemRng<'_>) {
    world.population.cap = world.housing_cap();
    let need = world.need_per_day();
    let rate = fertility(world.clock.year, world.indicators.real_wage);
    if world.stock.food > need * 10.0
        && world.population.pop < world.population.cap
        && rng.chance(rate)
    {
        world.population.pop += 1;
        let pop = world.population.pop;
        info!(pop, "birth");
        world.emit(SimEvent::PopulationBorn { pop });
    }
}

fn breeding(world: &mut WorldState, rng: &mut SystemRng<'_>) {
    let herders = world.pools.herders;
    let rate = if world.techs.has(TechKey::AnimalBreeding) {
        0.075
    } else {
        0.05
    };
    if herders > 0 && world.stock.livestock < herders * 3 && rng.chance(rate) {
        world.stock.livestock += 1;
        let livestock = world.stock.livestock;
        world.emit(SimEvent::LivestockBorn { livestock });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fertility_tiers_by_era_and_wage() {
        assert_eq!(fertility(1, 1.5), 0.08);
        assert_eq!(fertility(2, 1.0), 0.05);
        assert_eq!(fertility(3, 0.5), 0.05);
        assert_eq!(fertility(7, 1.21), 0.15);
        assert_eq!(fertility(7, 1.0), 0.10);
    }
}
