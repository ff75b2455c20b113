use anyhow::Result;
use tracing::{info, warn};

use crate::{
    buildings::{BuildingId, BuildingKind},
    clock::Season,
    engine::{System, SystemContext},
    events::SimEvent,
    rng::SystemRng,
    tech::TechKey,
    world::WorldState,
};

const WEATHER_PERIOD_DAYS: u32 = 7;
const PROSPERITY_WAGE: f64 = 1.3;
const MARKET_INCOME: f64 = 2.0;

/// Advances the clock and runs everything keyed to the calendar: winter
/// kill, the prosperity streak, weather and seasonal income.
pub struct CalendarSystem;

impl CalendarSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CalendarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CalendarSystem {
    fn name(&self) -> &str {
        "calendar"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if world.clock.advance_day() {
            on_new_season(world);
        }

        if world.clock.day % WEATHER_PERIOD_DAYS == 0 {
            let season = world.clock.season;
            world.weather.roll(season, rng);
            let weather = world.weather;
            world.emit(SimEvent::WeatherChanged {
                now: weather.now,
                next: weather.next,
            });
        }

        if world.clock.day == 1 {
            if world.techs.has(TechKey::Accounting) {
                world.stock.materials += (world.population.pop / 10) as f64;
            }
            if world.has_completed(BuildingKind::Market) {
                world.stock.materials += MARKET_INCOME;
            }
        }
        Ok(())
    }
}

fn on_new_season(world: &mut WorldState) {
    let season = world.clock.season;
    let year = world.clock.year;
    info!(%season, year, "season changed");
    world.emit(SimEvent::SeasonChanged { season, year });

    if season == Season::Winter {
        let killed: Vec<BuildingId> = world
            .plots
            .iter()
            .filter(|(_, plot)| !plot.crop.spec().winter_hardy)
            .map(|(farm, _)| *farm)
            .collect();
        if !killed.is_empty() {
            for farm in &killed {
                world.plots.remove(farm);
            }
            warn!(farms = killed.len(), "winter killed non-hardy crops");
            world.emit(SimEvent::CropsWinterKilled { farms: killed });
        }
    }

    if world.indicators.real_wage > PROSPERITY_WAGE {
        world.indicators.wage_above_13_years += 1;
    } else {
        world.indicators.wage_above_13_years = 0;
    }
}
