use anyhow::Result;
use tracing::debug;

use crate::{
    buildings::BuildingKind,
    engine::{System, SystemContext},
    events::SimEvent,
    rng::{RngExt, SystemRng},
    trade::market_price,
    world::WorldState,
};

const RESERVE_DAYS: f64 = 30.0;
const MAX_SALE_DAYS: f64 = 5.0;

/// Sells grain above a month's reserve through a finished market, then lets
/// the urban share drift.
pub struct TradeSystem;

impl TradeSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TradeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TradeSystem {
    fn name(&self) -> &str {
        "trade"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut WorldState,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let need = world.need_per_day();
        let pop = world.population.pop.max(1) as f64;
        let surplus = (world.stock.food - need * RESERVE_DAYS).max(0.0);
        let quality = if need > 0.0 {
            (world.indicators.last_food_production / need) / 10.0
        } else {
            0.0
        };
        let fluctuation = rng.uniform(0.9, 1.1);
        let price = market_price(world.urban.urban_pop_pct, quality, fluctuation);

        let trade = &mut world.trade;
        trade.food_surplus = surplus;
        trade.market_price = price;

        let has_market = world.has_completed(BuildingKind::Market);
        if has_market && surplus > 0.0 {
            let sold = surplus.min(need * MAX_SALE_DAYS);
            let income = sold * price * 0.1;
            world.trade.grain_sold = sold;
            world.trade.trade_income = income;
            world.stock.materials += income;
            world.stock.food -= sold;
            if sold / (world.indicators.last_food_production + 0.1) > 0.3 {
                world.indicators.tfp *= 1.02;
            }
            debug!(tick = ctx.tick, sold, price, income, "grain sold");
            world.emit(SimEvent::GrainSold {
                amount: sold,
                price,
                income,
            });
        } else {
            world.trade.grain_sold = 0.0;
            world.trade.trade_income = 0.0;
        }

        let reserve = need * RESERVE_DAYS;
        let surplus_ratio = if reserve > 0.0 { surplus / reserve } else { 0.0 };
        let landless_ratio = world.policy.enclosure.landless_laborers as f64 / pop;
        let traded = world.trade.grain_sold > 0.0;
        world.urban.drift(surplus_ratio, landless_ratio, traded);
        Ok(())
    }
}
