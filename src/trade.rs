use serde::{Deserialize, Serialize};

pub const MIN_PRICE: f64 = 0.3;
pub const MAX_PRICE: f64 = 2.5;
pub const MAX_URBAN_SHARE: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeState {
    pub food_surplus: f64,
    pub market_price: f64,
    pub grain_sold: f64,
    pub trade_income: f64,
}

impl Default for TradeState {
    fn default() -> Self {
        Self {
            food_surplus: 0.0,
            market_price: 1.0,
            grain_sold: 0.0,
            trade_income: 0.0,
        }
    }
}

/// Grain price before clamping, given the urban share, the latest harvest
/// relative to daily need, and a merchant fluctuation factor.
pub fn market_price(urban_share: f64, harvest_quality: f64, fluctuation: f64) -> f64 {
    ((0.5 + urban_share * 10.0 - harvest_quality * 0.3) * fluctuation).clamp(MIN_PRICE, MAX_PRICE)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrbanState {
    pub urban_pop_pct: f64,
    pub urban_demand: f64,
}

impl Default for UrbanState {
    fn default() -> Self {
        Self {
            urban_pop_pct: 0.05,
            urban_demand: 1.0,
        }
    }
}

impl UrbanState {
    pub fn drift(&mut self, surplus_ratio: f64, landless_ratio: f64, traded: bool) {
        let trade_effect = if traded { 0.02 } else { 0.0 };
        let growth = (surplus_ratio * 0.01 + landless_ratio * 0.005 + trade_effect) / 365.0;
        self.urban_pop_pct = (self.urban_pop_pct + growth).min(MAX_URBAN_SHARE);
        self.urban_demand = 1.0 + self.urban_pop_pct * 5.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_clamped() {
        assert_eq!(market_price(0.0, 20.0, 1.0), MIN_PRICE);
        assert_eq!(market_price(0.5, 0.0, 1.1), MAX_PRICE);
        assert!((market_price(0.05, 0.0, 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn urban_share_caps_at_twenty_percent() {
        let mut urban = UrbanState {
            urban_pop_pct: 0.1999,
            urban_demand: 1.0,
        };
        urban.drift(50.0, 0.1, true);
        assert_eq!(urban.urban_pop_pct, MAX_URBAN_SHARE);
        assert!((urban.urban_demand - 2.0).abs() < 1e-12);
    }
}
