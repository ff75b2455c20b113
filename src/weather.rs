use std::fmt;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::{
    clock::Season,
    crops::CropKind,
    tech::{TechKey, TechSet},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Rain,
    Storm,
    Drought,
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Weather::Sunny => "sunny",
            Weather::Rain => "rain",
            Weather::Storm => "storm",
            Weather::Drought => "drought",
        };
        f.write_str(label)
    }
}

/// Cumulative thresholds per season: (rain, sunny), remainder goes to the
/// season's extreme.
fn thresholds(season: Season) -> (f64, f64, Weather) {
    match season {
        Season::Spring => (0.5, 0.85, Weather::Storm),
        Season::Summer => (0.15, 0.7, Weather::Drought),
        Season::Autumn => (0.35, 0.85, Weather::Storm),
        Season::Winter => (0.2, 0.65, Weather::Drought),
    }
}

pub fn season_weighted(season: Season, rng: &mut dyn RngCore) -> Weather {
    let roll: f64 = rng.gen();
    let (rain, sunny, extreme) = thresholds(season);
    if roll < rain {
        Weather::Rain
    } else if roll < sunny {
        Weather::Sunny
    } else {
        extreme
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffect {
    pub yield_multiplier: f64,
    pub spoilage: f64,
    pub disease: f64,
}

pub fn weather_effect(weather: Weather, techs: &TechSet, default_crop: CropKind) -> WeatherEffect {
    let mut yield_multiplier = 1.0;
    let mut spoilage = 0.25;
    let mut disease = 0.01;

    match weather {
        Weather::Sunny => {}
        Weather::Rain => yield_multiplier = 1.2,
        Weather::Storm => {
            yield_multiplier = 1.3;
            spoilage += 0.05;
        }
        Weather::Drought => {
            yield_multiplier = if techs.has(TechKey::Irrigation) {
                0.9
            } else {
                default_crop.spec().drought_multiplier
            };
        }
    }

    if techs.has(TechKey::Well) {
        disease = 0.005;
    }
    if techs.has(TechKey::Granary) {
        spoilage = 0.1;
    }
    if techs.has(TechKey::Storage) {
        spoilage = 0.05;
    }

    WeatherEffect {
        yield_multiplier,
        spoilage,
        disease,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherState {
    pub now: Weather,
    pub next: Weather,
}

impl WeatherState {
    pub fn roll_initial(season: Season, rng: &mut dyn RngCore) -> Self {
        let now = season_weighted(season, rng);
        let next = season_weighted(season, rng);
        Self { now, next }
    }

    /// Shifts the forecast into the current slot and rolls a new forecast.
    pub fn roll(&mut self, season: Season, rng: &mut dyn RngCore) {
        self.now = self.next;
        self.next = season_weighted(season, rng);
    }
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            now: Weather::Sunny,
            next: Weather::Sunny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn storage_tiers_override_storm_spoilage() {
        let plain = weather_effect(Weather::Storm, &TechSet::default(), CropKind::Wheat);
        assert!((plain.spoilage - 0.30).abs() < 1e-12);
        assert!((plain.yield_multiplier - 1.3).abs() < 1e-12);

        let stored = weather_effect(
            Weather::Storm,
            &TechSet::with([TechKey::Granary, TechKey::Storage]),
            CropKind::Wheat,
        );
        assert!((stored.spoilage - 0.05).abs() < 1e-12);
    }

    #[test]
    fn drought_uses_crop_tolerance_until_irrigated() {
        let dry = weather_effect(Weather::Drought, &TechSet::default(), CropKind::Rye);
        assert!((dry.yield_multiplier - 0.95).abs() < 1e-12);
        let wet = weather_effect(
            Weather::Drought,
            &TechSet::with([TechKey::Irrigation]),
            CropKind::Wheat,
        );
        assert!((wet.yield_multiplier - 0.9).abs() < 1e-12);
    }

    #[test]
    fn winter_never_rolls_storm() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert_ne!(season_weighted(Season::Winter, &mut rng), Weather::Storm);
            assert_ne!(season_weighted(Season::Spring, &mut rng), Weather::Drought);
        }
    }
}
