use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    clock::Season,
    error::CommandError,
    events::DeathCause,
    policy::{LandPolicy, UNREST_PAUSE_TICKS},
    rng::RngExt,
    world::WorldState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    MerchantTools,
    HarshWinter,
    NeighborAid,
    Festival,
    EnclosureUnrest,
}

impl DecisionKind {
    pub fn title(self) -> &'static str {
        match self {
            DecisionKind::MerchantTools => "Traveling Merchant",
            DecisionKind::HarshWinter => "Harsh Winter Forecast",
            DecisionKind::NeighborAid => "Neighboring Village Requests Aid",
            DecisionKind::Festival => "Harvest Festival",
            DecisionKind::EnclosureUnrest => "Peasant Unrest",
        }
    }

    pub fn terms(self) -> &'static str {
        match self {
            DecisionKind::MerchantTools => "Cost: 20 materials | Gain: +15% farm TFP",
            DecisionKind::HarshWinter => "Accept: +15 food, -3 livestock | Decline: keep the herd",
            DecisionKind::NeighborAid => "Accept: -15 food, +20% morale | Decline: keep food",
            DecisionKind::Festival => "Cost: 10 food | Gain: +25% morale",
            DecisionKind::EnclosureUnrest => {
                "Accept: pause enclosure | Decline: -30% morale, risk of violence"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub kind: DecisionKind,
    pub raised_tick: u64,
}

/// Contextual decisions the village currently qualifies for.
pub fn candidates(world: &WorldState) -> Vec<DecisionKind> {
    let pop = world.population.pop as f64;
    let food = world.stock.food;
    let wage = world.indicators.real_wage;
    let mut found = Vec::new();
    if wage < 0.9 && food < pop * 2.0 {
        found.push(DecisionKind::NeighborAid);
    }
    if world.stock.materials >= 20.0 && wage > 1.2 {
        found.push(DecisionKind::MerchantTools);
    }
    if world.indicators.morale < 0.4 && food > pop * 10.0 {
        found.push(DecisionKind::Festival);
    }
    if world.clock.season == Season::Autumn && world.stock.livestock >= 3 {
        found.push(DecisionKind::HarshWinter);
    }
    found
}

/// Applies the accepted outcome. Nothing changes when the village cannot pay.
pub fn accept(
    kind: DecisionKind,
    world: &mut WorldState,
    _rng: &mut dyn RngCore,
) -> Result<(), CommandError> {
    match kind {
        DecisionKind::MerchantTools => {
            if world.stock.materials < 20.0 {
                return Err(CommandError::DecisionUnaffordable(kind));
            }
            world.stock.materials -= 20.0;
            world.indicators.tfp *= 1.15;
        }
        DecisionKind::HarshWinter => {
            if world.stock.livestock < 3 {
                return Err(CommandError::DecisionUnaffordable(kind));
            }
            world.stock.livestock -= 3;
            world.stock.food += 15.0;
        }
        DecisionKind::NeighborAid => {
            if world.stock.food < 15.0 {
                return Err(CommandError::DecisionUnaffordable(kind));
            }
            world.stock.food -= 15.0;
            world.indicators.morale = (world.indicators.morale + 0.2).min(1.0);
        }
        DecisionKind::Festival => {
            if world.stock.food < 10.0 {
                return Err(CommandError::DecisionUnaffordable(kind));
            }
            world.stock.food -= 10.0;
            world.indicators.morale = (world.indicators.morale + 0.25).min(1.0);
        }
        DecisionKind::EnclosureUnrest => {
            let enclosure = &mut world.policy.enclosure;
            enclosure.rate = 0.0;
            enclosure.resume_in = if world.policy.land == LandPolicy::Enclosed {
                Some(UNREST_PAUSE_TICKS)
            } else {
                None
            };
            info!("enclosure paused to calm unrest");
        }
    }
    Ok(())
}

pub fn decline(kind: DecisionKind, world: &mut WorldState, rng: &mut dyn RngCore) {
    if kind != DecisionKind::EnclosureUnrest {
        return;
    }
    world.indicators.morale = (world.indicators.morale - 0.3).max(0.1);
    if rng.chance(0.3) {
        let deaths = (world.population.pop as f64 * 0.05).floor() as u32;
        let died = world.kill(deaths, DeathCause::Riot);
        info!(died, "unrest suppressed by force");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn unaffordable_accept_changes_nothing() {
        let mut world = WorldState::new();
        world.stock.food = 5.0;
        let before = world.indicators.morale;
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            accept(DecisionKind::Festival, &mut world, &mut rng),
            Err(CommandError::DecisionUnaffordable(DecisionKind::Festival))
        );
        assert_eq!(world.stock.food, 5.0);
        assert_eq!(world.indicators.morale, before);
    }

    #[test]
    fn neighbor_aid_requires_poverty() {
        let mut world = WorldState::new();
        world.indicators.real_wage = 0.5;
        world.stock.food = 10.0;
        assert!(candidates(&world).contains(&DecisionKind::NeighborAid));
        world.indicators.real_wage = 1.0;
        assert!(!candidates(&world).contains(&DecisionKind::NeighborAid));
    }
}
