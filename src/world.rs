use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    buildings::{BuildingId, BuildingKind, BuildingSite},
    clock::WorldClock,
    crops::CropKind,
    decisions::{DecisionKind, PendingDecision},
    events::{DeathCause, SimEvent},
    farm::{CropStage, FarmPlot},
    labor::{LaborAllocation, LaborPools, LaborSkills},
    milestones::{Milestones, VictoryChecklist},
    policy::PolicyState,
    resources::{GatherJob, GroundBounds, RegrowEntry, ResourceNode},
    tech::{TechKey, TechSet},
    trade::{TradeState, UrbanState},
    weather::{weather_effect, WeatherEffect, WeatherState},
};

pub const POPULATION_FLOOR: u32 = 10;
pub const BASE_HOUSING: u32 = 100;
pub const HOUSING_PER_HOUSE: u32 = 5;
/// Daily food eaten per villager.
pub const FOOD_PER_HEAD: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub pop: u32,
    pub cap: u32,
    pub total_deaths: u32,
}

impl Default for Population {
    fn default() -> Self {
        Self {
            pop: 80,
            cap: BASE_HOUSING,
            total_deaths: 0,
        }
    }
}

impl Population {
    /// Removes up to `deaths` villagers without dropping below the floor.
    /// Returns how many actually died.
    pub fn apply_deaths(&mut self, deaths: u32) -> u32 {
        if self.pop <= POPULATION_FLOOR {
            return 0;
        }
        let next = self.pop.saturating_sub(deaths).max(POPULATION_FLOOR);
        let died = self.pop.saturating_sub(next);
        self.pop = next;
        self.total_deaths += died;
        died
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceStock {
    pub materials: f64,
    /// Can go negative during a deficit.
    pub food: f64,
    pub livestock: u32,
}

impl Default for ResourceStock {
    fn default() -> Self {
        Self {
            materials: 30.0,
            food: 20.0,
            livestock: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicators {
    pub health: f64,
    pub morale: f64,
    pub tfp: f64,
    pub land_quality: f64,
    pub total_land: f64,
    pub real_wage: f64,
    pub last_food_production: f64,
    pub wage_above_13_years: u32,
}

impl Default for EconomicIndicators {
    fn default() -> Self {
        Self {
            health: 0.6,
            morale: 0.6,
            tfp: 1.0,
            land_quality: 1.0,
            total_land: 100.0,
            real_wage: 1.0,
            last_food_production: 0.0,
            wage_above_13_years: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub year: u32,
    pub day: u32,
    pub pop: u32,
    pub real_wage: f64,
    pub food_stock: f64,
    pub livestock: u32,
    pub tfp: f64,
    pub soil_quality: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    pub tick: u64,
    pub clock: WorldClock,
    pub weather: WeatherState,
    pub population: Population,
    pub stock: ResourceStock,
    pub indicators: EconomicIndicators,
    pub labor: LaborAllocation,
    pub pools: LaborPools,
    pub skills: LaborSkills,
    pub default_crop: CropKind,
    pub buildings: Vec<BuildingSite>,
    pub plots: BTreeMap<BuildingId, FarmPlot>,
    pub nodes: Vec<ResourceNode>,
    pub gather_jobs: VecDeque<GatherJob>,
    pub regrow_queue: Vec<RegrowEntry>,
    pub bounds: GroundBounds,
    pub techs: TechSet,
    pub milestones: Milestones,
    pub victory: VictoryChecklist,
    pub victory_reached: bool,
    pub policy: PolicyState,
    pub trade: TradeState,
    pub urban: UrbanState,
    pub pending_decision: Option<PendingDecision>,
    pub history: Vec<HistoryEntry>,
    next_building_id: u64,
    next_job_id: u64,
    #[serde(skip)]
    events: Vec<SimEvent>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// An empty village with default stocks, basic farming known, and no
    /// buildings or resource nodes.
    pub fn new() -> Self {
        let labor = LaborAllocation::default();
        Self {
            tick: 0,
            clock: WorldClock::default(),
            weather: WeatherState::default(),
            population: Population::default(),
            stock: ResourceStock::default(),
            indicators: EconomicIndicators::default(),
            labor,
            pools: LaborPools::default(),
            skills: LaborSkills::matching(&labor),
            default_crop: CropKind::Wheat,
            buildings: Vec::new(),
            plots: BTreeMap::new(),
            nodes: Vec::new(),
            gather_jobs: VecDeque::new(),
            regrow_queue: Vec::new(),
            bounds: GroundBounds::default(),
            techs: TechSet::with([TechKey::BasicFarming]),
            milestones: Milestones::default(),
            victory: VictoryChecklist::default(),
            victory_reached: false,
            policy: PolicyState::default(),
            trade: TradeState::default(),
            urban: UrbanState::default(),
            pending_decision: None,
            history: Vec::new(),
            next_building_id: 1,
            next_job_id: 1,
            events: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn need_per_day(&self) -> f64 {
        self.population.pop as f64 * FOOD_PER_HEAD
    }

    pub fn weather_effect(&self) -> WeatherEffect {
        weather_effect(self.weather.now, &self.techs, self.default_crop)
    }

    pub fn completed(&self, kind: BuildingKind) -> impl Iterator<Item = &BuildingSite> + '_ {
        self.buildings
            .iter()
            .filter(move |site| site.kind == kind && site.done)
    }

    pub fn completed_count(&self, kind: BuildingKind) -> usize {
        self.completed(kind).count()
    }

    pub fn has_completed(&self, kind: BuildingKind) -> bool {
        self.completed(kind).next().is_some()
    }

    pub fn building(&self, id: BuildingId) -> Option<&BuildingSite> {
        self.buildings.iter().find(|site| site.id == id)
    }

    pub fn housing_cap(&self) -> u32 {
        BASE_HOUSING + HOUSING_PER_HOUSE * self.completed_count(BuildingKind::House) as u32
    }

    pub fn stage_of(&self, farm: BuildingId) -> CropStage {
        self.plots
            .get(&farm)
            .map(FarmPlot::stage)
            .unwrap_or(CropStage::Empty)
    }

    pub fn node(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub(crate) fn allocate_building_id(&mut self) -> BuildingId {
        let id = BuildingId(self.next_building_id);
        self.next_building_id += 1;
        id
    }

    pub(crate) fn allocate_job_id(&mut self) -> u64 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        id
    }

    /// Adds a finished building, as used for starting infrastructure.
    pub fn add_completed_building(&mut self, kind: BuildingKind, x: f64, y: f64) -> BuildingId {
        let id = self.allocate_building_id();
        self.buildings.push(BuildingSite::completed(id, kind, x, y));
        id
    }

    pub fn kill(&mut self, deaths: u32, cause: DeathCause) -> u32 {
        let died = self.population.apply_deaths(deaths);
        if died > 0 {
            self.emit(SimEvent::PopulationDied { cause, deaths: died });
        }
        died
    }

    pub fn emit(&mut self, event: SimEvent) {
        debug!(tick = self.tick, ?event, "event");
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self, scenario: &str) -> WorldSnapshot {
        let effect = self.weather_effect();
        let farms = self
            .buildings
            .iter()
            .filter(|site| site.kind == BuildingKind::Farm)
            .map(|site| {
                let plot = self.plots.get(&site.id).cloned();
                FarmView {
                    id: site.id,
                    done: site.done,
                    stage: self.stage_of(site.id),
                    growth: plot.as_ref().map_or(0.0, FarmPlot::growth_fraction),
                    plot,
                }
            })
            .collect();
        let construction = self
            .buildings
            .iter()
            .filter(|site| !site.done)
            .map(|site| ConstructionView {
                id: site.id,
                kind: site.kind,
                fraction: site.fraction_complete(),
            })
            .collect();
        let decision = self.pending_decision.map(|pending| DecisionView {
            kind: pending.kind,
            title: pending.kind.title().to_string(),
            terms: pending.kind.terms().to_string(),
            raised_tick: pending.raised_tick,
        });
        WorldSnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            clock: self.clock,
            weather: self.weather,
            weather_effect: effect,
            population: self.population,
            stock: self.stock,
            indicators: self.indicators,
            labor: self.labor,
            idle_share: self.labor.idle(),
            pools: self.pools,
            skills: self.skills,
            default_crop: self.default_crop,
            buildings: self.buildings.clone(),
            construction,
            farms,
            nodes: self.nodes.clone(),
            gather_jobs: self.gather_jobs.iter().cloned().collect(),
            regrow_queue: self.regrow_queue.clone(),
            techs: self.techs.iter().collect(),
            available_techs: self.techs.available(),
            milestones: self.milestones.iter().collect(),
            victory: self.victory,
            victory_progress: self.victory.progress(),
            victory_reached: self.victory_reached,
            policy: self.policy,
            trade: self.trade,
            urban: self.urban,
            pending_decision: self.pending_decision,
            decision,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmView {
    pub id: BuildingId,
    pub done: bool,
    pub stage: CropStage,
    /// 0 to 1, how far the current plot is toward maturity.
    pub growth: f64,
    pub plot: Option<FarmPlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionView {
    pub id: BuildingId,
    pub kind: BuildingKind,
    pub fraction: f64,
}

/// A pending decision with the wording shown to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionView {
    pub kind: DecisionKind,
    pub title: String,
    pub terms: String,
    pub raised_tick: u64,
}

/// Read-only view of the village handed to presentation layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub clock: WorldClock,
    pub weather: WeatherState,
    pub weather_effect: WeatherEffect,
    pub population: Population,
    pub stock: ResourceStock,
    pub indicators: EconomicIndicators,
    pub labor: LaborAllocation,
    pub idle_share: f64,
    pub pools: LaborPools,
    pub skills: LaborSkills,
    pub default_crop: CropKind,
    pub buildings: Vec<BuildingSite>,
    pub construction: Vec<ConstructionView>,
    pub farms: Vec<FarmView>,
    pub nodes: Vec<ResourceNode>,
    pub gather_jobs: Vec<GatherJob>,
    pub regrow_queue: Vec<RegrowEntry>,
    pub techs: Vec<TechKey>,
    pub available_techs: Vec<TechKey>,
    pub milestones: Vec<crate::milestones::MilestoneKey>,
    pub victory: VictoryChecklist,
    pub victory_progress: u32,
    pub victory_reached: bool,
    pub policy: PolicyState,
    pub trade: TradeState,
    pub urban: UrbanState,
    pub pending_decision: Option<PendingDecision>,
    pub decision: Option<DecisionView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deaths_respect_population_floor() {
        let mut population = Population {
            pop: 14,
            cap: 100,
            total_deaths: 0,
        };
        assert_eq!(population.apply_deaths(9), 4);
        assert_eq!(population.pop, POPULATION_FLOOR);
        assert_eq!(population.apply_deaths(3), 0);
        assert_eq!(population.total_deaths, 4);
    }

    #[test]
    fn deaths_never_raise_a_population_below_the_floor() {
        let mut population = Population {
            pop: 7,
            cap: 100,
            total_deaths: 0,
        };
        assert_eq!(population.apply_deaths(3), 0);
        assert_eq!(population.pop, 7);
        assert_eq!(population.total_deaths, 0);
    }

    #[test]
    fn snapshot_carries_progress_and_decision_text() {
        let mut world = WorldState::new();
        let site = world.allocate_building_id();
        let mut house = BuildingSite::new(site, BuildingKind::House, 0.0, 0.0);
        house.advance(1.0);
        world.buildings.push(house);
        let farm = world.add_completed_building(BuildingKind::Farm, 80.0, 0.0);
        let mut plot = FarmPlot::plant(CropKind::Barley, &world.clock);
        for _ in 0..30 {
            plot.grow();
        }
        world.plots.insert(farm, plot);
        world.pending_decision = Some(PendingDecision {
            kind: DecisionKind::Festival,
            raised_tick: 4,
        });

        let snapshot = world.snapshot("test");
        assert_eq!(snapshot.construction.len(), 1);
        assert!((snapshot.construction[0].fraction - 0.25).abs() < 1e-12);
        assert!((snapshot.farms[0].growth - 0.25).abs() < 1e-12);
        assert!(snapshot.idle_share.abs() < 1e-12);
        let decision = snapshot.decision.unwrap();
        assert_eq!(decision.title, DecisionKind::Festival.title());
        assert_eq!(decision.raised_tick, 4);
    }

    #[test]
    fn housing_counts_only_finished_houses() {
        let mut world = WorldState::new();
        world.add_completed_building(BuildingKind::House, 0.0, 0.0);
        let id = world.allocate_building_id();
        world
            .buildings
            .push(BuildingSite::new(id, BuildingKind::House, 80.0, 0.0));
        assert_eq!(world.housing_cap(), 105);
    }
}
