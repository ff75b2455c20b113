use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    buildings::{BuildingId, BuildingKind, BuildingSite},
    crops::CropKind,
    decisions,
    error::CommandError,
    events::SimEvent,
    farm::{CropStage, FarmPlot},
    labor::Role,
    policy::{LandPolicy, ENCLOSURE_RESUME_RATE},
    resources::GatherJob,
    systems,
    tech::{self, TechKey},
    world::WorldState,
};

/// Minimum gatherer share needed before a node can be worked.
const MIN_GATHERER_SHARE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SetLaborShare { role: Role, fraction: f64 },
    SetWorkIntensity { value: f64 },
    PlaceBuilding { kind: BuildingKind, x: f64, y: f64 },
    HarvestNode { node_id: String },
    SelectCrop { farm_id: BuildingId, crop: CropKind },
    SetDefaultCrop { crop: CropKind },
    HarvestFarm { farm_id: BuildingId },
    UnlockTech { key: TechKey },
    SetPolicy { policy: LandPolicy },
    PauseEnclosure,
    ResolveDecision { accept: bool },
}

/// Validates and applies one player command. On error the world is unchanged
/// and no events are emitted.
pub fn apply_command(
    world: &mut WorldState,
    command: Command,
    rng: &mut dyn RngCore,
) -> Result<Vec<SimEvent>, CommandError> {
    let outcome = match command {
        Command::SetLaborShare { role, fraction } => {
            world.labor.set_share(role, fraction);
            Ok(())
        }
        Command::SetWorkIntensity { value } => {
            world.labor.set_intensity(value);
            Ok(())
        }
        Command::PlaceBuilding { kind, x, y } => world.place_building(kind, x, y).map(|_| ()),
        Command::HarvestNode { node_id } => world.harvest_node(&node_id),
        Command::SelectCrop { farm_id, crop } => world.select_crop(farm_id, crop),
        Command::SetDefaultCrop { crop } => {
            world.default_crop = crop;
            Ok(())
        }
        Command::HarvestFarm { farm_id } => world.harvest_farm(farm_id).map(|_| ()),
        Command::UnlockTech { key } => world.unlock_tech(key),
        Command::SetPolicy { policy } => world.set_policy(policy),
        Command::PauseEnclosure => world.pause_enclosure(),
        Command::ResolveDecision { accept } => world.resolve_decision(accept, rng),
    };
    match outcome {
        Ok(()) => Ok(world.drain_events()),
        Err(err) => {
            warn!(%err, "command rejected");
            Err(err)
        }
    }
}

impl WorldState {
    pub fn place_building(
        &mut self,
        kind: BuildingKind,
        x: f64,
        y: f64,
    ) -> Result<BuildingId, CommandError> {
        if let Some(tech) = kind.spec().requires {
            if !self.techs.has(tech) {
                return Err(CommandError::TechRequired { kind, tech });
            }
        }
        let cost = kind.cost(&self.techs);
        if self.stock.materials < cost {
            return Err(CommandError::InsufficientMaterials {
                needed: cost,
                available: self.stock.materials,
            });
        }
        self.stock.materials -= cost;
        let id = self.allocate_building_id();
        self.buildings.push(BuildingSite::new(id, kind, x, y));
        info!(%id, %kind, cost, "building placed");
        self.emit(SimEvent::BuildingPlaced { id, kind, cost });
        Ok(id)
    }

    pub fn harvest_node(&mut self, node_id: &str) -> Result<(), CommandError> {
        if self.labor.gatherers < MIN_GATHERER_SHARE {
            return Err(CommandError::NotEnoughGatherers);
        }
        let node = self
            .node(node_id)
            .cloned()
            .ok_or_else(|| CommandError::UnknownNode(node_id.to_string()))?;
        if self.gather_jobs.iter().any(|job| job.node_id == node_id) {
            return Err(CommandError::NodeBusy(node_id.to_string()));
        }
        let id = self.allocate_job_id();
        self.gather_jobs.push_back(GatherJob::new(id, &node));
        self.emit(SimEvent::GatherStarted {
            node_id: node.id,
            kind: node.kind,
        });
        Ok(())
    }

    /// Plants `crop` on a finished farm, replacing whatever is still growing
    /// there.
    pub fn select_crop(&mut self, farm_id: BuildingId, crop: CropKind) -> Result<(), CommandError> {
        self.ensure_finished_farm(farm_id)?;
        if self
            .plots
            .get(&farm_id)
            .is_some_and(|plot| plot.stage() == CropStage::Mature)
        {
            return Err(CommandError::PlotMature(farm_id));
        }
        let season = self.clock.season;
        if !crop.can_plant(season) {
            return Err(CommandError::OutOfSeason { crop, season });
        }
        self.plots.insert(farm_id, FarmPlot::plant(crop, &self.clock));
        self.emit(SimEvent::CropPlanted { farm: farm_id, crop });
        Ok(())
    }

    /// Harvests a mature, in-season plot and banks one day of that farm's
    /// output, net of spoilage and extraction. The plot stays `Harvested`
    /// until the field is replanted. Returns the food credited.
    pub fn harvest_farm(&mut self, farm_id: BuildingId) -> Result<f64, CommandError> {
        self.ensure_finished_farm(farm_id)?;
        let season = self.clock.season;
        let crop = match self.plots.get(&farm_id) {
            Some(plot) if plot.is_harvestable(season) => plot.crop,
            _ => return Err(CommandError::NotHarvestable(farm_id)),
        };
        let gross = systems::single_farm_yield(self, crop);
        let food = systems::net_yield(self, gross);
        if let Some(plot) = self.plots.get_mut(&farm_id) {
            plot.harvested = true;
        }
        self.stock.food += food;
        info!(%farm_id, %crop, food, "farm harvested");
        self.emit(SimEvent::CropHarvested {
            farm: farm_id,
            crop,
            food,
        });
        Ok(food)
    }

    pub fn unlock_tech(&mut self, key: TechKey) -> Result<(), CommandError> {
        if self.techs.has(key) {
            return Err(CommandError::AlreadyUnlocked(key));
        }
        let missing = self.techs.missing_prerequisites(key);
        if !missing.is_empty() {
            return Err(CommandError::MissingPrerequisites { tech: key, missing });
        }
        let cost = tech::definition(key).cost;
        if self.stock.materials < cost {
            return Err(CommandError::InsufficientMaterials {
                needed: cost,
                available: self.stock.materials,
            });
        }
        self.stock.materials -= cost;
        self.techs.insert(key);
        self.apply_unlock_effect(key);
        info!(%key, cost, "technology unlocked");
        self.emit(SimEvent::TechUnlocked { key, cost });
        Ok(())
    }

    fn apply_unlock_effect(&mut self, key: TechKey) {
        let indicators = &mut self.indicators;
        match key {
            TechKey::ThreeField => indicators.tfp *= 1.15,
            TechKey::Well => indicators.health = (indicators.health + 0.2).min(1.0),
            TechKey::HeavyPlough => indicators.tfp *= 1.25,
            TechKey::SeedSelection => indicators.tfp *= 1.10,
            TechKey::CharteredRights => self.policy.tithes.lord = 0.25,
            TechKey::GuildSystem => {
                indicators.tfp *= 1.10;
                indicators.morale = (indicators.morale + 0.15).min(1.0);
            }
            TechKey::Fertilizer => indicators.tfp *= 1.15,
            // Remaining techs act through gates and per-tick checks.
            _ => {}
        }
    }

    pub fn set_policy(&mut self, policy: LandPolicy) -> Result<(), CommandError> {
        if self.policy.land == policy {
            return Err(CommandError::PolicyUnchanged(policy));
        }
        let enclosure = &mut self.policy.enclosure;
        match policy {
            LandPolicy::Enclosed => {
                self.indicators.morale = (self.indicators.morale - 0.10).max(0.0);
                enclosure.rate = 0.02;
            }
            LandPolicy::Commons => {
                self.indicators.morale = (self.indicators.morale + 0.05).min(1.0);
                enclosure.rate = -0.01;
            }
        }
        enclosure.resume_in = None;
        self.policy.land = policy;
        let rate = self.policy.enclosure.rate;
        info!(%policy, rate, "land policy changed");
        self.emit(SimEvent::PolicyChanged {
            policy,
            enclosure_rate: rate,
        });
        Ok(())
    }

    pub fn pause_enclosure(&mut self) -> Result<(), CommandError> {
        if self.policy.land != LandPolicy::Enclosed {
            return Err(CommandError::NotEnclosed);
        }
        self.policy.enclosure.rate = 0.0;
        self.policy.enclosure.resume_in = None;
        self.emit(SimEvent::PolicyChanged {
            policy: LandPolicy::Enclosed,
            enclosure_rate: 0.0,
        });
        Ok(())
    }

    pub fn resolve_decision(&mut self, accept: bool, rng: &mut dyn RngCore) -> Result<(), CommandError> {
        let pending = self
            .pending_decision
            .ok_or(CommandError::NoPendingDecision)?;
        if accept {
            decisions::accept(pending.kind, self, rng)?;
        } else {
            decisions::decline(pending.kind, self, rng);
        }
        self.pending_decision = None;
        info!(kind = ?pending.kind, accept, "decision resolved");
        self.emit(SimEvent::DecisionResolved {
            kind: pending.kind,
            accepted: accept,
        });
        Ok(())
    }

    /// Ticks remaining on an unrest pause count down here; when one runs out
    /// an enclosed village resumes enclosing.
    pub(crate) fn tick_enclosure_pause(&mut self) {
        let Some(remaining) = self.policy.enclosure.resume_in else {
            return;
        };
        if remaining > 1 {
            self.policy.enclosure.resume_in = Some(remaining - 1);
            return;
        }
        self.policy.enclosure.resume_in = None;
        if self.policy.land == LandPolicy::Enclosed {
            self.policy.enclosure.rate = ENCLOSURE_RESUME_RATE;
            self.emit(SimEvent::EnclosureResumed {
                rate: ENCLOSURE_RESUME_RATE,
            });
        }
    }

    fn ensure_finished_farm(&self, farm_id: BuildingId) -> Result<(), CommandError> {
        let site = self
            .building(farm_id)
            .ok_or(CommandError::UnknownBuilding(farm_id))?;
        if site.kind != BuildingKind::Farm {
            return Err(CommandError::NotAFarm(farm_id));
        }
        if !site.done {
            return Err(CommandError::UnderConstruction(farm_id));
        }
        Ok(())
    }
}
