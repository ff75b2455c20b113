mod bookkeeping;
mod calendar;
mod construction;
mod crops;
mod decisions;
mod economy;
mod environment;
mod gathering;
mod labor;
mod milestones;
mod policy;
mod population;
mod regrowth;
mod trade;
mod victory;
mod wellbeing;

pub use bookkeeping::BookkeepingSystem;
pub use calendar::CalendarSystem;
pub use construction::ConstructionSystem;
pub use crops::CropSystem;
pub use decisions::DecisionSystem;
pub use economy::{farm_output, harvestable_base, net_yield, single_farm_yield, EconomySystem};
pub use environment::EnvironmentSystem;
pub use gathering::GatheringSystem;
pub use labor::LaborSystem;
pub use milestones::MilestoneSystem;
pub use policy::PolicySystem;
pub use population::PopulationSystem;
pub use regrowth::RegrowthSystem;
pub use trade::TradeSystem;
pub use victory::VictorySystem;
pub use wellbeing::WellbeingSystem;
