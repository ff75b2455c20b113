#![allow(dead_code)]

use econoville::{
    engine::{Engine, EngineBuilder, EngineSettings},
    scenario::{Scenario, ScenarioLoader},
};
use rand::RngCore;

/// Every draw lands at 0.6 of the range: spring and summer weather stay
/// sunny and no low-probability event ever fires.
pub struct FixedRng;

const FIXED: f64 = 0.6;

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (FIXED * u32::MAX as f64) as u32
    }

    fn next_u64(&mut self) -> u64 {
        (FIXED * u64::MAX as f64) as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = (FIXED * u8::MAX as f64) as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Every draw lands at 0.06 of the range: events at 10% or more always
/// fire, those at 5% or less never do.
pub struct LowRng;

const LOW: f64 = 0.06;

impl RngCore for LowRng {
    fn next_u32(&mut self) -> u32 {
        (LOW * u32::MAX as f64) as u32
    }

    fn next_u64(&mut self) -> u64 {
        (LOW * u64::MAX as f64) as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = (LOW * u8::MAX as f64) as u8;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

pub fn engine(name: &str, seed: u64) -> Engine {
    EngineBuilder::new(EngineSettings {
        scenario_name: name.to_string(),
        seed,
        snapshot_interval_ticks: 0,
        snapshot_dir: None,
    })
    .with_village_systems()
    .build()
}

pub fn village_scenario() -> Scenario {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("scenarios/village.yaml")
        .expect("village scenario loads")
}
