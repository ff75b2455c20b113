use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::PersistenceError,
    world::{HistoryEntry, WorldState},
};

pub const SCHEMA_VERSION: u32 = 1;

/// Writes a JSON snapshot of the village every `interval` ticks. An interval
/// of zero disables it.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(&mut self, world: &WorldState, scenario: &str) -> Result<Option<PathBuf>> {
        if self.interval == 0 || world.tick() % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", world.tick()));
        let json = serde_json::to_string_pretty(&world.snapshot(scenario))?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub scenario: String,
    pub world: WorldState,
}

impl SaveFile {
    pub fn new(scenario: &str, world: &WorldState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            scenario: scenario.to_string(),
            world: world.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, PersistenceError> {
        let save: SaveFile = serde_json::from_str(raw)?;
        if save.schema_version != SCHEMA_VERSION {
            return Err(PersistenceError::SchemaMismatch {
                found: save.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(save)
    }
}

pub fn save_world(path: &Path, scenario: &str, world: &WorldState) -> Result<(), PersistenceError> {
    let json = SaveFile::new(scenario, world).to_json()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json).map_err(|err| {
        warn!(path = %path.display(), %err, "save failed");
        PersistenceError::from(err)
    })?;
    info!(path = %path.display(), tick = world.tick(), "game saved");
    Ok(())
}

/// Reads a save from disk. The caller's world is only replaced once this
/// succeeds.
pub fn load_world(path: &Path) -> Result<SaveFile, PersistenceError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        warn!(path = %path.display(), %err, "load failed");
        PersistenceError::from(err)
    })?;
    let save = SaveFile::from_json(&raw)?;
    info!(path = %path.display(), tick = save.world.tick(), "game loaded");
    Ok(save)
}

pub const HISTORY_HEADER: &str = "year,day,pop,real_wage,food_stock,livestock,tfp,soil_quality";

pub fn history_csv(history: &[HistoryEntry]) -> String {
    let mut out = String::with_capacity(64 * (history.len() + 1));
    out.push_str(HISTORY_HEADER);
    out.push('\n');
    for entry in history {
        let _ = writeln!(
            out,
            "{},{},{},{:.4},{:.2},{},{:.4},{:.4}",
            entry.year,
            entry.day,
            entry.pop,
            entry.real_wage,
            entry.food_stock,
            entry.livestock,
            entry.tfp,
            entry.soil_quality
        );
    }
    out
}

pub fn export_history(path: &Path, history: &[HistoryEntry]) -> Result<(), PersistenceError> {
    fs::write(path, history_csv(history))?;
    Ok(())
}
