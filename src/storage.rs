//! Position state persistence.
//!
//! The position record is a single JSON file rewritten after every
//! mutation. A missing file means a fresh start; a corrupt file is
//! surfaced as an error rather than silently discarded, since overwriting
//! it could orphan a live position.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::PositionState;

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state, or `None` when no file exists yet.
    pub fn load(&self) -> Result<Option<PositionState>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No state file; starting fresh");
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file {}", self.path.display()))?;
        let state: PositionState = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse state file {}", self.path.display()))?;
        info!(state = %state, "Loaded persisted position");
        Ok(Some(state))
    }

    /// Persist the state, overwriting any previous snapshot.
    pub fn save(&self, state: &PositionState) -> Result<()> {
        let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write state file {}", self.path.display()))?;
        debug!(path = %self.path.display(), "State saved");
        Ok(())
    }

    /// Remove the state file if present.
    pub fn delete(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete state file {}", self.path.display()))?;
            info!(path = %self.path.display(), "State file deleted");
        }
        Ok(())
    }
}
