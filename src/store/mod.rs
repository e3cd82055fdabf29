// JSON file stores: device_states.json (written by ingestion, read by the worker)
// and scoreboard.json (written only by the worker).

mod json_file;

use crate::models::{DeviceStates, Scoreboard};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub struct DeviceStore {
    path: PathBuf,
}

impl DeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(store = "devices", operation = "load"))]
    pub async fn load(&self) -> anyhow::Result<Option<DeviceStates>> {
        json_file::read(&self.path).await
    }

    /// Current device states; a missing or malformed file reads as no devices.
    pub async fn load_or_empty(&self) -> DeviceStates {
        match self.load().await {
            Ok(Some(states)) => states,
            Ok(None) => DeviceStates::new(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "device states unreadable; treating as empty");
                DeviceStates::new()
            }
        }
    }

    #[instrument(skip(self, states), fields(store = "devices", operation = "save", devices_count = states.len()))]
    pub async fn save(&self, states: &DeviceStates) -> anyhow::Result<()> {
        json_file::write_atomic(&self.path, states).await
    }
}

pub struct ScoreboardStore {
    path: PathBuf,
}

impl ScoreboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(store = "scoreboard", operation = "load"))]
    pub async fn load(&self) -> anyhow::Result<Option<Scoreboard>> {
        json_file::read(&self.path).await
    }

    /// Stored scores with every tree count reset to zero. Missing or malformed files start fresh.
    pub async fn load_scores(&self) -> Scoreboard {
        match self.load().await {
            Ok(Some(board)) => board.scores_only(),
            Ok(None) => {
                info!(path = %self.path.display(), "no scoreboard found; starting fresh");
                Scoreboard::default()
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "scoreboard unreadable; starting fresh");
                Scoreboard::default()
            }
        }
    }

    /// Stored scoreboard as-is (live tree counts included); defaults when missing or malformed.
    pub async fn load_or_default(&self) -> Scoreboard {
        match self.load().await {
            Ok(board) => board.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "scoreboard unreadable");
                Scoreboard::default()
            }
        }
    }

    #[instrument(skip(self, board), fields(store = "scoreboard", operation = "save"))]
    pub async fn save(&self, board: &Scoreboard) -> anyhow::Result<()> {
        json_file::write_atomic(&self.path, board).await
    }
}
