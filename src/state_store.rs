use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::levels::LevelAnalysis;
use crate::model::sample::Sample;
use crate::model::signal::SignalStatus;

const STATE_VERSION: u32 = 1;

/// On-disk form of the engine: samples oldest first plus the last snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub status: SignalStatus,
    #[serde(default)]
    pub levels: LevelAnalysis,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl PersistedState {
    pub fn new(
        samples: Vec<Sample>,
        status: SignalStatus,
        levels: LevelAnalysis,
        last_update: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            version: STATE_VERSION,
            samples,
            status,
            levels,
            last_update,
        }
    }
}

pub fn state_path(configured: &str) -> PathBuf {
    std::env::var("PULSE_STATE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(configured))
}

/// `Ok(None)` when no state has been written yet.
pub fn load_state_from_path(path: &Path) -> Result<Option<PersistedState>> {
    if !path.exists() {
        return Ok(None);
    }

    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let persisted: PersistedState =
        serde_json::from_str(&payload).context("failed to parse persisted engine state json")?;
    Ok(Some(persisted))
}

/// Like `load_state_from_path`, but unreadable state is logged and treated as absent.
pub fn load_state_or_empty(path: &Path) -> Option<PersistedState> {
    match load_state_from_path(path) {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = format!("{:#}", e),
                "discarding unreadable engine state"
            );
            None
        }
    }
}

pub fn persist_state_to_path(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string(state).context("failed to serialize engine state json")?;
    // Temp file + rename keeps the previous state readable until the new one is complete.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to move {} into place", tmp.display()))?;
    Ok(())
}
