//! Balance history persistence.

use crate::history::{validate_history, validate_observation};
use crate::types::BalanceObservation;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a history file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HistoryFile {
    observations: Vec<BalanceObservation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Balance history that persists to JSON.
///
/// Observations can only be appended, and only if the history stays
/// chronological with valid balances.
#[derive(Debug)]
pub struct HistoryStore {
    /// Path to the history JSON file
    path: PathBuf,
    /// In-memory history
    history: HistoryFile,
}

impl HistoryStore {
    /// Open the history at the default path.
    ///
    /// Default path: `<data dir>/performance-core/history.json`
    /// Can be overridden with `PERF_HISTORY_FILE` environment variable.
    pub fn open_default() -> Result<Self> {
        Self::with_path(Self::default_path())
    }

    /// Open the history at a custom path. A missing file is an empty history.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let history = Self::load_from_path(&path)?;
        Ok(Self { path, history })
    }

    /// Create an in-memory store (no persistence).
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            history: HistoryFile::default(),
        }
    }

    /// Get the default history file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PERF_HISTORY_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.data_dir().join("performance-core/history.json"))
            .unwrap_or_else(|| PathBuf::from("history.json"))
    }

    /// Get the current path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate a history file.
    fn load_from_path(path: &Path) -> Result<HistoryFile> {
        if !path.exists() {
            return Ok(HistoryFile::default());
        }

        let content = fs::read_to_string(path)?;
        let data: serde_json::Value = serde_json::from_str(&content)?;

        // A bare list of observations is accepted as well
        let history = if data.is_array() {
            HistoryFile {
                observations: serde_json::from_value(data)?,
                ..Default::default()
            }
        } else {
            serde_json::from_value(data)?
        };

        validate_history(&history.observations)?;
        tracing::debug!(
            path = %path.display(),
            observations = history.observations.len(),
            "loaded balance history"
        );
        Ok(history)
    }

    /// Save the current history to disk.
    pub fn save(&mut self) -> Result<()> {
        // Skip if in-memory only
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        if self.history.created_at.is_none() {
            self.history.created_at = Some(Utc::now());
        }
        self.history.updated_at = Some(Utc::now());

        let content = serde_json::to_string_pretty(&self.history)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Reload the history from disk.
    pub fn reload(&mut self) -> Result<()> {
        self.history = Self::load_from_path(&self.path)?;
        Ok(())
    }

    /// All observations, oldest first.
    pub fn observations(&self) -> &[BalanceObservation] {
        &self.history.observations
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&BalanceObservation> {
        self.history.observations.last()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.history.observations.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.history.observations.is_empty()
    }

    /// Append an observation.
    ///
    /// Fails without modifying the history if the balance is invalid or the
    /// timestamp is earlier than the latest observation.
    pub fn record(&mut self, observation: BalanceObservation) -> Result<()> {
        let index = self.history.observations.len();
        validate_observation(index, &observation)?;

        if let Some(latest) = self.latest() {
            if observation.timestamp < latest.timestamp {
                return Err(Error::InvalidObservation {
                    index,
                    field: "timestamp",
                    reason: format!(
                        "{} is earlier than the latest observation ({})",
                        observation.timestamp, latest.timestamp
                    ),
                });
            }
        }

        self.history.observations.push(observation);
        Ok(())
    }
}
