//! Exportable performance reports.

use crate::performance::PerformanceCalculator;
use crate::types::{BalanceObservation, PerformanceMetrics, ProjectionPoint};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot of metrics, history and projection for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub metrics: PerformanceMetrics,
    pub historical: Vec<BalanceObservation>,
    pub projections: Vec<ProjectionPoint>,
    pub exported_at: DateTime<Utc>,
}

impl PerformanceReport {
    /// Build a report using the calculator's default horizon and lookback.
    pub fn generate<R: Rng>(
        calculator: &PerformanceCalculator,
        observations: &[BalanceObservation],
        rng: &mut R,
    ) -> Result<Self> {
        let config = calculator.config();
        let metrics = calculator.compute_metrics(observations)?;
        let projections = calculator.compute_projection(
            observations,
            config.projection_horizon_days,
            config.lookback_days,
            rng,
        )?;

        Ok(Self {
            metrics,
            historical: observations.to_vec(),
            projections,
            exported_at: Utc::now(),
        })
    }

    /// File name for a report exported on `date`.
    pub fn file_name(prefix: &str, date: NaiveDate) -> String {
        format!("{}-performance-{}.json", prefix, date.format("%Y-%m-%d"))
    }

    /// Write the report as pretty JSON into `dir`, returning the file path.
    pub fn write_to_dir(&self, dir: &Path, prefix: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let path = dir.join(Self::file_name(prefix, self.exported_at.date_naive()));
        fs::write(&path, serde_json::to_string_pretty(self)?)?;

        tracing::info!(path = %path.display(), "exported performance report");
        Ok(path)
    }
}
