//! Calculator configuration.
//!
//! Configuration is read from a TOML file. Every key is optional and a missing
//! file yields the defaults:
//!
//! ```toml
//! risk_free_rate_pct = 2.0
//! days_per_year = 365
//! projection_horizon_days = 90
//! lookback_days = 30
//! projection_jitter = 0.005
//! cash_flow_policy = "time_weighted"
//! report_prefix = "performance"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// How deposits and withdrawals are treated when computing daily returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowPolicy {
    /// Subtract each day's external flow before computing its return
    #[default]
    TimeWeighted,
    /// Use raw balance changes, flows included
    Raw,
}

/// Settings for [`crate::PerformanceCalculator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Annual risk-free rate in percent, used by the Sharpe ratio
    pub risk_free_rate_pct: f64,
    /// Periods per year for annualizing daily figures
    pub days_per_year: u32,
    /// Default projection length in days
    pub projection_horizon_days: u32,
    /// Number of recent daily returns averaged for projections
    pub lookback_days: u32,
    /// Half-width of the uniform noise added to each projected daily return
    pub projection_jitter: f64,
    /// Deposit/withdrawal handling for daily returns
    pub cash_flow_policy: CashFlowPolicy,
    /// File name prefix for exported reports
    pub report_prefix: String,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            risk_free_rate_pct: 2.0,
            days_per_year: 365,
            projection_horizon_days: 90,
            lookback_days: 30,
            projection_jitter: 0.005,
            cash_flow_policy: CashFlowPolicy::TimeWeighted,
            report_prefix: "performance".to_string(),
        }
    }
}

impl CalculatorConfig {
    /// Load configuration from the default path.
    ///
    /// Default path: `<config dir>/performance-core/config.toml`
    /// Can be overridden with `PERF_CONFIG_FILE` environment variable.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PERF_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("performance-core/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load configuration from a specific path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the calculator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate_pct.is_finite() {
            return Err(Error::InvalidParameter(
                "risk_free_rate_pct must be finite".to_string(),
            ));
        }

        if self.days_per_year == 0 {
            return Err(Error::InvalidParameter(
                "days_per_year must be positive".to_string(),
            ));
        }

        if self.lookback_days == 0 {
            return Err(Error::InvalidParameter(
                "lookback_days must be positive".to_string(),
            ));
        }

        if !self.projection_jitter.is_finite() || !(0.0..1.0).contains(&self.projection_jitter) {
            return Err(Error::InvalidParameter(format!(
                "projection_jitter must be in [0, 1), got {}",
                self.projection_jitter
            )));
        }

        Ok(())
    }
}
