//! Core data types for balance performance tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timestamped account balance record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceObservation {
    /// When the balance was observed
    pub timestamp: DateTime<Utc>,
    /// Account balance (never negative)
    pub balance: f64,
    /// Net deposit (+) or withdrawal (-) already included in `balance`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_flow: Option<f64>,
}

impl BalanceObservation {
    /// Create an observation with no external cash flow.
    pub fn new(timestamp: DateTime<Utc>, balance: f64) -> Self {
        Self {
            timestamp,
            balance,
            external_flow: None,
        }
    }

    /// Attach a deposit (positive) or withdrawal (negative) to this observation.
    pub fn with_flow(mut self, flow: f64) -> Self {
        self.external_flow = Some(flow);
        self
    }

    /// External flow on this day, zero when none was recorded.
    pub fn flow(&self) -> f64 {
        self.external_flow.unwrap_or(0.0)
    }
}

/// Summary return and risk metrics for a balance history.
///
/// Every field is `None` when it cannot be computed from the data, e.g. fewer
/// than two observations, a zero starting balance or zero volatility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    /// Simple return from first to last balance, in percent
    pub total_return_pct: Option<f64>,
    /// Total return normalized to a one-year period, in percent
    pub annualized_return_pct: Option<f64>,
    /// Chain-linked daily returns with external flows removed, in percent
    pub time_weighted_return_pct: Option<f64>,
    /// Annualized standard deviation of daily returns, in percent
    pub volatility_pct: Option<f64>,
    /// (annualized return - risk-free rate) / volatility
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough balance decline, in percent
    pub max_drawdown_pct: Option<f64>,
    /// Latest balance
    pub current_balance: Option<f64>,
    /// Last balance minus first balance
    pub total_earnings: Option<f64>,
    /// Sum of deposits and withdrawals after the first observation
    pub net_external_flows: Option<f64>,
    /// Whole days between first and last observation
    pub investment_period_days: Option<i64>,
}

impl PerformanceMetrics {
    /// Metrics with every field undefined.
    pub fn undefined() -> Self {
        Self::default()
    }

    /// Whether any metric could be computed.
    pub fn is_defined(&self) -> bool {
        self != &Self::undefined()
    }
}

/// A projected balance on a future date.
///
/// Projections extrapolate recent returns with random jitter and are meant
/// for illustration, not as a forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    /// Projected date
    pub date: DateTime<Utc>,
    /// Projected balance (never negative)
    pub projected_balance: f64,
}

/// Return relative to the first balance in a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CumulativeReturnPoint {
    pub timestamp: DateTime<Utc>,
    /// (balance - first balance) / first balance, in percent
    pub return_pct: f64,
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
