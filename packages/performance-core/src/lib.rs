//! Performance Core - Balance history analytics library.
//!
//! This crate turns a chronological account balance history into the numbers a
//! dashboard shows next to its performance charts:
//!
//! - **Returns**: daily, cumulative, time-weighted and annualized returns
//! - **Risk metrics**: annualized volatility, Sharpe ratio, max drawdown
//! - **Projections**: a short-horizon, illustrative extrapolation of recent returns
//! - **Analysis**: chart period filters, benchmark comparison, risk profile
//!
//! Metrics that cannot be computed (too little data, a zero divisor) come back
//! as `None` rather than `NaN` or a fabricated zero.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use performance_core::{BalanceObservation, PerformanceCalculator};
//!
//! let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let history = vec![
//!     BalanceObservation::new(start, 1000.0),
//!     BalanceObservation::new(start + Duration::days(365), 1200.0),
//! ];
//!
//! let calculator = PerformanceCalculator::default();
//! let metrics = calculator.compute_metrics(&history).unwrap();
//! assert_eq!(metrics.total_earnings, Some(200.0));
//! ```

pub mod config;
pub mod history;
pub mod performance;
pub mod report;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{CalculatorConfig, CashFlowPolicy};
pub use types::{
    ApiResponse, BalanceObservation, CumulativeReturnPoint, PerformanceMetrics, ProjectionPoint,
};

// Re-export main functionality
pub use history::validate_history;
pub use performance::{
    analyze_risk_profile, compare_with_benchmark, filter_by_period, Benchmark,
    BenchmarkComparison, ChartPeriod, PerformanceCalculator, RiskLevel, RiskProfile,
    SharpeAssessment,
};
pub use report::PerformanceReport;
pub use store::HistoryStore;

/// Error types for performance-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid observation at index {index}: {field} {reason}")]
    InvalidObservation {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type for performance-core operations.
pub type Result<T> = std::result::Result<T, Error>;
