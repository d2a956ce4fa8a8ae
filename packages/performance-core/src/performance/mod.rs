//! Performance analytics module.
//!
//! Provides return calculations, risk metrics, the performance calculator and
//! chart-facing analysis helpers.

mod analysis;
mod calculator;
mod returns;
mod risk;

pub use analysis::{
    analyze_risk_profile, compare_with_benchmark, filter_by_period, Benchmark,
    BenchmarkComparison, ChartPeriod, RiskLevel, RiskProfile, SharpeAssessment,
};
pub use calculator::PerformanceCalculator;
pub use returns::{
    annualize_return, cumulative_returns, daily_returns, elapsed_days, holding_period_return,
    time_weighted_return,
};
pub use risk::{max_drawdown, mean, sharpe_ratio, std_dev, volatility};
