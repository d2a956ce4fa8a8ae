//! Chart period filtering, benchmark comparison and risk profiling.

use crate::history::validate_history;
use crate::types::{BalanceObservation, PerformanceMetrics};
use crate::{Error, Result};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time window shown on a performance chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChartPeriod {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    #[default]
    All,
}

impl ChartPeriod {
    /// Calendar months covered, `None` for the full history.
    pub fn months(&self) -> Option<u32> {
        match self {
            ChartPeriod::OneMonth => Some(1),
            ChartPeriod::ThreeMonths => Some(3),
            ChartPeriod::SixMonths => Some(6),
            ChartPeriod::OneYear => Some(12),
            ChartPeriod::All => None,
        }
    }

    /// Earliest timestamp inside the window ending at `as_of`.
    pub fn cutoff(&self, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.months()
            .and_then(|months| as_of.checked_sub_months(Months::new(months)))
    }
}

impl FromStr for ChartPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "1M" => Ok(ChartPeriod::OneMonth),
            "3M" => Ok(ChartPeriod::ThreeMonths),
            "6M" => Ok(ChartPeriod::SixMonths),
            "1Y" | "1A" => Ok(ChartPeriod::OneYear),
            "ALL" | "TODO" => Ok(ChartPeriod::All),
            other => Err(Error::InvalidParameter(format!(
                "Unknown chart period: {}. Expected 1M, 3M, 6M, 1Y or ALL",
                other
            ))),
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChartPeriod::OneMonth => "1M",
            ChartPeriod::ThreeMonths => "3M",
            ChartPeriod::SixMonths => "6M",
            ChartPeriod::OneYear => "1Y",
            ChartPeriod::All => "ALL",
        };
        f.write_str(label)
    }
}

/// Observations on or after the period's cutoff relative to `as_of`.
pub fn filter_by_period(
    observations: &[BalanceObservation],
    period: ChartPeriod,
    as_of: DateTime<Utc>,
) -> Result<&[BalanceObservation]> {
    validate_history(observations)?;

    let Some(cutoff) = period.cutoff(as_of) else {
        return Ok(observations);
    };

    let start = observations.partition_point(|o| o.timestamp < cutoff);
    Ok(&observations[start..])
}

/// Market index used as a reference annual return.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Benchmark {
    #[default]
    Sp500,
    Nasdaq,
    DowJones,
}

impl Benchmark {
    /// Long-run average annual return in percent.
    pub fn annual_return_pct(&self) -> f64 {
        match self {
            Benchmark::Sp500 => 8.5,
            Benchmark::Nasdaq => 10.2,
            Benchmark::DowJones => 7.8,
        }
    }
}

impl FromStr for Benchmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "SP500" => Ok(Benchmark::Sp500),
            "NASDAQ" => Ok(Benchmark::Nasdaq),
            "DOWJONES" | "DJIA" => Ok(Benchmark::DowJones),
            _ => Err(Error::InvalidParameter(format!("Unknown benchmark: {}", s))),
        }
    }
}

/// Annualized return measured against a benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkComparison {
    pub benchmark: Benchmark,
    /// Account annualized return in percent
    pub user_return_pct: f64,
    /// Benchmark annual return in percent
    pub benchmark_return_pct: f64,
    /// user_return_pct - benchmark_return_pct
    pub difference_pct: f64,
    pub outperforming: bool,
}

/// Compare the annualized return with a benchmark.
///
/// `None` when the annualized return is not computable.
pub fn compare_with_benchmark(
    metrics: &PerformanceMetrics,
    benchmark: Benchmark,
) -> Option<BenchmarkComparison> {
    let user_return_pct = metrics.annualized_return_pct?;
    let benchmark_return_pct = benchmark.annual_return_pct();

    Some(BenchmarkComparison {
        benchmark,
        user_return_pct,
        benchmark_return_pct,
        difference_pct: user_return_pct - benchmark_return_pct,
        outperforming: user_return_pct > benchmark_return_pct,
    })
}

/// Volatility band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Qualitative reading of the Sharpe ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SharpeAssessment {
    Poor,
    Adequate,
    Excellent,
    Undefined,
}

/// Risk classification of an account's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskProfile {
    pub level: RiskLevel,
    pub sharpe_assessment: SharpeAssessment,
    pub description: String,
    pub volatility_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharpe_ratio: Option<f64>,
}

const HIGH_VOLATILITY_PCT: f64 = 20.0;
const LOW_VOLATILITY_PCT: f64 = 10.0;
const POOR_SHARPE: f64 = 0.5;
const EXCELLENT_SHARPE: f64 = 1.5;

/// Classify risk from volatility and Sharpe ratio.
///
/// `None` when volatility is not computable.
pub fn analyze_risk_profile(metrics: &PerformanceMetrics) -> Option<RiskProfile> {
    let volatility_pct = metrics.volatility_pct?;

    let level = if volatility_pct > HIGH_VOLATILITY_PCT {
        RiskLevel::High
    } else if volatility_pct < LOW_VOLATILITY_PCT {
        RiskLevel::Low
    } else {
        RiskLevel::Moderate
    };

    let sharpe_assessment = match metrics.sharpe_ratio {
        None => SharpeAssessment::Undefined,
        Some(s) if s < POOR_SHARPE => SharpeAssessment::Poor,
        Some(s) if s > EXCELLENT_SHARPE => SharpeAssessment::Excellent,
        Some(_) => SharpeAssessment::Adequate,
    };

    let mut description = match level {
        RiskLevel::High => "High risk profile - high volatility",
        RiskLevel::Moderate => "Balanced risk profile",
        RiskLevel::Low => "Conservative risk profile",
    }
    .to_string();

    match sharpe_assessment {
        SharpeAssessment::Poor => description.push_str(" - risk-adjusted returns could improve"),
        SharpeAssessment::Excellent => description.push_str(" - excellent risk-adjusted returns"),
        SharpeAssessment::Adequate | SharpeAssessment::Undefined => {}
    }

    Some(RiskProfile {
        level,
        sharpe_assessment,
        description,
        volatility_pct,
        sharpe_ratio: metrics.sharpe_ratio,
    })
}
