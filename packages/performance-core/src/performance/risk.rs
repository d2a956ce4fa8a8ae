//! Risk metrics over daily returns and balances.
//!
//! Provides volatility, Sharpe ratio and max drawdown calculations.

use super::returns::finite;

/// Standard deviations below this are treated as zero.
const MIN_STD_DEV: f64 = 1e-12;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    let std = variance.sqrt();

    if std < MIN_STD_DEV {
        Some(0.0)
    } else {
        finite(std)
    }
}

/// Calculate annualized volatility from daily returns.
///
/// # Arguments
///
/// * `returns` - Daily returns (e.g., 0.01 for 1%)
/// * `periods_per_year` - Number of return periods in a year (365 for calendar days)
///
/// # Returns
///
/// Annualized volatility in percent, or `None` with fewer than two returns.
pub fn volatility(returns: &[f64], periods_per_year: u32) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let std = std_dev(returns)?;
    finite(std * f64::from(periods_per_year).sqrt() * 100.0)
}

/// Calculate the Sharpe ratio from annualized figures in percent.
///
/// Returns `None` when volatility is zero, since the ratio is undefined.
pub fn sharpe_ratio(
    annualized_return_pct: f64,
    risk_free_rate_pct: f64,
    volatility_pct: f64,
) -> Option<f64> {
    if volatility_pct <= 0.0 {
        return None;
    }
    finite((annualized_return_pct - risk_free_rate_pct) / volatility_pct)
}

/// Calculate maximum drawdown from a series of balances.
///
/// Returns the largest peak-to-trough decline in percent (e.g., 15.0 for a
/// 15% drawdown), or `None` for an empty series.
pub fn max_drawdown(balances: &[f64]) -> Option<f64> {
    let mut iter = balances.iter().copied();
    let mut running_max = iter.next()?;
    let mut max_drawdown = 0.0_f64;

    for value in iter {
        if value > running_max {
            running_max = value;
        }
        if running_max > 0.0 {
            let drawdown = (running_max - value) / running_max;
            max_drawdown = max_drawdown.max(drawdown);
        }
    }

    finite(max_drawdown * 100.0)
}
