//! Return calculations over balance histories.
//!
//! Functions here assume the history was already checked with
//! [`crate::validate_history`].

use crate::config::CashFlowPolicy;
use crate::types::{BalanceObservation, CumulativeReturnPoint};
use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Keep a value only if it is a finite number.
pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Daily returns for consecutive observations.
///
/// Under [`CashFlowPolicy::TimeWeighted`] the day's external flow is removed
/// from the balance change. Days whose previous balance is zero have no
/// defined return and are skipped.
pub fn daily_returns(observations: &[BalanceObservation], policy: CashFlowPolicy) -> Vec<f64> {
    observations
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let (prev, curr) = (&pair[0], &pair[1]);
            if prev.balance == 0.0 {
                tracing::debug!(index = i + 1, "skipping daily return after zero balance");
                return None;
            }

            let change = match policy {
                CashFlowPolicy::TimeWeighted => curr.balance - curr.flow() - prev.balance,
                CashFlowPolicy::Raw => curr.balance - prev.balance,
            };
            finite(change / prev.balance)
        })
        .collect()
}

/// Return of each observation relative to the first balance, in percent.
///
/// Empty when the first balance is zero.
pub fn cumulative_returns(observations: &[BalanceObservation]) -> Vec<CumulativeReturnPoint> {
    let Some(first) = observations.first() else {
        return Vec::new();
    };
    if first.balance == 0.0 {
        return Vec::new();
    }

    observations
        .iter()
        .map(|obs| CumulativeReturnPoint {
            timestamp: obs.timestamp,
            return_pct: (obs.balance - first.balance) / first.balance * 100.0,
        })
        .collect()
}

/// Chain-linked return of a series of daily returns, in percent.
pub fn time_weighted_return(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    finite((growth - 1.0) * 100.0)
}

/// Calculate holding period return in percent.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> Option<f64> {
    if initial_value <= 0.0 {
        return None;
    }
    finite(((final_value - initial_value) / initial_value) * 100.0)
}

/// Annualize a percentage return earned over `days` days.
///
/// `((1 + r/100) ^ (days_per_year / days) - 1) * 100`
pub fn annualize_return(return_pct: f64, days: f64, days_per_year: f64) -> Option<f64> {
    if days <= 0.0 || days_per_year <= 0.0 {
        return None;
    }

    let growth = 1.0 + (return_pct / 100.0);
    if growth < 0.0 {
        return None;
    }

    finite((growth.powf(days_per_year / days) - 1.0) * 100.0)
}

/// Elapsed days between two timestamps, including fractions of a day.
pub fn elapsed_days(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / SECONDS_PER_DAY
}
