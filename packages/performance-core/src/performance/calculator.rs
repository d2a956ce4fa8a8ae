//! Performance calculator: summary metrics and projections for a balance history.

use super::returns::{
    annualize_return, daily_returns, elapsed_days, holding_period_return, time_weighted_return,
};
use super::risk::{max_drawdown, mean, sharpe_ratio, volatility};
use crate::config::CalculatorConfig;
use crate::history::validate_history;
use crate::types::{BalanceObservation, PerformanceMetrics, ProjectionPoint};
use crate::{Error, Result};
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Computes return/risk metrics and projections from balance histories.
///
/// All operations are pure: they validate their input and never mutate or
/// reorder it. Randomness for projections is supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct PerformanceCalculator {
    config: CalculatorConfig,
}

impl PerformanceCalculator {
    /// Create a calculator with the given configuration.
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get the active configuration.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Daily returns for a history, empty with fewer than two observations.
    pub fn compute_daily_returns(&self, observations: &[BalanceObservation]) -> Result<Vec<f64>> {
        validate_history(observations)?;
        Ok(daily_returns(observations, self.config.cash_flow_policy))
    }

    /// Compute summary metrics for a history.
    ///
    /// With fewer than two observations every metric is `None`.
    pub fn compute_metrics(&self, observations: &[BalanceObservation]) -> Result<PerformanceMetrics> {
        validate_history(observations)?;

        let (first, last) = match observations {
            [first, .., last] => (first, last),
            _ => return Ok(PerformanceMetrics::undefined()),
        };

        let days = elapsed_days(first.timestamp, last.timestamp);
        let returns = daily_returns(observations, self.config.cash_flow_policy);

        let total_return_pct = holding_period_return(first.balance, last.balance);
        let annualized_return_pct = total_return_pct
            .and_then(|total| annualize_return(total, days, f64::from(self.config.days_per_year)));
        let volatility_pct = volatility(&returns, self.config.days_per_year);
        let sharpe = match (annualized_return_pct, volatility_pct) {
            (Some(annualized), Some(vol)) => {
                sharpe_ratio(annualized, self.config.risk_free_rate_pct, vol)
            }
            _ => None,
        };

        let balances: Vec<f64> = observations.iter().map(|o| o.balance).collect();
        let net_external_flows = observations[1..].iter().map(|o| o.flow()).sum::<f64>();

        let metrics = PerformanceMetrics {
            total_return_pct,
            annualized_return_pct,
            time_weighted_return_pct: time_weighted_return(&returns),
            volatility_pct,
            sharpe_ratio: sharpe,
            max_drawdown_pct: max_drawdown(&balances),
            current_balance: Some(last.balance),
            total_earnings: Some(last.balance - first.balance),
            net_external_flows: Some(net_external_flows),
            investment_period_days: Some((last.timestamp - first.timestamp).num_days()),
        };

        tracing::debug!(
            observations = observations.len(),
            returns = returns.len(),
            total_return_pct = ?metrics.total_return_pct,
            volatility_pct = ?metrics.volatility_pct,
            "computed performance metrics"
        );

        Ok(metrics)
    }

    /// Project the balance forward from the last observation.
    ///
    /// Averages the most recent `lookback_days` daily returns (all of them if
    /// fewer are available) and compounds that rate one calendar day at a
    /// time for `horizon_days`, adding uniform noise within the configured
    /// jitter at each step. The result is an illustration for charts, not a
    /// forecast. Empty with fewer than two observations.
    pub fn compute_projection<R: Rng>(
        &self,
        observations: &[BalanceObservation],
        horizon_days: u32,
        lookback_days: u32,
        rng: &mut R,
    ) -> Result<Vec<ProjectionPoint>> {
        validate_history(observations)?;

        if lookback_days == 0 {
            return Err(Error::InvalidParameter(
                "lookback_days must be positive".to_string(),
            ));
        }

        let Some(last) = observations.last() else {
            return Ok(Vec::new());
        };
        if observations.len() < 2 || horizon_days == 0 {
            return Ok(Vec::new());
        }

        let returns = daily_returns(observations, self.config.cash_flow_policy);
        let start = returns.len().saturating_sub(lookback_days as usize);
        let Some(avg_return) = mean(&returns[start..]) else {
            tracing::debug!("no computable daily returns, skipping projection");
            return Ok(Vec::new());
        };

        let jitter = self.config.projection_jitter;
        let mut balance = last.balance;

        let projection = (1..=horizon_days)
            .map(|day| {
                let noise = if jitter > 0.0 {
                    rng.random_range(-jitter..=jitter)
                } else {
                    0.0
                };
                balance = (balance * (1.0 + avg_return + noise)).max(0.0);

                ProjectionPoint {
                    date: last.timestamp + Duration::days(i64::from(day)),
                    projected_balance: balance,
                }
            })
            .collect();

        Ok(projection)
    }

    /// [`Self::compute_projection`] with a seeded generator, for reproducible output.
    pub fn compute_projection_seeded(
        &self,
        observations: &[BalanceObservation],
        horizon_days: u32,
        lookback_days: u32,
        seed: u64,
    ) -> Result<Vec<ProjectionPoint>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.compute_projection(observations, horizon_days, lookback_days, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CashFlowPolicy;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::{TimeZone, Utc};

    fn series(balances: &[f64]) -> Vec<BalanceObservation> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        balances
            .iter()
            .enumerate()
            .map(|(i, &b)| BalanceObservation::new(start + Duration::days(i as i64), b))
            .collect()
    }

    fn compounding(start: f64, rate: f64, days: usize) -> Vec<f64> {
        (0..=days).map(|i| start * (1.0 + rate).powi(i as i32)).collect()
    }

    fn calculator_without_jitter() -> PerformanceCalculator {
        PerformanceCalculator::new(CalculatorConfig {
            projection_jitter: 0.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_one_year_example() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let history = vec![
            BalanceObservation::new(start, 1000.0),
            BalanceObservation::new(start + Duration::days(365), 1200.0),
        ];

        let metrics = PerformanceCalculator::default().compute_metrics(&history).unwrap();

        assert_abs_diff_eq!(metrics.total_return_pct.unwrap(), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(metrics.annualized_return_pct.unwrap(), 20.0, epsilon = 1e-9);
        assert_eq!(metrics.total_earnings, Some(200.0));
        assert_eq!(metrics.current_balance, Some(1200.0));
        assert_eq!(metrics.investment_period_days, Some(365));
        // A single daily return has no measurable spread
        assert!(metrics.volatility_pct.is_none());
        assert!(metrics.sharpe_ratio.is_none());
        assert!(crate::analyze_risk_profile(&metrics).is_none());
    }

    #[test]
    fn test_flat_series() {
        let history = series(&[1000.0; 30]);
        let metrics = PerformanceCalculator::default().compute_metrics(&history).unwrap();

        assert_eq!(metrics.total_return_pct, Some(0.0));
        assert_eq!(metrics.annualized_return_pct, Some(0.0));
        assert_eq!(metrics.volatility_pct, Some(0.0));
        assert!(metrics.sharpe_ratio.is_none());
        assert_eq!(metrics.max_drawdown_pct, Some(0.0));
        assert_eq!(metrics.total_earnings, Some(0.0));
    }

    #[test]
    fn test_constant_daily_return() {
        let rate = 0.002;
        let days = 120;
        let history = series(&compounding(1000.0, rate, days));

        let metrics = PerformanceCalculator::default().compute_metrics(&history).unwrap();
        let expected = ((1.0 + rate).powi(days as i32) - 1.0) * 100.0;

        assert_relative_eq!(metrics.total_return_pct.unwrap(), expected, max_relative = 1e-9);
        assert_relative_eq!(
            metrics.time_weighted_return_pct.unwrap(),
            expected,
            max_relative = 1e-9
        );
        assert_eq!(metrics.volatility_pct, Some(0.0));
    }

    #[test]
    fn test_single_observation_is_undefined() {
        let metrics = PerformanceCalculator::default()
            .compute_metrics(&series(&[1000.0]))
            .unwrap();
        assert_eq!(metrics, PerformanceMetrics::undefined());

        let metrics = PerformanceCalculator::default().compute_metrics(&[]).unwrap();
        assert!(!metrics.is_defined());
    }

    #[test]
    fn test_same_day_observations() {
        let mut history = series(&[1000.0, 1010.0]);
        history[1].timestamp = history[0].timestamp;

        let metrics = PerformanceCalculator::default().compute_metrics(&history).unwrap();
        assert!(metrics.total_return_pct.is_some());
        assert!(metrics.annualized_return_pct.is_none());
        assert!(metrics.volatility_pct.is_none());
        assert!(metrics.sharpe_ratio.is_none());
        assert_eq!(metrics.investment_period_days, Some(0));
    }

    #[test]
    fn test_zero_starting_balance() {
        let metrics = PerformanceCalculator::default()
            .compute_metrics(&series(&[0.0, 500.0, 550.0]))
            .unwrap();

        assert!(metrics.total_return_pct.is_none());
        assert!(metrics.annualized_return_pct.is_none());
        assert_eq!(metrics.total_earnings, Some(550.0));
        // Only 500 -> 550 is a computable daily return
        assert_abs_diff_eq!(
            metrics.time_weighted_return_pct.unwrap(),
            10.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_metrics_never_leak_nan() {
        let metrics = PerformanceCalculator::default()
            .compute_metrics(&series(&[0.0, 0.0, 0.0]))
            .unwrap();

        assert!(metrics.total_return_pct.is_none());
        assert!(metrics.volatility_pct.is_none());
        assert!(metrics.sharpe_ratio.is_none());
        assert!(metrics.time_weighted_return_pct.is_none());
    }

    #[test]
    fn test_malformed_input_rejected() {
        let calculator = PerformanceCalculator::default();
        let history = series(&[1000.0, -1.0]);

        assert!(matches!(
            calculator.compute_metrics(&history),
            Err(Error::InvalidObservation { index: 1, field: "balance", .. })
        ));
        assert!(calculator.compute_daily_returns(&history).is_err());
        assert!(calculator.compute_projection_seeded(&history, 10, 30, 1).is_err());
    }

    #[test]
    fn test_deposit_excluded_from_volatility() {
        let mut history = series(&compounding(1000.0, 0.001, 10));
        // 500 deposited on day 5, growing at the same rate afterwards
        for (day, obs) in history.iter_mut().enumerate().skip(5) {
            obs.balance += 500.0 * 1.001_f64.powi(day as i32 - 5);
        }
        history[5].external_flow = Some(500.0);

        let time_weighted = PerformanceCalculator::default().compute_metrics(&history).unwrap();
        assert_eq!(time_weighted.volatility_pct, Some(0.0));
        assert_eq!(time_weighted.net_external_flows, Some(500.0));

        let raw = PerformanceCalculator::new(CalculatorConfig {
            cash_flow_policy: CashFlowPolicy::Raw,
            ..Default::default()
        })
        .unwrap()
        .compute_metrics(&history)
        .unwrap();
        assert!(raw.volatility_pct.unwrap() > 1.0);
    }

    #[test]
    fn test_sharpe_uses_risk_free_rate() {
        let history = series(&[1000.0, 1010.0, 1005.0, 1020.0, 1030.0, 1025.0]);
        let calculator = PerformanceCalculator::default();
        let metrics = calculator.compute_metrics(&history).unwrap();

        let expected =
            (metrics.annualized_return_pct.unwrap() - 2.0) / metrics.volatility_pct.unwrap();
        assert_abs_diff_eq!(metrics.sharpe_ratio.unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_without_jitter() {
        let history = series(&compounding(1000.0, 0.001, 40));
        let last = history.last().unwrap().clone();

        let projection = calculator_without_jitter()
            .compute_projection_seeded(&history, 90, 30, 7)
            .unwrap();

        assert_eq!(projection.len(), 90);
        assert_eq!(projection[0].date, last.timestamp + Duration::days(1));
        assert_eq!(projection[89].date, last.timestamp + Duration::days(90));
        assert_relative_eq!(
            projection[89].projected_balance,
            last.balance * 1.001_f64.powi(90),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_projection_lookback_longer_than_history() {
        let history = series(&[1000.0, 1010.0, 1030.2]);
        let calculator = calculator_without_jitter();

        let projection = calculator.compute_projection_seeded(&history, 1, 365, 0).unwrap();
        let returns = calculator.compute_daily_returns(&history).unwrap();
        let avg = (returns[0] + returns[1]) / 2.0;

        assert_eq!(projection.len(), 1);
        assert_relative_eq!(
            projection[0].projected_balance,
            1030.2 * (1.0 + avg),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_projection_uses_recent_returns_only() {
        // Early growth then flat: a 5-day lookback only sees the flat part
        let mut balances = compounding(1000.0, 0.01, 20);
        let last = *balances.last().unwrap();
        balances.extend(std::iter::repeat(last).take(10));
        let history = series(&balances);

        let projection = calculator_without_jitter()
            .compute_projection_seeded(&history, 5, 5, 0)
            .unwrap();
        assert_abs_diff_eq!(projection[4].projected_balance, last, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_seeded_is_reproducible() {
        let history = series(&compounding(1000.0, 0.002, 60));
        let calculator = PerformanceCalculator::default();

        let first = calculator.compute_projection_seeded(&history, 90, 30, 42).unwrap();
        let second = calculator.compute_projection_seeded(&history, 90, 30, 42).unwrap();
        assert_eq!(first, second);

        let other = calculator.compute_projection_seeded(&history, 90, 30, 43).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_projection_jitter_is_bounded() {
        let rate = 0.002;
        let history = series(&compounding(1000.0, rate, 60));
        let calculator = PerformanceCalculator::default();
        let jitter = calculator.config().projection_jitter;

        let projection = calculator.compute_projection_seeded(&history, 200, 30, 9).unwrap();
        let mut prev = history.last().unwrap().balance;
        for point in &projection {
            let step = point.projected_balance / prev - 1.0;
            assert!(step >= rate - jitter - 1e-9, "step {} below bound", step);
            assert!(step <= rate + jitter + 1e-9, "step {} above bound", step);
            prev = point.projected_balance;
        }
    }

    #[test]
    fn test_projection_continues_history() {
        let history = series(&compounding(1000.0, 0.003, 45));
        let calculator = calculator_without_jitter();
        let projection = calculator.compute_projection_seeded(&history, 30, 30, 0).unwrap();

        let mut extended = history.clone();
        extended.extend(
            projection
                .iter()
                .map(|p| BalanceObservation::new(p.date, p.projected_balance)),
        );

        // Every daily return across the boundary matches the historical trend
        let returns = calculator.compute_daily_returns(&extended).unwrap();
        for r in &returns {
            assert_abs_diff_eq!(*r, 0.003, epsilon = 1e-9);
        }

        let metrics = calculator.compute_metrics(&extended).unwrap();
        let expected = (1.003_f64.powi(75) - 1.0) * 100.0;
        assert_relative_eq!(metrics.total_return_pct.unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_projection_edge_cases() {
        let calculator = PerformanceCalculator::default();

        assert!(calculator
            .compute_projection_seeded(&series(&[1000.0]), 90, 30, 0)
            .unwrap()
            .is_empty());
        assert!(calculator
            .compute_projection_seeded(&series(&[1000.0, 1001.0]), 0, 30, 0)
            .unwrap()
            .is_empty());
        assert!(matches!(
            calculator.compute_projection_seeded(&series(&[1000.0, 1001.0]), 90, 0, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_projection_never_negative() {
        let history = series(&[1000.0, 10.0]);
        let projection = PerformanceCalculator::default()
            .compute_projection_seeded(&history, 30, 30, 3)
            .unwrap();
        assert!(projection.iter().all(|p| p.projected_balance >= 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = PerformanceCalculator::new(CalculatorConfig {
            lookback_days: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
