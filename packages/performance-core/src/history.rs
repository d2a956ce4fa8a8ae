//! Balance history validation.
//!
//! Input is rejected, never repaired: the first offending observation is
//! reported by index and field.

use crate::types::BalanceObservation;
use crate::{Error, Result};

/// Check that a history is chronological with finite, non-negative balances.
///
/// Equal consecutive timestamps are allowed.
pub fn validate_history(observations: &[BalanceObservation]) -> Result<()> {
    for (index, obs) in observations.iter().enumerate() {
        validate_observation(index, obs)?;

        if index > 0 && obs.timestamp < observations[index - 1].timestamp {
            return Err(Error::InvalidObservation {
                index,
                field: "timestamp",
                reason: format!(
                    "{} is earlier than the previous observation ({})",
                    obs.timestamp,
                    observations[index - 1].timestamp
                ),
            });
        }
    }

    Ok(())
}

/// Check a single observation's numeric fields.
pub(crate) fn validate_observation(index: usize, obs: &BalanceObservation) -> Result<()> {
    if !obs.balance.is_finite() {
        return Err(Error::InvalidObservation {
            index,
            field: "balance",
            reason: "must be a finite number".to_string(),
        });
    }

    if obs.balance < 0.0 {
        return Err(Error::InvalidObservation {
            index,
            field: "balance",
            reason: format!("must not be negative (got {})", obs.balance),
        });
    }

    if let Some(flow) = obs.external_flow {
        if !flow.is_finite() {
            return Err(Error::InvalidObservation {
                index,
                field: "external_flow",
                reason: "must be a finite number".to_string(),
            });
        }

        // The balance already includes the flow, so it cannot undercut it
        if obs.balance - flow < 0.0 {
            return Err(Error::InvalidObservation {
                index,
                field: "external_flow",
                reason: format!(
                    "{} exceeds the balance it is included in ({})",
                    flow, obs.balance
                ),
            });
        }
    }

    Ok(())
}
