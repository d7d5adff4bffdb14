//! Error types for coin selection
//!
//! Selection failures are reported synchronously and never retried inside the
//! engine. The two fatal conditions are kept distinct because the caller's
//! remedy differs: `InsufficientFunds` means the wallet needs more money,
//! `NoValidSelection` means the constraints (usually `max_inputs`) need to be
//! relaxed.
//!
//! A Branch-and-Bound search running out of iterations is not an error and
//! never surfaces here.

use bitcoin::Amount;
use thiserror::Error;

/// Errors returned by the coin selection orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinSelectionError {
    /// The filtered pool cannot pay for the target plus the estimated fee
    #[error("Insufficient funds: needed {} sats, available {} sats", required.to_sat(), available.to_sat())]
    InsufficientFunds {
        /// Target amount plus the estimated fee for spending the whole pool
        required: Amount,
        /// Total value of the economically spendable UTXOs
        available: Amount,
    },

    /// Funds are sufficient in aggregate but no algorithm found a feasible subset
    #[error("No valid coin selection found")]
    NoValidSelection,

    /// The selection options were rejected before any selection ran
    #[error("Invalid selection options: {0}")]
    InvalidOptions(String),
}

impl CoinSelectionError {
    /// Create a new invalid options error
    pub fn invalid_options<S: Into<String>>(message: S) -> Self {
        CoinSelectionError::InvalidOptions(message.into())
    }

    /// Whether adding funds to the wallet could resolve this error
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(self, CoinSelectionError::InsufficientFunds { .. })
    }
}

/// Type alias for a Result with CoinSelectionError
pub type SelectionResult<T> = Result<T, CoinSelectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message_reports_both_amounts() {
        let err = CoinSelectionError::InsufficientFunds {
            required: Amount::from_sat(100_109),
            available: Amount::from_sat(5_000),
        };

        assert_eq!(
            err.to_string(),
            "Insufficient funds: needed 100109 sats, available 5000 sats"
        );
        assert!(err.is_insufficient_funds());
    }

    #[test]
    fn test_no_valid_selection_is_distinct() {
        let err = CoinSelectionError::NoValidSelection;
        assert!(!err.is_insufficient_funds());
        assert_eq!(err.to_string(), "No valid coin selection found");
    }
}
