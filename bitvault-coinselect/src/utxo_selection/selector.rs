//! Coin selection orchestrator
//!
//! The `CoinSelector` is the entry point for coin selection. It prepares the
//! candidate pool, runs every strategy against it and returns the result with
//! the lowest waste.
//!
//! # Pipeline
//!
//! 1. Validate the options
//! 2. Drop UTXOs that are empty, cost more to spend than they are worth, or
//!    have too few confirmations
//! 3. Order the pool (deepest confirmations first when `prefer_confirmed` is
//!    set, otherwise largest amount first)
//! 4. Fail with `InsufficientFunds` if the whole pool cannot pay the target
//!    plus its fee
//! 5. Keep at most `max_inputs` candidates
//! 6. Run Branch-and-Bound, Single Random Draw and Largest-First
//! 7. Return the lowest-waste feasible result, or `NoValidSelection`
//!
//! # Usage
//!
//! ```
//! use bitvault_coinselect::utxo_selection::selector::CoinSelector;
//! use bitvault_coinselect::utxo_selection::types::{Utxo, SelectionOptions};
//! use bitcoin::{Amount, OutPoint, Txid};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::str::FromStr;
//!
//! let txid = Txid::from_str("7967a5185e907a25225574544c31f7b059c1a191d65b53dcc1554d339c4f9efc").unwrap();
//! let utxos = vec![
//!     Utxo::new(OutPoint::new(txid, 0), Amount::from_sat(50_000), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(), 6),
//!     Utxo::new(OutPoint::new(txid, 1), Amount::from_sat(30_000), "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(), 6),
//! ];
//!
//! let selector = CoinSelector::new();
//! let options = SelectionOptions::new(Amount::from_sat(40_000), 1.0);
//! let mut rng = StdRng::seed_from_u64(1);
//!
//! let result = selector.select_coins_with_rng(&utxos, &options, &mut rng).unwrap();
//! assert!(result.total_input >= options.target + result.fee);
//! ```
//!
//! The selector holds no mutable state; one instance can serve concurrent
//! callers.

use bitcoin::Amount;
use log::{debug, info, warn};
use rand::RngCore;

use crate::error::{CoinSelectionError, SelectionResult};
use crate::logging::sanitize_for_logging;
use crate::math;
use crate::utxo_selection::strategies::{
    base, utils, BranchAndBoundStrategy, LargestFirstStrategy, SingleRandomDrawStrategy, Strategy,
};
use crate::utxo_selection::types::{CoinSelectionResult, SelectionOptions, Utxo};

/// Coin selector running every strategy and keeping the least wasteful result
///
/// # Design Pattern
///
/// The `CoinSelector` is the context of a Strategy pattern: each algorithm
/// implements [`Strategy`] and the selector ranks their outputs.
pub struct CoinSelector {
    /// Strategies in the order they run; ties in waste go to the earlier one
    strategies: Vec<Box<dyn Strategy>>,
}

impl Default for CoinSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinSelector {
    /// Create a selector running Branch-and-Bound, Single Random Draw and
    /// Largest-First, in that order
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(BranchAndBoundStrategy::new()),
                Box::new(SingleRandomDrawStrategy::new()),
                Box::new(LargestFirstStrategy::new()),
            ],
        }
    }

    /// Create a selector with a custom strategy list
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies this selector runs
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Select coins using the thread-local random generator
    pub fn select_coins(&self, utxos: &[Utxo], options: &SelectionOptions) -> SelectionResult<CoinSelectionResult> {
        let mut rng = rand::rng();
        self.select_coins_with_rng(utxos, options, &mut rng)
    }

    /// Select coins using the supplied random source
    ///
    /// # Arguments
    ///
    /// * `utxos` - UTXOs offered for spending
    /// * `options` - Target, fee rate and policy for this call
    /// * `rng` - Random source for the single random draw
    ///
    /// # Returns
    ///
    /// * The lowest-waste feasible selection, or the reason none exists
    pub fn select_coins_with_rng(
        &self,
        utxos: &[Utxo],
        options: &SelectionOptions,
        rng: &mut dyn RngCore,
    ) -> SelectionResult<CoinSelectionResult> {
        validate_options(options)?;

        debug!(
            "Selecting coins: target={} sats, fee_rate={} sat/vB, utxo_count={}",
            options.target.to_sat(),
            options.fee_rate,
            utxos.len()
        );

        let pool = self.candidate_pool(utxos, options);

        let available = math::total_amount(&pool);
        let pool_fee = math::estimate_fee(&pool, false, options.fee_rate);
        // A fee too large to add means no pool could ever pay it
        let required = options
            .target
            .checked_add(pool_fee)
            .unwrap_or_else(Amount::max_value);
        if available < required {
            warn!(
                "Insufficient funds: required {} sats, available {} sats",
                required.to_sat(),
                available.to_sat()
            );
            return Err(CoinSelectionError::InsufficientFunds { required, available });
        }

        let candidates = &pool[..pool.len().min(options.max_inputs)];
        if candidates.len() < pool.len() {
            debug!(
                "Truncated candidate pool from {} to {} UTXOs",
                pool.len(),
                candidates.len()
            );
        }

        let mut results = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            match strategy.select(candidates, options, rng) {
                Some(result) if base::is_feasible(&result, options) => {
                    debug!(
                        "{} selected {} inputs (waste={}, fee={} sats)",
                        strategy.name(),
                        result.input_count(),
                        result.waste,
                        result.fee.to_sat()
                    );
                    results.push(result);
                }
                Some(result) => {
                    warn!(
                        "{} returned an infeasible selection of {} inputs, discarding it",
                        strategy.name(),
                        result.input_count()
                    );
                }
                None => debug!("{} found no selection", strategy.name()),
            }
        }

        // min_by_key keeps the first of equal elements, so earlier strategies win ties
        let best = results
            .into_iter()
            .min_by_key(|result| result.waste)
            .ok_or_else(|| {
                warn!(
                    "No valid coin selection among {} candidates",
                    candidates.len()
                );
                CoinSelectionError::NoValidSelection
            })?;

        info!(
            "Coin selection by {}: {} inputs, total={} sats, fee={} sats, change={} sats, waste={}",
            best.algorithm,
            best.input_count(),
            best.total_input.to_sat(),
            best.fee.to_sat(),
            best.change.to_sat(),
            best.waste
        );
        for utxo in &best.selected {
            debug!(
                "Selected {} ({} sats, {})",
                sanitize_for_logging(&utxo.id()),
                utxo.amount.to_sat(),
                utxo.script_type()
            );
        }

        Ok(best)
    }

    /// Filter and order the UTXOs the strategies may choose from
    ///
    /// The returned pool is not yet truncated to `max_inputs`.
    pub fn candidate_pool(&self, utxos: &[Utxo], options: &SelectionOptions) -> Vec<Utxo> {
        for utxo in utxos.iter().filter(|utxo| utxo.amount > Amount::MAX_MONEY) {
            warn!(
                "Ignoring UTXO {} with {} sats, above the 21M BTC supply cap",
                sanitize_for_logging(&utxo.id()),
                utxo.amount.to_sat()
            );
        }

        let usable: Vec<Utxo> = utxos
            .iter()
            .filter(|utxo| utxo.confirmations >= options.min_confirmations)
            .filter(|utxo| math::is_spendable(utxo, options.fee_rate))
            .cloned()
            .collect();

        if usable.len() < utxos.len() {
            debug!(
                "Filtered out {} of {} UTXOs",
                utxos.len() - usable.len(),
                utxos.len()
            );
        }

        if options.prefer_confirmed {
            utils::sort_by_confirmations(&usable)
        } else {
            utils::sort_by_amount(&usable)
        }
    }
}

/// Select coins with the default selector
pub fn select_coins(utxos: &[Utxo], options: &SelectionOptions) -> SelectionResult<CoinSelectionResult> {
    CoinSelector::new().select_coins(utxos, options)
}

/// Reject options no selection could satisfy meaningfully
pub fn validate_options(options: &SelectionOptions) -> SelectionResult<()> {
    if options.target == Amount::ZERO {
        return Err(CoinSelectionError::invalid_options("target amount must be greater than zero"));
    }

    if options.target > Amount::MAX_MONEY {
        return Err(CoinSelectionError::invalid_options(format!(
            "target amount of {} sats exceeds the 21M BTC supply cap",
            options.target.to_sat()
        )));
    }

    if !options.fee_rate.is_finite() || options.fee_rate <= 0.0 {
        return Err(CoinSelectionError::invalid_options(format!(
            "fee rate must be a positive number, got {}",
            options.fee_rate
        )));
    }

    if options.max_inputs == 0 {
        return Err(CoinSelectionError::invalid_options("max_inputs must be greater than zero"));
    }

    if options.max_bnb_iterations == 0 {
        return Err(CoinSelectionError::invalid_options(
            "max_bnb_iterations must be greater than zero",
        ));
    }

    Ok(())
}
