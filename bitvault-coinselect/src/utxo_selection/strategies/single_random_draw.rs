//! SingleRandomDraw UTXO selection strategy
//!
//! Shuffles the pool and takes UTXOs in that order until they pay for the
//! target and a transaction with change. The result is not waste-optimal;
//! the point is that repeated payments do not spend coins in a predictable,
//! fingerprintable order.
//!
//! The random source is supplied by the caller so a seeded generator gives
//! reproducible selections.

use log::debug;
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::math;
use crate::utxo_selection::strategies::{base, Strategy};
use crate::utxo_selection::types::{CoinSelectionResult, SelectionAlgorithm, SelectionOptions, Utxo};

/// Strategy drawing UTXOs in random order
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleRandomDrawStrategy;

impl SingleRandomDrawStrategy {
    /// Create a new SingleRandomDrawStrategy
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SingleRandomDrawStrategy {
    fn name(&self) -> &'static str {
        "SingleRandomDraw"
    }

    fn algorithm(&self) -> SelectionAlgorithm {
        SelectionAlgorithm::SingleRandomDraw
    }

    fn select(
        &self,
        utxos: &[Utxo],
        options: &SelectionOptions,
        rng: &mut dyn RngCore,
    ) -> Option<CoinSelectionResult> {
        let mut shuffled = utxos.to_vec();
        shuffled.shuffle(rng);

        let mut selected = Vec::new();
        for utxo in shuffled {
            selected.push(utxo);

            let fee = math::estimate_fee(&selected, true, options.fee_rate);
            let covered = options
                .target
                .checked_add(fee)
                .map_or(false, |needed| math::total_amount(&selected) >= needed);
            if covered {
                let waste = math::waste(&selected, options.target, options.fee_rate, options.cost_of_change)?;
                return base::settle(selected, options, self.algorithm(), waste);
            }
        }

        debug!("Single random draw exhausted {} UTXOs without covering the target", utxos.len());
        None
    }
}
