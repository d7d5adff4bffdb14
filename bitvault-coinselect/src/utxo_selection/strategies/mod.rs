//! UTXO selection strategies
//!
//! This module defines the coin selection algorithms run by the
//! [`CoinSelector`](crate::utxo_selection::selector::CoinSelector). Each one
//! implements the [`Strategy`] trait and receives a pool that has already been
//! filtered to economically spendable UTXOs.

use rand::RngCore;

use crate::utxo_selection::types::{CoinSelectionResult, SelectionAlgorithm, SelectionOptions, Utxo};

pub mod base;
pub mod branch_and_bound;
pub mod largest_first;
pub mod single_random_draw;
pub mod utils;

// Re-export implementations
pub use branch_and_bound::BranchAndBoundStrategy;
pub use largest_first::LargestFirstStrategy;
pub use single_random_draw::SingleRandomDrawStrategy;

/// Trait defining a UTXO selection strategy
///
/// Any struct implementing this trait can be run by the selector.
pub trait Strategy: Send + Sync {
    /// Name of this strategy
    fn name(&self) -> &'static str;

    /// Tag attached to the results of this strategy
    fn algorithm(&self) -> SelectionAlgorithm;

    /// Select UTXOs using this strategy
    ///
    /// # Arguments
    /// * `utxos` - Candidate UTXOs, all with positive effective value
    /// * `options` - Target, fee rate and policy for this call
    /// * `rng` - Random source for strategies that need one
    ///
    /// # Returns
    /// * A feasible selection, or `None` if this strategy found nothing
    fn select(
        &self,
        utxos: &[Utxo],
        options: &SelectionOptions,
        rng: &mut dyn RngCore,
    ) -> Option<CoinSelectionResult>;
}
