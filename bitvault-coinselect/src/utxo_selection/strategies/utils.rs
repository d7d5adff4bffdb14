//! Utility functions for UTXO selection
//!
//! Sorting helpers shared by the strategies and the selector. All sorts are
//! stable, so UTXOs that compare equal keep the caller's order.

use crate::math;
use crate::utxo_selection::types::Utxo;

/// Sort UTXOs by effective value in descending order
pub fn sort_by_effective_value(utxos: &[Utxo], fee_rate: f32) -> Vec<Utxo> {
    let mut sorted = utxos.to_vec();
    sorted.sort_by_cached_key(|utxo| std::cmp::Reverse(math::effective_value(utxo, fee_rate)));
    sorted
}

/// Sort UTXOs by amount in descending order
pub fn sort_by_amount(utxos: &[Utxo]) -> Vec<Utxo> {
    let mut sorted = utxos.to_vec();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    sorted
}

/// Sort UTXOs by confirmation count in descending order (oldest first)
///
/// Equal confirmation counts are broken by amount, largest first.
pub fn sort_by_confirmations(utxos: &[Utxo]) -> Vec<Utxo> {
    let mut sorted = utxos.to_vec();
    sorted.sort_by(|a, b| {
        b.confirmations
            .cmp(&a.confirmations)
            .then_with(|| b.amount.cmp(&a.amount))
    });
    sorted
}
