//! Base utilities for UTXO selection strategies
//!
//! Every strategy turns its chosen inputs into a [`CoinSelectionResult`]
//! through [`settle`], so fee and change are computed the same way no matter
//! which algorithm picked the inputs.

use bitcoin::Amount;

use crate::math;
use crate::utxo_selection::types::{CoinSelectionResult, SelectionAlgorithm, SelectionOptions, Utxo};

/// Compute the final fee and change of a selection
///
/// The fee assumes a change output. When the selection cannot pay for that
/// output, or the change would fall below `min_change`, the change output is
/// dropped and everything above the target goes to the fee.
///
/// Returns `None` if the inputs do not cover the target plus the fee of a
/// transaction without change.
pub fn settle(
    selected: Vec<Utxo>,
    options: &SelectionOptions,
    algorithm: SelectionAlgorithm,
    waste: u64,
) -> Option<CoinSelectionResult> {
    let total_input = math::total_amount(&selected);
    let available = total_input.checked_sub(options.target)?;
    if available < math::estimate_fee(&selected, false, options.fee_rate) {
        return None;
    }

    let fee_with_change = math::estimate_fee(&selected, true, options.fee_rate);

    let (fee, change) = match available.checked_sub(fee_with_change) {
        Some(change) if change.to_sat() >= options.min_change && change > Amount::ZERO => {
            (fee_with_change, change)
        }
        _ => (available, Amount::ZERO),
    };

    Some(CoinSelectionResult {
        selected,
        total_input,
        change,
        fee,
        algorithm,
        waste,
    })
}

/// Check the feasibility invariant of a result
///
/// A feasible result pays the target and its fee, and pays at least the
/// fee of a transaction without change.
pub fn is_feasible(result: &CoinSelectionResult, options: &SelectionOptions) -> bool {
    let min_fee = math::estimate_fee(&result.selected, false, options.fee_rate);

    !result.selected.is_empty()
        && result.fee >= min_fee
        && result.total_input == math::total_amount(&result.selected)
        && options
            .target
            .checked_add(result.fee)
            .and_then(|needed| needed.checked_add(result.change))
            .map_or(false, |needed| needed <= result.total_input)
}
