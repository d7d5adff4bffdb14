//! Size, fee and waste calculations for coin selection
//!
//! Sizes are virtual bytes. Fees are computed in `rust_decimal` arithmetic
//! and rounded up to whole satoshis, so a fee never undershoots the rate it
//! was asked for.
//!
//! Example:
//! ```
//! use bitvault_coinselect::math;
//! use bitvault_coinselect::utxo_selection::types::ScriptType;
//!
//! assert_eq!(math::get_input_size(ScriptType::NativeSegwit), 68);
//! assert_eq!(math::calculate_fee(141, 2.0).to_sat(), 282);
//! ```

use bitcoin::Amount;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::utxo_selection::types::{ScriptType, Utxo};

/// Fixed transaction overhead (version, locktime, counts, segwit marker)
pub const TX_OVERHEAD_VBYTES: usize = 10;

/// Size of the payment output
pub const PAYMENT_OUTPUT_VBYTES: usize = 31;

/// Size of the change output
pub const CHANGE_OUTPUT_VBYTES: usize = 31;

/// Gets approximate input size for a script type
///
/// # Returns
/// The typical size in vbytes for spending an input of the given type
pub fn get_input_size(script_type: ScriptType) -> usize {
    match script_type {
        ScriptType::NativeSegwit => 68,
        ScriptType::NestedSegwit => 91,
        ScriptType::Legacy => 148,
    }
}

/// Size in vbytes of spending this UTXO
pub fn input_size(utxo: &Utxo) -> usize {
    get_input_size(utxo.script_type())
}

/// Calculates the fee for a given size and fee rate
///
/// # Arguments
/// * `vsize` - The size of the transaction in vbytes
/// * `fee_rate` - The fee rate in satoshis per vbyte
///
/// # Returns
/// The fee rounded up to a whole satoshi
pub fn calculate_fee(vsize: usize, fee_rate: f32) -> Amount {
    // NaN and non-positive rates are rejected upstream; treat them as free here
    if fee_rate.is_nan() || fee_rate <= 0.0 {
        return Amount::ZERO;
    }

    // Fees too large for a u64 saturate
    let fee = Decimal::from_f32(fee_rate)
        .and_then(|rate| rate.checked_mul(Decimal::from(vsize)))
        .and_then(|fee| fee.ceil().to_u64());

    Amount::from_sat(fee.unwrap_or(u64::MAX))
}

/// Estimates the size of a transaction spending `inputs`
///
/// One payment output is always counted; the change output only when
/// `include_change` is set.
pub fn estimate_tx_vsize(inputs: &[Utxo], include_change: bool) -> usize {
    let inputs_size: usize = inputs.iter().map(input_size).sum();
    let change_size = if include_change { CHANGE_OUTPUT_VBYTES } else { 0 };

    TX_OVERHEAD_VBYTES + inputs_size + PAYMENT_OUTPUT_VBYTES + change_size
}

/// Estimates the fee of a transaction spending `inputs`
pub fn estimate_fee(inputs: &[Utxo], include_change: bool, fee_rate: f32) -> Amount {
    calculate_fee(estimate_tx_vsize(inputs, include_change), fee_rate)
}

/// Computes the effective value of a UTXO after accounting for the fee to spend it
///
/// # Returns
/// The effective value in satoshis (negative when the UTXO costs more to
/// spend than it is worth)
pub fn effective_value(utxo: &Utxo, fee_rate: f32) -> i64 {
    let amount = saturating_i64(utxo.amount.to_sat());
    let input_fee = saturating_i64(calculate_fee(input_size(utxo), fee_rate).to_sat());
    amount.saturating_sub(input_fee)
}

/// Whether a UTXO is worth spending at this fee rate
///
/// Amounts above the 21M BTC supply cap can never be valid outputs and are
/// not spendable either.
pub fn is_spendable(utxo: &Utxo, fee_rate: f32) -> bool {
    utxo.amount > Amount::ZERO
        && utxo.amount <= Amount::MAX_MONEY
        && effective_value(utxo, fee_rate) > 0
}

/// Convert satoshis to a signed value, clamping at `i64::MAX`
pub fn saturating_i64(sats: u64) -> i64 {
    i64::try_from(sats).unwrap_or(i64::MAX)
}

/// Total value of a set of UTXOs
pub fn total_amount(utxos: &[Utxo]) -> Amount {
    utxos.iter().map(|utxo| utxo.amount).sum()
}

/// Waste score of a candidate selection
///
/// The excess is whatever the selection leaves over after paying `target`
/// and a fee that assumes no change output. Any excess also costs
/// `cost_of_change`, the price of turning it into a change output.
///
/// # Returns
/// `None` if the selection does not cover the target plus fee, otherwise
/// the waste in satoshis (0 for an exact match)
pub fn waste(selection: &[Utxo], target: Amount, fee_rate: f32, cost_of_change: u64) -> Option<u64> {
    let inputs_vsize: usize = selection.iter().map(input_size).sum();
    waste_for_totals(total_amount(selection), inputs_vsize, target, fee_rate, cost_of_change)
}

/// Waste score from a selection's total value and total input size
///
/// Same as [`waste`], for callers that keep running totals instead of a
/// slice of UTXOs.
pub fn waste_for_totals(
    total_input: Amount,
    inputs_vsize: usize,
    target: Amount,
    fee_rate: f32,
    cost_of_change: u64,
) -> Option<u64> {
    let vsize = TX_OVERHEAD_VBYTES + inputs_vsize + PAYMENT_OUTPUT_VBYTES;
    let fee = calculate_fee(vsize, fee_rate).to_sat();

    let excess = total_input
        .to_sat()
        .checked_sub(target.to_sat())?
        .checked_sub(fee)?;

    if excess > 0 {
        Some(excess.saturating_add(cost_of_change))
    } else {
        Some(0)
    }
}

/// Cost of creating a change output now and spending it later
pub fn default_cost_of_change(fee_rate: f32) -> u64 {
    let change_output = calculate_fee(CHANGE_OUTPUT_VBYTES, fee_rate);
    let future_spend = calculate_fee(get_input_size(ScriptType::NativeSegwit), fee_rate);

    change_output.to_sat().saturating_add(future_spend.to_sat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::OutPoint;

    fn segwit_utxo(sats: u64) -> Utxo {
        Utxo::new(
            OutPoint::null(),
            Amount::from_sat(sats),
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
            1,
        )
    }

    #[test]
    fn test_input_sizes_are_ordered() {
        assert!(get_input_size(ScriptType::NativeSegwit) < get_input_size(ScriptType::NestedSegwit));
        assert!(get_input_size(ScriptType::NestedSegwit) < get_input_size(ScriptType::Legacy));
    }

    #[test]
    fn test_calculate_fee_rounds_up() {
        assert_eq!(calculate_fee(100, 1.0), Amount::from_sat(100));
        assert_eq!(calculate_fee(3, 1.5), Amount::from_sat(5));
        assert_eq!(calculate_fee(0, 10.0), Amount::ZERO);
    }

    #[test]
    fn test_estimate_fee_with_and_without_change() {
        let inputs = vec![segwit_utxo(30_000), segwit_utxo(20_000)];

        // 10 + 2 * 68 + 31
        assert_eq!(estimate_fee(&inputs, false, 1.0), Amount::from_sat(177));
        // plus 31 for change
        assert_eq!(estimate_fee(&inputs, true, 1.0), Amount::from_sat(208));
        // base overhead plus payment output only
        assert_eq!(estimate_fee(&[], false, 1.0), Amount::from_sat(41));
    }

    #[test]
    fn test_effective_value() {
        assert_eq!(effective_value(&segwit_utxo(50_000), 1.0), 49_932);
        assert_eq!(effective_value(&segwit_utxo(50), 1.0), -18);
        assert!(!is_spendable(&segwit_utxo(68), 1.0));
        assert!(is_spendable(&segwit_utxo(69), 1.0));
    }

    #[test]
    fn test_huge_values_saturate() {
        let whale = segwit_utxo(u64::MAX);
        assert_eq!(effective_value(&whale, 1.0), i64::MAX - 68);
        assert!(!is_spendable(&whale, 1.0));

        let cap = segwit_utxo(Amount::MAX_MONEY.to_sat());
        assert!(is_spendable(&cap, 1.0));

        assert_eq!(calculate_fee(100, 1e20), Amount::from_sat(u64::MAX));
        assert_eq!(calculate_fee(100, f32::INFINITY), Amount::from_sat(u64::MAX));
        assert_eq!(calculate_fee(100, f32::NAN), Amount::ZERO);
        assert_eq!(calculate_fee(100, -2.0), Amount::ZERO);
        assert!(effective_value(&segwit_utxo(50_000), 1e20) < 0);
    }

    #[test]
    fn test_waste_exact_match_is_zero() {
        let selection = vec![segwit_utxo(30_000), segwit_utxo(20_000)];
        assert_eq!(waste(&selection, Amount::from_sat(49_823), 1.0, 99), Some(0));
    }

    #[test]
    fn test_waste_adds_cost_of_change_to_excess() {
        let selection = vec![segwit_utxo(50_000)];
        // 50_000 - 40_000 - (10 + 68 + 31)
        assert_eq!(waste(&selection, Amount::from_sat(40_000), 1.0, 99), Some(9_891 + 99));
    }

    #[test]
    fn test_waste_infeasible_is_none() {
        let selection = vec![segwit_utxo(10_000)];
        assert_eq!(waste(&selection, Amount::from_sat(10_000), 1.0, 0), None);
        assert_eq!(waste(&[], Amount::from_sat(1), 1.0, 0), None);
    }

    #[test]
    fn test_default_cost_of_change() {
        assert_eq!(default_cost_of_change(1.0), 31 + 68);
        assert_eq!(default_cost_of_change(2.0), 2 * (31 + 68));
        assert_eq!(default_cost_of_change(1e20), u64::MAX);
    }
}
