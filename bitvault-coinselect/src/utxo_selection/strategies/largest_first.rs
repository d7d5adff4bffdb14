//! LargestFirst UTXO selection strategy
//!
//! Takes UTXOs by descending raw amount until they pay for the target and a
//! transaction without change. Since every candidate has a positive
//! effective value, each added input moves the selection closer to the
//! target, so this strategy succeeds whenever the whole pool would.

use log::debug;
use rand::RngCore;

use crate::math;
use crate::utxo_selection::strategies::{base, utils, Strategy};
use crate::utxo_selection::types::{CoinSelectionResult, SelectionAlgorithm, SelectionOptions, Utxo};

/// Strategy selecting the largest UTXOs first
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestFirstStrategy;

impl LargestFirstStrategy {
    /// Create a new LargestFirstStrategy
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for LargestFirstStrategy {
    fn name(&self) -> &'static str {
        "LargestFirst"
    }

    fn algorithm(&self) -> SelectionAlgorithm {
        SelectionAlgorithm::LargestFirst
    }

    fn select(
        &self,
        utxos: &[Utxo],
        options: &SelectionOptions,
        _rng: &mut dyn RngCore,
    ) -> Option<CoinSelectionResult> {
        let sorted = utils::sort_by_amount(utxos);

        let mut selected = Vec::new();
        for utxo in sorted {
            selected.push(utxo);

            // Fee is recomputed for the current input count
            let fee = math::estimate_fee(&selected, false, options.fee_rate);
            let covered = options
                .target
                .checked_add(fee)
                .map_or(false, |needed| math::total_amount(&selected) >= needed);
            if covered {
                let waste = math::waste(&selected, options.target, options.fee_rate, options.cost_of_change)?;
                return base::settle(selected, options, self.algorithm(), waste);
            }
        }

        debug!("Largest first could not cover the target with {} UTXOs", utxos.len());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::{Amount, OutPoint, Txid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::str::FromStr;

    fn utxo(vout: u32, sats: u64, address: &str) -> Utxo {
        Utxo::new(
            OutPoint::new(
                Txid::from_str("5e2f84f989c08d4a0f9ce759ed21261f23b0b190bac24a5dfad045e05ddd3a7a").unwrap(),
                vout,
            ),
            Amount::from_sat(sats),
            address.to_string(),
            2,
        )
    }

    fn select(utxos: &[Utxo], options: &SelectionOptions) -> Option<CoinSelectionResult> {
        LargestFirstStrategy::new().select(utxos, options, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_largest_first_uses_only_necessary() {
        let utxos = vec![
            utxo(0, 20_000, "bc1q"),
            utxo(1, 80_000, "bc1q"),
            utxo(2, 50_000, "bc1q"),
        ];
        let options = SelectionOptions::new(Amount::from_sat(100_000), 1.0);

        let result = select(&utxos, &options).unwrap();

        let order: Vec<u32> = result.selected.iter().map(|u| u.outpoint.vout).collect();
        assert_eq!(order, vec![1, 2]);
        // 130_000 - 100_000 - (10 + 136 + 62)
        assert_eq!(result.fee, Amount::from_sat(208));
        assert_eq!(result.change, Amount::from_sat(29_792));
    }

    #[test]
    fn test_largest_first_use_all() {
        let utxos = vec![utxo(0, 30_000, "bc1q"), utxo(1, 30_000, "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy")];
        // 60_000 - (10 + 68 + 91 + 31) = 59_800
        let options = SelectionOptions::new(Amount::from_sat(59_800), 1.0);

        let result = select(&utxos, &options).unwrap();

        assert_eq!(result.input_count(), 2);
        assert_eq!(result.waste, 0);
        assert_eq!(result.change, Amount::ZERO);
        assert_eq!(result.fee, Amount::from_sat(200));
    }

    #[test]
    fn test_largest_first_insufficient_funds_high_fees() {
        let utxos = vec![utxo(0, 30_000, "bc1q"), utxo(1, 30_000, "bc1q")];
        let options = SelectionOptions::new(Amount::from_sat(59_000), 10.0);

        assert!(select(&utxos, &options).is_none());
    }

    #[test]
    fn test_largest_first_unpayable_fee_rate() {
        let utxos = vec![utxo(0, 30_000, "bc1q"), utxo(1, 30_000, "bc1q")];
        let options = SelectionOptions::new(Amount::from_sat(1_000), 1e20);

        assert!(select(&utxos, &options).is_none());
    }
}
