//! Branch-and-Bound UTXO selection strategy
//!
//! Depth-first search over include/exclude decisions for each UTXO, taken in
//! descending effective value order. The search looks for a subset whose
//! effective values add up exactly to the target plus the fee of the bare
//! transaction. Failing that it keeps the lowest-waste subset it came across.
//!
//! # Search rules
//!
//! - An exact match has zero waste and ends the search immediately.
//! - Once a branch overshoots the target its waste is evaluated once and the
//!   branch is not extended; adding inputs can only add excess.
//! - A branch whose value plus everything still undecided stays below the
//!   target is abandoned.
//! - Every step counts against `max_bnb_iterations`. Running out is not an
//!   error: the best candidate found so far (possibly none) is returned.
//!
//! The search is iterative. The decision stack holds one `bool` per decided
//! UTXO and the per-UTXO amounts, sizes and effective values live in arrays
//! indexed by position, so memory stays linear in the pool size.

use bitcoin::Amount;
use log::debug;
use rand::RngCore;

use crate::math;
use crate::utxo_selection::strategies::{base, utils, Strategy};
use crate::utxo_selection::types::{CoinSelectionResult, SelectionAlgorithm, SelectionOptions, Utxo};

/// Strategy searching for an exact or lowest-waste match
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundStrategy;

/// Outcome of a search: indices into the sorted pool and their waste
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    indices: Vec<usize>,
    waste: u64,
}

/// Per-UTXO values the search reads by position
struct SearchPool {
    effective: Vec<i64>,
    amounts: Vec<u64>,
    sizes: Vec<usize>,
}

impl SearchPool {
    fn new(sorted: &[Utxo], fee_rate: f32) -> Self {
        Self {
            effective: sorted.iter().map(|u| math::effective_value(u, fee_rate)).collect(),
            amounts: sorted.iter().map(|u| u.amount.to_sat()).collect(),
            sizes: sorted.iter().map(math::input_size).collect(),
        }
    }

    fn waste(&self, decisions: &[bool], options: &SelectionOptions) -> Option<u64> {
        let (total, vsize) = decisions
            .iter()
            .enumerate()
            .filter(|(_, included)| **included)
            .fold((0u64, 0usize), |(total, vsize), (i, _)| {
                (total + self.amounts[i], vsize + self.sizes[i])
            });

        math::waste_for_totals(
            Amount::from_sat(total),
            vsize,
            options.target,
            options.fee_rate,
            options.cost_of_change,
        )
    }
}

fn included_indices(decisions: &[bool]) -> Vec<usize> {
    decisions
        .iter()
        .enumerate()
        .filter_map(|(i, included)| if *included { Some(i) } else { None })
        .collect()
}

impl BranchAndBoundStrategy {
    /// Create a new BranchAndBoundStrategy
    pub fn new() -> Self {
        Self
    }

    /// Run the bounded search over a pool sorted by descending effective value
    fn search(&self, pool: &SearchPool, target: i64, options: &SelectionOptions) -> Option<Candidate> {
        let mut decisions: Vec<bool> = Vec::with_capacity(pool.effective.len());
        let mut curr_value: i64 = 0;
        let mut curr_available: i64 = pool.effective.iter().sum();
        let mut best: Option<Candidate> = None;

        let mut iterations = 0usize;
        loop {
            if iterations >= options.max_bnb_iterations {
                debug!(
                    "Branch and bound stopped after {} iterations (best waste: {:?})",
                    iterations,
                    best.as_ref().map(|c| c.waste)
                );
                break;
            }
            iterations += 1;

            let mut backtrack = false;
            if curr_value.saturating_add(curr_available) < target {
                // Even taking everything left cannot reach the target
                backtrack = true;
            } else if curr_value >= target {
                backtrack = true;

                if curr_value == target {
                    debug!("Branch and bound found an exact match after {} iterations", iterations);
                    return Some(Candidate {
                        indices: included_indices(&decisions),
                        waste: 0,
                    });
                }

                if let Some(waste) = pool.waste(&decisions, options) {
                    if best.as_ref().map_or(true, |b| waste < b.waste) {
                        best = Some(Candidate {
                            indices: included_indices(&decisions),
                            waste,
                        });
                    }
                }
            }

            if backtrack {
                // Undo trailing exclusions; those UTXOs become undecided again
                while let Some(false) = decisions.last() {
                    decisions.pop();
                    curr_available += pool.effective[decisions.len()];
                }

                match decisions.last_mut() {
                    Some(last) => *last = false,
                    None => {
                        debug!("Branch and bound exhausted the search tree after {} iterations", iterations);
                        break;
                    }
                }
                curr_value -= pool.effective[decisions.len() - 1];
            } else {
                // Inclusion branch first
                let next = decisions.len();
                curr_available -= pool.effective[next];
                curr_value += pool.effective[next];
                decisions.push(true);
            }
        }

        best
    }
}

impl Strategy for BranchAndBoundStrategy {
    fn name(&self) -> &'static str {
        "BranchAndBound"
    }

    fn algorithm(&self) -> SelectionAlgorithm {
        SelectionAlgorithm::BranchAndBound
    }

    fn select(
        &self,
        utxos: &[Utxo],
        options: &SelectionOptions,
        _rng: &mut dyn RngCore,
    ) -> Option<CoinSelectionResult> {
        let spendable: Vec<Utxo> = utxos
            .iter()
            .filter(|u| math::is_spendable(u, options.fee_rate))
            .cloned()
            .collect();
        if spendable.is_empty() {
            return None;
        }

        let sorted = utils::sort_by_effective_value(&spendable, options.fee_rate);
        let pool = SearchPool::new(&sorted, options.fee_rate);

        // Target plus the fee of a transaction with no inputs and no change
        let base_fee = math::estimate_fee(&[], false, options.fee_rate);
        let target = math::saturating_i64(options.target.to_sat())
            .saturating_add(math::saturating_i64(base_fee.to_sat()));

        let candidate = self.search(&pool, target, options)?;
        let selected: Vec<Utxo> = candidate.indices.iter().map(|&i| sorted[i].clone()).collect();

        base::settle(selected, options, self.algorithm(), candidate.waste)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::{OutPoint, Txid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::str::FromStr;

    fn segwit_utxo(vout: u32, sats: u64) -> Utxo {
        Utxo::new(
            OutPoint::new(
                Txid::from_str("9dcbf5a86b4e70be97fc5c953ad4111dfe0a94ea6768286e5efd6c35fd9ec9d1").unwrap(),
                vout,
            ),
            Amount::from_sat(sats),
            "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string(),
            6,
        )
    }

    fn amounts(result: &CoinSelectionResult) -> Vec<u64> {
        let mut amounts: Vec<u64> = result.selected.iter().map(|u| u.amount.to_sat()).collect();
        amounts.sort_unstable();
        amounts
    }

    fn select(utxos: &[Utxo], options: &SelectionOptions) -> Option<CoinSelectionResult> {
        let mut rng = StdRng::seed_from_u64(0);
        BranchAndBoundStrategy::new().select(utxos, options, &mut rng)
    }

    #[test]
    fn test_two_input_exact_match() {
        let utxos = vec![
            segwit_utxo(0, 50_000),
            segwit_utxo(1, 30_000),
            segwit_utxo(2, 20_000),
        ];
        let options = SelectionOptions::new(Amount::from_sat(49_823), 1.0);

        let result = select(&utxos, &options).unwrap();

        assert_eq!(amounts(&result), vec![20_000, 30_000]);
        assert_eq!(result.waste, 0);
        assert_eq!(result.algorithm, SelectionAlgorithm::BranchAndBound);
        // Change-inclusive fee (208) is not affordable, so the change output is dropped
        assert_eq!(result.change, Amount::ZERO);
        assert_eq!(result.fee, Amount::from_sat(177));
    }

    #[test]
    fn test_exact_match_among_many_utxos() {
        let utxos: Vec<Utxo> = (0..12).map(|i| segwit_utxo(i, 10_000 + i as u64 * 1_000)).collect();
        // Effective values are amount - 68; pick 21_000, 15_000 and 12_000
        let target = (21_000 - 68) + (15_000 - 68) + (12_000 - 68) - 41;
        let options = SelectionOptions::new(Amount::from_sat(target), 1.0);

        let result = select(&utxos, &options).unwrap();

        assert_eq!(result.waste, 0);
        let effective_sum: i64 = result
            .selected
            .iter()
            .map(|u| math::effective_value(u, 1.0))
            .sum();
        assert_eq!(effective_sum, target as i64 + 41);
    }

    #[test]
    fn test_no_exact_match_returns_lowest_waste() {
        let utxos = vec![
            segwit_utxo(0, 100_000),
            segwit_utxo(1, 60_000),
            segwit_utxo(2, 45_000),
        ];
        let options = SelectionOptions::new(Amount::from_sat(40_000), 1.0).with_cost_of_change(100);

        let result = select(&utxos, &options).unwrap();

        // The 45_000 UTXO leaves the least excess
        assert_eq!(amounts(&result), vec![45_000]);
        assert_eq!(result.waste, 45_000 - 40_000 - 109 + 100);
    }

    #[test]
    fn test_iteration_cap_returns_none() {
        let utxos: Vec<Utxo> = (0..20).map(|i| segwit_utxo(i, 10_000)).collect();
        let options = SelectionOptions::new(Amount::from_sat(55_000), 1.0).with_max_bnb_iterations(1);

        assert!(select(&utxos, &options).is_none());
    }

    #[test]
    fn test_iteration_cap_keeps_best_so_far() {
        let utxos: Vec<Utxo> = (0..30).map(|i| segwit_utxo(i, 10_000 + i as u64)).collect();
        let options = SelectionOptions::new(Amount::from_sat(55_123), 1.0).with_max_bnb_iterations(50);

        let result = select(&utxos, &options).unwrap();
        assert!(result.total_input >= options.target + result.fee);
    }

    #[test]
    fn test_insufficient_pool_returns_none() {
        let utxos = vec![segwit_utxo(0, 10_000), segwit_utxo(1, 5_000)];
        let options = SelectionOptions::new(Amount::from_sat(20_000), 1.0);

        assert!(select(&utxos, &options).is_none());
        assert!(select(&[], &options).is_none());
    }

    #[test]
    fn test_amount_above_supply_cap_is_ignored() {
        let utxos = vec![segwit_utxo(0, u64::MAX), segwit_utxo(1, 30_000), segwit_utxo(2, 20_000)];
        let options = SelectionOptions::new(Amount::from_sat(49_823), 1.0);

        let result = select(&utxos, &options).unwrap();
        assert_eq!(amounts(&result), vec![20_000, 30_000]);
        assert_eq!(result.waste, 0);

        let unreachable = SelectionOptions::new(Amount::from_sat(u64::MAX), 1.0);
        assert!(select(&utxos, &unreachable).is_none());
    }

    #[test]
    fn test_negative_effective_value_is_ignored() {
        let utxos = vec![segwit_utxo(0, 50), segwit_utxo(1, 30_000), segwit_utxo(2, 20_000)];
        let options = SelectionOptions::new(Amount::from_sat(49_823), 1.0);

        let result = select(&utxos, &options).unwrap();
        assert!(result.selected.iter().all(|u| u.amount.to_sat() > 68));
        assert_eq!(result.waste, 0);
    }
}
