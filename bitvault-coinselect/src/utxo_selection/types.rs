//! Core types for UTXO selection
//!
//! This module defines the values that cross the coin selection boundary:
//! the UTXOs supplied by the caller, the per-call selection options, and the
//! result handed to the transaction builder.
//!
//! # Key Types
//!
//! - [`Utxo`]: A single unspent transaction output offered for spending
//! - [`ScriptType`]: Input weight class of a UTXO
//! - [`SelectionOptions`]: Per-call target, fee rate and policy
//! - [`SelectionAlgorithm`]: Tag naming the algorithm that produced a result
//! - [`CoinSelectionResult`]: A feasible selection with its fee, change and waste
//!
//! # Example
//!
//! ```
//! use bitvault_coinselect::utxo_selection::types::{Utxo, SelectionOptions};
//! use bitcoin::{Amount, OutPoint, Txid};
//! use std::str::FromStr;
//!
//! let utxo = Utxo::new(
//!     OutPoint::new(
//!         Txid::from_str("7967a5185e907a25225574544c31f7b059c1a191d65b53dcc1554d339c4f9efc").unwrap(),
//!         0,
//!     ),
//!     Amount::from_sat(10_000),
//!     "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
//!     6,
//! );
//!
//! let options = SelectionOptions::new(Amount::from_sat(5_000), 2.0)
//!     .with_prefer_confirmed(true);
//!
//! assert!(utxo.is_confirmed());
//! assert_eq!(options.target, Amount::from_sat(5_000));
//! ```

use bitcoin::{Amount, OutPoint, Script};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math;

/// Minimum economically useful output value in satoshis
pub const DUST_THRESHOLD: u64 = 546;

/// Default ceiling on Branch-and-Bound search steps
pub const DEFAULT_MAX_BNB_ITERATIONS: usize = 100_000;

/// Default ceiling on the number of candidate inputs
pub const DEFAULT_MAX_INPUTS: usize = 500;

/// Input weight class of a UTXO
///
/// Address-based classification is a heuristic: it cannot tell taproot from
/// other native segwit outputs, nor P2WSH from P2WPKH. Callers holding the
/// scriptPubKey should tag the UTXO explicitly via [`ScriptType::from_script`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptType {
    /// Native segwit (P2WPKH, P2WSH, P2TR)
    NativeSegwit,
    /// Segwit nested in P2SH
    NestedSegwit,
    /// Legacy P2PKH and anything unrecognised
    Legacy,
}

impl ScriptType {
    /// Classify an address string by its prefix
    ///
    /// Bech32 prefixes (`bc1`, `tb1`, `bcrt1`) map to native segwit, the P2SH
    /// version prefixes (`3`, `2`) map to nested segwit, and everything else
    /// falls back to the heaviest legacy class.
    pub fn from_address(address: &str) -> Self {
        let address = address.trim().to_ascii_lowercase();

        if address.starts_with("bc1") || address.starts_with("tb1") || address.starts_with("bcrt1") {
            ScriptType::NativeSegwit
        } else if address.starts_with('3') || address.starts_with('2') {
            ScriptType::NestedSegwit
        } else {
            ScriptType::Legacy
        }
    }

    /// Classify a scriptPubKey
    pub fn from_script(script: &Script) -> Self {
        if script.is_witness_program() {
            ScriptType::NativeSegwit
        } else if script.is_p2sh() {
            ScriptType::NestedSegwit
        } else {
            ScriptType::Legacy
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptType::NativeSegwit => "Native SegWit",
            ScriptType::NestedSegwit => "Nested SegWit (P2SH)",
            ScriptType::Legacy => "Legacy",
        };
        f.write_str(name)
    }
}

/// Unspent transaction output (UTXO) offered for selection
///
/// UTXOs are supplied fresh on every call; the engine never mutates or
/// stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Reference to the transaction output (txid and vout)
    pub outpoint: OutPoint,

    /// Amount in this UTXO
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub amount: Amount,

    /// Address owning this output, used only to classify its script type
    pub address: String,

    /// Number of confirmations (0 for unconfirmed)
    pub confirmations: u32,

    /// Explicit script type, preferred over the address heuristic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<ScriptType>,
}

impl Utxo {
    /// Create a new UTXO
    ///
    /// # Arguments
    /// * `outpoint` - The transaction outpoint (txid and vout)
    /// * `amount` - The amount in this UTXO
    /// * `address` - The address owning this output
    /// * `confirmations` - Number of confirmations (0 for unconfirmed)
    pub fn new(outpoint: OutPoint, amount: Amount, address: String, confirmations: u32) -> Self {
        Self {
            outpoint,
            amount,
            address,
            confirmations,
            script_type: None,
        }
    }

    /// Tag this UTXO with an explicit script type
    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = Some(script_type);
        self
    }

    /// Script type used for weight estimation
    pub fn script_type(&self) -> ScriptType {
        self.script_type
            .unwrap_or_else(|| ScriptType::from_address(&self.address))
    }

    /// Check if this UTXO is confirmed
    pub fn is_confirmed(&self) -> bool {
        self.confirmations > 0
    }

    /// Get a unique identifier for this UTXO
    pub fn id(&self) -> String {
        format!("{}:{}", self.outpoint.txid, self.outpoint.vout)
    }
}

/// Per-call coin selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionOptions {
    /// Payment amount to cover
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub target: Amount,

    /// Fee rate in satoshis per vByte
    pub fee_rate: f32,

    /// Change below this many satoshis is not worth an output
    pub min_change: u64,

    /// Maximum number of candidate inputs
    pub max_inputs: usize,

    /// Order candidates by confirmation depth before truncation
    pub prefer_confirmed: bool,

    /// UTXOs with fewer confirmations are dropped
    pub min_confirmations: u32,

    /// Waste penalty in satoshis for a selection that leaves excess
    pub cost_of_change: u64,

    /// Ceiling on Branch-and-Bound search steps
    pub max_bnb_iterations: usize,
}

impl SelectionOptions {
    /// Create options for a payment with default policy
    ///
    /// The cost of change defaults to the fee of creating a change output now
    /// plus spending it later, both at `fee_rate`.
    pub fn new(target: Amount, fee_rate: f32) -> Self {
        Self {
            target,
            fee_rate,
            min_change: DUST_THRESHOLD,
            max_inputs: DEFAULT_MAX_INPUTS,
            prefer_confirmed: false,
            min_confirmations: 0,
            cost_of_change: math::default_cost_of_change(fee_rate),
            max_bnb_iterations: DEFAULT_MAX_BNB_ITERATIONS,
        }
    }

    /// Set the minimum change amount
    pub fn with_min_change(mut self, min_change: u64) -> Self {
        self.min_change = min_change;
        self
    }

    /// Set the maximum number of inputs
    pub fn with_max_inputs(mut self, max_inputs: usize) -> Self {
        self.max_inputs = max_inputs;
        self
    }

    /// Prefer deeply confirmed UTXOs
    pub fn with_prefer_confirmed(mut self, prefer_confirmed: bool) -> Self {
        self.prefer_confirmed = prefer_confirmed;
        self
    }

    /// Drop UTXOs with fewer confirmations than `min_confirmations`
    pub fn with_min_confirmations(mut self, min_confirmations: u32) -> Self {
        self.min_confirmations = min_confirmations;
        self
    }

    /// Override the cost of change
    pub fn with_cost_of_change(mut self, cost_of_change: u64) -> Self {
        self.cost_of_change = cost_of_change;
        self
    }

    /// Set the Branch-and-Bound iteration cap
    pub fn with_max_bnb_iterations(mut self, max_bnb_iterations: usize) -> Self {
        self.max_bnb_iterations = max_bnb_iterations;
        self
    }
}

/// Algorithm that produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionAlgorithm {
    /// Bounded depth-first search for an exact or low-waste match
    BranchAndBound,
    /// Greedy accumulation in random order
    SingleRandomDraw,
    /// Greedy accumulation by descending amount
    LargestFirst,
}

impl fmt::Display for SelectionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionAlgorithm::BranchAndBound => "BranchAndBound",
            SelectionAlgorithm::SingleRandomDraw => "SingleRandomDraw",
            SelectionAlgorithm::LargestFirst => "LargestFirst",
        };
        f.write_str(name)
    }
}

/// A feasible coin selection
///
/// Every value of this type satisfies `total_input >= target + fee`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinSelectionResult {
    /// Selected UTXOs
    pub selected: Vec<Utxo>,

    /// Sum of the selected amounts
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub total_input: Amount,

    /// Change returned to the wallet (zero when no change output is created)
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub change: Amount,

    /// Fee paid by the transaction
    #[serde(with = "bitcoin::amount::serde::as_sat")]
    pub fee: Amount,

    /// Algorithm that produced this selection
    pub algorithm: SelectionAlgorithm,

    /// Waste score used to rank this selection
    pub waste: u64,
}

impl CoinSelectionResult {
    /// Number of inputs in this selection
    pub fn input_count(&self) -> usize {
        self.selected.len()
    }

    /// Whether the transaction needs a change output
    pub fn has_change(&self) -> bool {
        self.change > Amount::ZERO
    }
}
