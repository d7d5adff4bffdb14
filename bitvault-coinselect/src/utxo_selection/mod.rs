//! UTXO selection module
//!
//! Chooses which unspent transaction outputs fund a payment.
//!
//! # Overview
//!
//! Three algorithms run against the same candidate pool and the selection
//! with the lowest waste is returned:
//!
//! - Branch-and-Bound looks for an exact match that needs no change output
//! - Single Random Draw accumulates coins in random order, for privacy
//! - Largest-First accumulates the biggest coins, and succeeds whenever the
//!   pool can pay at all
//!
//! # Module Structure
//!
//! - `types.rs` - UTXOs, selection options and results
//! - `selector.rs` - The orchestrator (Strategy pattern context)
//! - `strategies/` - One file per algorithm, plus shared settlement and sorting
//!
//! # Typical Usage
//!
//! ```
//! use bitvault_coinselect::utxo_selection::{select_coins, SelectionOptions, Utxo};
//! use bitvault_coinselect::CoinSelectionError;
//! use bitcoin::{Amount, OutPoint};
//!
//! let utxos = vec![Utxo::new(
//!     OutPoint::null(),
//!     Amount::from_sat(1_000),
//!     "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4".to_string(),
//!     3,
//! )];
//!
//! match select_coins(&utxos, &SelectionOptions::new(Amount::from_sat(50_000), 1.0)) {
//!     Ok(result) => println!("selected {} inputs", result.input_count()),
//!     Err(CoinSelectionError::InsufficientFunds { required, available }) => {
//!         assert!(available < required);
//!     }
//!     Err(other) => panic!("unexpected error: {}", other),
//! }
//! ```

pub mod types;
pub mod selector;
pub mod strategies;

pub use selector::{select_coins, validate_options, CoinSelector};
pub use strategies::Strategy;
pub use types::{CoinSelectionResult, ScriptType, SelectionAlgorithm, SelectionOptions, Utxo};
