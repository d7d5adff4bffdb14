//! BitVault Coin Selection
//!
//! Coin selection engine for the BitVault Bitcoin wallet: given the wallet's
//! UTXOs, a payment amount and a fee rate, it picks the inputs that fund the
//! transaction, and reports the fee and change.
//!
//! # Modules
//!
//! - `utxo_selection`: Selection types, the three algorithms and the orchestrator
//! - `math`: Input sizes, fee estimation, effective value and waste
//! - `error`: The typed selection error
//! - `config`: TOML-backed selection policy
//! - `logging`: Logging backend setup

/// Typed errors returned by coin selection
pub mod error;

/// Bitcoin-related calculations and math utilities
pub mod math;

/// Logging setup
pub mod logging;

/// Configuration management
pub mod config;

/// UTXO selection algorithms and utilities
pub mod utxo_selection;

pub use bitcoin::{Amount, OutPoint, Txid};
pub use error::{CoinSelectionError, SelectionResult};
pub use utxo_selection::{
    select_coins, CoinSelectionResult, CoinSelector, ScriptType, SelectionAlgorithm,
    SelectionOptions, Utxo,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with the given logging configuration
pub fn init(log_config: &logging::LogConfig) -> Result<(), String> {
    logging::init(log_config)?;
    log::info!("BitVault coin selection v{} initialized", VERSION);
    Ok(())
}
