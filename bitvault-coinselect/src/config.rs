//! Configuration management for the coin selection engine.
//!
//! Selection policy and logging settings are stored in TOML. Every field has
//! a default, so a partial or empty file is valid. The payment target and fee
//! rate are per call and never part of the file; [`SelectionConfig::options`]
//! combines them with the stored policy.
//!
//! ```toml
//! [selection]
//! min_change = 1000
//! max_inputs = 200
//! prefer_confirmed = true
//! min_confirmations = 1
//!
//! [logging]
//! level = "debug"
//! ```

use anyhow::{anyhow, Result};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::logging::LogConfig;
use crate::utxo_selection::types::{
    SelectionOptions, DEFAULT_MAX_BNB_ITERATIONS, DEFAULT_MAX_INPUTS, DUST_THRESHOLD,
};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SelectionConfig {
    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Stored coin selection policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Smallest change output worth creating, in sats
    #[serde(default = "default_min_change")]
    pub min_change: u64,

    #[serde(default = "default_max_inputs")]
    pub max_inputs: usize,

    #[serde(default)]
    pub prefer_confirmed: bool,

    #[serde(default)]
    pub min_confirmations: u32,

    /// Iteration cap for the branch-and-bound search
    #[serde(default = "default_max_bnb_iterations")]
    pub max_bnb_iterations: usize,

    /// Fixed cost of change in sats; derived from the fee rate when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_of_change: Option<u64>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_change: default_min_change(),
            max_inputs: default_max_inputs(),
            prefer_confirmed: false,
            min_confirmations: 0,
            max_bnb_iterations: default_max_bnb_iterations(),
            cost_of_change: None,
        }
    }
}

impl SelectionConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        let config: SelectionConfig =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, content).map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.selection.max_inputs == 0 {
            return Err(anyhow!("Invalid max_inputs: must be greater than 0"));
        }

        if self.selection.max_bnb_iterations == 0 {
            return Err(anyhow!("Invalid max_bnb_iterations: must be greater than 0"));
        }

        if let Some(path) = &self.logging.log_file {
            if path.trim().is_empty() {
                anyhow::bail!("Invalid log file: path is empty");
            }
        }

        Ok(())
    }

    /// Build selection options for one payment from the stored policy
    pub fn options(&self, target: Amount, fee_rate: f32) -> SelectionOptions {
        let policy = &self.selection;
        let options = SelectionOptions::new(target, fee_rate)
            .with_min_change(policy.min_change)
            .with_max_inputs(policy.max_inputs)
            .with_prefer_confirmed(policy.prefer_confirmed)
            .with_min_confirmations(policy.min_confirmations)
            .with_max_bnb_iterations(policy.max_bnb_iterations);

        match policy.cost_of_change {
            Some(cost) => options.with_cost_of_change(cost),
            None => options,
        }
    }
}

/// Ensure a configuration file exists at the specified path
/// If it doesn't exist, create it with default values
pub fn ensure_config_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        let content = toml::to_string_pretty(&SelectionConfig::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
            }
        }

        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write default config file: {}", e))?;
    }

    Ok(())
}

// Default value functions

fn default_min_change() -> u64 {
    DUST_THRESHOLD
}

fn default_max_inputs() -> usize {
    DEFAULT_MAX_INPUTS
}

fn default_max_bnb_iterations() -> usize {
    DEFAULT_MAX_BNB_ITERATIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: SelectionConfig = toml::from_str("").unwrap();
        assert_eq!(config, SelectionConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_options_follow_policy() {
        let mut config = SelectionConfig::default();
        config.selection.prefer_confirmed = true;
        config.selection.min_confirmations = 3;

        let options = config.options(Amount::from_sat(10_000), 2.0);
        assert_eq!(options.target, Amount::from_sat(10_000));
        assert!(options.prefer_confirmed);
        assert_eq!(options.min_confirmations, 3);
        assert_eq!(options.cost_of_change, math::default_cost_of_change(2.0));

        config.selection.cost_of_change = Some(7);
        assert_eq!(config.options(Amount::from_sat(10_000), 2.0).cost_of_change, 7);
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = SelectionConfig::default();
        config.selection.max_inputs = 0;
        assert!(config.validate().is_err());

        let mut config = SelectionConfig::default();
        config.selection.max_bnb_iterations = 0;
        assert!(config.validate().is_err());
    }
}
