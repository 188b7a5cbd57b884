//! Node configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every section is optional and
//! falls back to mainnet defaults.
//!
//! # Example
//!
//! ```no_run
//! use pegnode::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("pegnode.toml")?;
//!     config.init_logging();
//!     let epoch = config.chain_params().epoch()?;
//!     println!("epoch length {}", epoch.epoch_length());
//!     Ok(())
//! }
//! ```

mod logging;

pub use logging::LoggingConfig;

use std::path::Path;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::chain::{ChainParams, Height, Network};
use crate::error::{ConfigError, Result};

/// Chain selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub network: Network,
    /// Overrides the network's blocks per absorption epoch.
    pub epoch_length: Option<Height>,
}

/// Price feed settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Seconds a fed price stays minable. Defaults to the target block time.
    pub block_interval_secs: Option<i64>,
}

/// Order book display settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Listing depth in coins per side; zero or less lists everything.
    pub default_depth: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chain: ChainConfig,
    pub feed: FeedConfig,
    pub book: BookConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or fails validation.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed or fails
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if let Some(length) = self.chain.epoch_length {
            if length <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: "epoch_length",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if let Some(secs) = self.feed.block_interval_secs {
            if secs <= 0 {
                return Err(ConfigError::InvalidValue {
                    field: "block_interval_secs",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        if self.logging.level.is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }
        Ok(())
    }

    /// Network parameters with any configured overrides applied.
    #[must_use]
    pub fn chain_params(&self) -> ChainParams {
        let mut params = ChainParams::for_network(self.chain.network);
        if let Some(length) = self.chain.epoch_length {
            params.block_per_epoch = length;
        }
        params
    }

    /// How long a fed price stays minable.
    #[must_use]
    pub fn feed_block_interval(&self) -> Duration {
        self.feed
            .block_interval_secs
            .map_or_else(|| self.chain_params().target_time_per_block, Duration::seconds)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
