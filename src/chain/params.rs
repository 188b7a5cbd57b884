//! Per-network parameters consumed by the absorption core.

use chrono::Duration;
use serde::Deserialize;

use super::node::Height;
use crate::error::ConfigError;

/// Blocks per absorption epoch on every network.
const BLOCK_PER_EPOCH: Height = 1024 * 4;

/// Mainnet epoch timespan: one week compressed by a factor of four.
const EPOCH_TIMESPAN_NANOS: i64 = 7 * 24 * 3600 * 1_000_000_000 / 4;

/// Supported networks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Simnet,
    Regtest,
}

/// Number of blocks in one absorption window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochParams {
    epoch_length: Height,
}

impl EpochParams {
    /// Create epoch parameters, rejecting a non-positive length.
    pub fn new(epoch_length: Height) -> Result<Self, ConfigError> {
        if epoch_length <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "epoch_length",
                reason: format!("must be positive, got {epoch_length}"),
            });
        }
        Ok(Self { epoch_length })
    }

    #[must_use]
    pub const fn epoch_length(&self) -> Height {
        self.epoch_length
    }
}

/// Network parameters relevant to price absorption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub network: Network,
    pub block_per_epoch: Height,
    pub target_time_per_block: Duration,
}

impl ChainParams {
    /// Parameters for a known network.
    #[must_use]
    pub fn for_network(network: Network) -> Self {
        let target_time_per_block = match network {
            Network::Mainnet | Network::Simnet => {
                Duration::nanoseconds(EPOCH_TIMESPAN_NANOS / i64::from(BLOCK_PER_EPOCH))
            }
            Network::Testnet => Duration::nanoseconds(7 * 24 * 3600 * 1_000_000_000 / 1024 / 16),
            Network::Regtest => Duration::minutes(10),
        };
        Self {
            network,
            block_per_epoch: BLOCK_PER_EPOCH,
            target_time_per_block,
        }
    }

    /// Epoch parameters derived from `block_per_epoch`.
    pub fn epoch(&self) -> Result<EpochParams, ConfigError> {
        EpochParams::new(self.block_per_epoch)
    }
}
