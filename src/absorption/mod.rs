//! Price-anchored supply absorption.
//!
//! - [`oracle`] - epoch-windowed price from header reports
//! - [`decision`] - passive/active absorption trigger
//! - [`supply`] - per-block mint/burn amount toward the target
//!
//! The free functions are pure over a [`ChainView`]. [`ChainState`] wraps
//! the chain index and [`AbsorptionState`] in one lock so that each
//! computation sees a single consistent snapshot of the tip and supply.

pub mod decision;
pub mod oracle;
pub mod supply;

pub use decision::{check_absorption, evaluate_absorption, AbsorptionTrigger, TriggerKind};
pub use oracle::median_price;
pub use supply::{next_absorption_amount, scale_supply, AbsorptionState};

use num_bigint::BigInt;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::chain::{BlockNode, ChainIndex, ChainView, EpochParams, Height, NodeId};
use crate::domain::Hash256;
use crate::error::{AbsorptionError, ChainError};

/// Chain index and supply bookkeeping guarded together.
#[derive(Debug, Default)]
pub struct ChainSnapshot {
    pub index: ChainIndex,
    pub absorption: AbsorptionState,
}

/// The chain-state lock domain.
///
/// Every query takes the read lock once for its whole computation, so the
/// tip cannot advance between sub-steps.
pub struct ChainState {
    inner: RwLock<ChainSnapshot>,
    epoch: EpochParams,
}

impl ChainState {
    #[must_use]
    pub fn new(index: ChainIndex, absorption: AbsorptionState, epoch: EpochParams) -> Self {
        Self {
            inner: RwLock::new(ChainSnapshot { index, absorption }),
            epoch,
        }
    }

    #[must_use]
    pub fn epoch(&self) -> EpochParams {
        self.epoch
    }

    /// Get read access to the chain snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, ChainSnapshot> {
        self.inner.read()
    }

    /// Get write access to the chain snapshot.
    pub fn write(&self) -> RwLockWriteGuard<'_, ChainSnapshot> {
        self.inner.write()
    }

    /// Check if the new block will trigger a new absorption.
    ///
    /// This function is safe for concurrent access.
    pub fn check_new_absorption_rate(
        &self,
        candidate: &BlockNode,
    ) -> Result<Option<f64>, AbsorptionError> {
        let snapshot = self.inner.read();
        check_absorption(&snapshot.index, candidate, &snapshot.absorption, self.epoch)
    }

    /// Next per-block absorption amount after the current best chain tip.
    ///
    /// This function is safe for concurrent access.
    #[must_use]
    pub fn calc_next_absorption(&self) -> Option<BigInt> {
        let snapshot = self.inner.read();
        next_absorption_amount(&snapshot.index, &snapshot.absorption, self.epoch)
    }

    /// Median price of the epoch ending at the current tip.
    #[must_use]
    pub fn tip_median_price(&self) -> Option<f64> {
        let snapshot = self.inner.read();
        median_price(&snapshot.index, snapshot.index.tip(), self.epoch)
    }

    /// Build a candidate node on top of the current tip.
    pub fn candidate(
        &self,
        hash: Hash256,
        price_derivation: Option<f64>,
    ) -> Result<BlockNode, ChainError> {
        self.inner.read().index.candidate(hash, price_derivation)
    }

    /// Connect a block on top of the tip, applying its supply change.
    pub fn connect_block(
        &self,
        hash: Hash256,
        price_derivation: Option<f64>,
        supply_change: &BigInt,
    ) -> Result<NodeId, ChainError> {
        let mut snapshot = self.inner.write();
        let id = snapshot.index.connect(hash, price_derivation)?;
        snapshot.absorption.apply_supply_change(supply_change);
        Ok(id)
    }

    /// Commit a confirmed absorption event at `height`.
    pub fn commit_absorption(&self, height: Height) {
        let mut snapshot = self.inner.write();
        snapshot.absorption.record_absorption(height);
        info!(
            height,
            supply = %snapshot.absorption.total_supply,
            "Absorption committed"
        );
    }

    /// Copy of the current supply bookkeeping.
    #[must_use]
    pub fn absorption_state(&self) -> AbsorptionState {
        self.inner.read().absorption.clone()
    }

    /// Height of the best chain tip.
    #[must_use]
    pub fn best_height(&self) -> Option<Height> {
        self.inner.read().index.best_height()
    }
}
