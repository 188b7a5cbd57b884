//! Active/passive absorption trigger.

use std::fmt;

use tracing::{debug, info, warn};

use super::oracle::median_price;
use super::supply::AbsorptionState;
use crate::chain::{BlockNode, ChainView, EpochParams};
use crate::error::AbsorptionError;

/// Price ratio at or above which an active absorption fires.
pub const ACTIVE_RATE_HIGH: f64 = 2.0;

/// Price ratio at or below which an active absorption fires.
pub const ACTIVE_RATE_LOW: f64 = -0.5;

/// Why an absorption was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// A full epoch elapsed since the last absorption.
    Passive,
    /// The price moved past the band around the last absorption price.
    Active,
    /// The last absorption point has no defined price to compare against.
    MissingReference,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passive => write!(f, "passive"),
            Self::Active => write!(f, "active"),
            Self::MissingReference => write!(f, "missing-reference"),
        }
    }
}

/// A triggered absorption with its price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsorptionTrigger {
    pub price: f64,
    pub kind: TriggerKind,
}

/// Check whether `candidate` triggers a new absorption, returning its price.
///
/// `candidate` must extend the current best chain tip of `view`.
pub fn check_absorption<V: ChainView>(
    view: &V,
    candidate: &BlockNode,
    state: &AbsorptionState,
    epoch: EpochParams,
) -> Result<Option<f64>, AbsorptionError> {
    Ok(evaluate_absorption(view, candidate, state, epoch)?.map(|trigger| trigger.price))
}

/// Same as [`check_absorption`], also reporting which condition fired.
pub fn evaluate_absorption<V: ChainView>(
    view: &V,
    candidate: &BlockNode,
    state: &AbsorptionState,
    epoch: EpochParams,
) -> Result<Option<AbsorptionTrigger>, AbsorptionError> {
    if candidate.parent() != view.tip_id() {
        warn!(
            height = candidate.height(),
            "Candidate does not connect to the best chain"
        );
        return Err(AbsorptionError::ChainMismatch {
            candidate_height: candidate.height(),
            expected_parent: view.tip_id(),
        });
    }

    let epoch_length = epoch.epoch_length();
    if candidate.height() < epoch_length - 1 {
        // no absorption in the first epoch
        return Ok(None);
    }

    let Some(price) = median_price(view, Some(candidate), epoch) else {
        return Ok(None);
    };

    let trigger = |kind: TriggerKind| -> Result<Option<AbsorptionTrigger>, AbsorptionError> {
        info!(
            height = candidate.height(),
            price,
            kind = %kind,
            "Absorption triggered"
        );
        Ok(Some(AbsorptionTrigger { price, kind }))
    };

    let last_height = state.last_absorption_height;
    if candidate.height() - last_height >= epoch_length {
        // one epoch without any active absorption, or none ever occurred
        return trigger(TriggerKind::Passive);
    }

    let last_node = view.node_by_height(last_height);
    let Some(last_price) = median_price(view, last_node, epoch) else {
        return trigger(TriggerKind::MissingReference);
    };

    let rate = price / last_price;
    if rate >= ACTIVE_RATE_HIGH || rate <= ACTIVE_RATE_LOW {
        return trigger(TriggerKind::Active);
    }

    debug!(
        height = candidate.height(),
        price,
        last_price,
        rate,
        "Price within absorption band"
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainIndex;
    use crate::testkit::chain::{chain_with_prices, epoch, test_hash};
    use num_bigint::BigInt;

    fn state_at(height: i32) -> AbsorptionState {
        AbsorptionState::new(height, BigInt::from(1_000), BigInt::from(1_000))
    }

    fn candidate(index: &ChainIndex, price: Option<f64>) -> BlockNode {
        index.candidate(test_hash(999), price).unwrap()
    }

    #[test]
    fn candidate_off_the_tip_is_rejected() {
        let index = chain_with_prices(&[Some(0.1); 6]);
        let stale_parent = index.node_id_by_height(3);
        let stale = index.child_of(stale_parent, test_hash(77), Some(0.1)).unwrap();
        let result = check_absorption(&index, &stale, &state_at(0), epoch(4));
        assert!(matches!(
            result,
            Err(AbsorptionError::ChainMismatch {
                candidate_height: 4,
                ..
            })
        ));
    }

    #[test]
    fn stale_candidate_in_first_epoch_is_still_a_mismatch() {
        let index = chain_with_prices(&[Some(0.1); 3]);
        let stale = index
            .child_of(index.node_id_by_height(0), test_hash(78), None)
            .unwrap();
        assert!(matches!(
            check_absorption(&index, &stale, &state_at(0), epoch(8)),
            Err(AbsorptionError::ChainMismatch {
                candidate_height: 1,
                ..
            })
        ));
    }

    #[test]
    fn first_epoch_never_absorbs() {
        let index = chain_with_prices(&[Some(0.1); 2]);
        let node = candidate(&index, Some(0.1));
        assert_eq!(check_absorption(&index, &node, &state_at(0), epoch(4)), Ok(None));
    }

    #[test]
    fn passive_trigger_after_a_full_epoch() {
        let index = chain_with_prices(&[Some(0.1); 8]);
        let node = candidate(&index, Some(0.1));
        let trigger = evaluate_absorption(&index, &node, &state_at(4), epoch(4))
            .unwrap()
            .unwrap();
        assert_eq!(trigger.kind, TriggerKind::Passive);
        assert!((trigger.price - 0.1).abs() < 1e-12);
    }

    #[test]
    fn undefined_median_never_triggers() {
        let index = chain_with_prices(&[None; 8]);
        let node = candidate(&index, None);
        assert_eq!(check_absorption(&index, &node, &state_at(0), epoch(4)), Ok(None));
    }

    #[test]
    fn missing_reference_price_triggers() {
        // reference window heights 2..=5 has no reports, candidate window 5..=8 does
        let index = chain_with_prices(&[
            None,
            None,
            None,
            None,
            None,
            None,
            Some(0.2),
            Some(0.2),
        ]);
        let node = candidate(&index, Some(0.2));
        let trigger = evaluate_absorption(&index, &node, &state_at(5), epoch(4))
            .unwrap()
            .unwrap();
        assert_eq!(trigger.kind, TriggerKind::MissingReference);
    }

    #[test]
    fn small_price_move_does_not_trigger() {
        let index = chain_with_prices(&[Some(0.1); 8]);
        let node = candidate(&index, Some(0.1));
        assert_eq!(check_absorption(&index, &node, &state_at(6), epoch(4)), Ok(None));
    }
}
