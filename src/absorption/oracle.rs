//! Epoch-windowed median price derived from block headers.

use crate::chain::{BlockNode, ChainView, EpochParams};

/// Price derived from the epoch window ending at `start`.
///
/// Walks `start` and its ancestors while they stay inside one epoch,
/// averaging every reported price derivation. Nodes without a value are
/// skipped rather than counted as zero. Returns `None` when the chain is
/// shorter than one epoch or fewer than two thirds of the window report.
///
/// No outlier rejection is applied; the result is a plain mean.
pub fn median_price<V: ChainView>(
    view: &V,
    start: Option<&BlockNode>,
    epoch: EpochParams,
) -> Option<f64> {
    let start = start?;
    let epoch_length = epoch.epoch_length();
    if start.height() + 1 < epoch_length {
        // one full epoch must pass before the first absorption
        return None;
    }

    let (count, sum) = view
        .ancestors(start)
        .take_while(|node| start.height() - node.height() < epoch_length)
        .filter_map(BlockNode::price_derivation)
        .fold((0i64, 0.0f64), |(count, sum), price| (count + 1, sum + price));

    if count * 3 < i64::from(epoch_length) * 2 {
        // less than super majority
        return None;
    }

    Some(sum / count as f64)
}
