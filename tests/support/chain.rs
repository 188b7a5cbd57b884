use num_bigint::BigInt;
use pegnode::absorption::{AbsorptionState, ChainState};
use pegnode::testkit::chain::{chain_with_prices, epoch};

/// Chain state over a linear chain with the given header prices and a
/// supply that has not moved since the last absorption.
pub fn chain_state(
    prices: &[Option<f64>],
    epoch_length: i32,
    last_absorption_height: i32,
    supply: i64,
) -> ChainState {
    let supply = BigInt::from(supply);
    ChainState::new(
        chain_with_prices(prices),
        AbsorptionState::new(last_absorption_height, supply.clone(), supply),
        epoch(epoch_length),
    )
}

/// Chain for an active-trigger check with an epoch of three blocks and the
/// last absorption at height 3.
///
/// The reference window (heights 1..=3) averages to `reference`; the
/// window ending at the next candidate averages to `current` as long as
/// the candidate also reports `current`.
pub fn active_band_chain(reference: f64, current: f64) -> ChainState {
    chain_state(
        &[None, Some(reference), Some(reference), None, Some(current)],
        3,
        3,
        1_000_000,
    )
}
