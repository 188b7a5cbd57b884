//! Per-block mint/burn amount toward the next absorption target.

use num_bigint::BigInt;
use num_traits::{Float, One, Signed, Zero};

use super::oracle::median_price;
use crate::chain::{ChainView, EpochParams, Height};

/// Supply bookkeeping shared by one chain instance.
///
/// Only the consensus layer commits changes here, once per confirmed
/// absorption event; the calculators read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbsorptionState {
    pub last_absorption_height: Height,
    pub last_absorption_supply: BigInt,
    pub total_supply: BigInt,
}

impl AbsorptionState {
    #[must_use]
    pub fn new(
        last_absorption_height: Height,
        last_absorption_supply: BigInt,
        total_supply: BigInt,
    ) -> Self {
        Self {
            last_absorption_height,
            last_absorption_supply,
            total_supply,
        }
    }

    /// Net supply change since the last absorption point.
    #[must_use]
    pub fn already_absorbed(&self) -> BigInt {
        &self.total_supply - &self.last_absorption_supply
    }

    /// Record an absorption event at `height`, anchored on the current total supply.
    pub fn record_absorption(&mut self, height: Height) {
        self.last_absorption_height = height;
        self.last_absorption_supply = self.total_supply.clone();
    }

    /// Apply a minted (positive) or burned (negative) amount to the total supply.
    pub fn apply_supply_change(&mut self, delta: &BigInt) {
        self.total_supply += delta;
    }
}

/// Multiply `supply` by `rate` without intermediate truncation.
///
/// The rate is decomposed into its exact binary mantissa and exponent so
/// the product is formed in integer arithmetic, then rounded half away
/// from zero. Returns `None` for a non-finite rate.
#[must_use]
pub fn scale_supply(supply: &BigInt, rate: f64) -> Option<BigInt> {
    if !rate.is_finite() {
        return None;
    }
    if rate == 0.0 {
        return Some(BigInt::zero());
    }

    // rate == sign * mantissa * 2^exponent exactly
    let (mantissa, exponent, sign) = rate.integer_decode();
    let mut product = supply * BigInt::from(mantissa);
    if sign < 0 {
        product = -product;
    }
    let shift = usize::from(exponent.unsigned_abs());
    if exponent >= 0 {
        return Some(product << shift);
    }

    let half = BigInt::one() << (shift - 1);
    let rounded = (product.abs() + half) >> shift;
    Some(if product.is_negative() {
        -rounded
    } else {
        rounded
    })
}

/// Per-block supply adjustment for the block after the best chain tip.
///
/// Positive values mint, negative values burn. Returns `None` for an
/// empty or genesis-only chain, once the absorption window has closed,
/// or when the last absorption point has no defined price. The target is
/// recomputed every block from the latest total supply, so deviations
/// are corrected rather than accumulated.
pub fn next_absorption_amount<V: ChainView>(
    view: &V,
    state: &AbsorptionState,
    epoch: EpochParams,
) -> Option<BigInt> {
    let tip = view.tip()?;
    if tip.is_genesis() {
        return None;
    }

    let remaining = epoch.epoch_length() - (tip.height() - state.last_absorption_height);
    if remaining <= 0 {
        // absorption only spans one epoch
        return None;
    }

    let last_rate = median_price(
        view,
        view.node_by_height(state.last_absorption_height),
        epoch,
    )?;
    let target = scale_supply(&state.last_absorption_supply, last_rate)?;
    let remain = target - state.already_absorbed();

    Some(remain / BigInt::from(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::chain::{chain_with_prices, epoch};
    use num_traits::ToPrimitive;

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn scale_supply_is_exact() {
        assert_eq!(scale_supply(&big(1_000), 0.5), Some(big(500)));
        assert_eq!(scale_supply(&big(1_000), -0.25), Some(big(-250)));
        assert_eq!(scale_supply(&big(7), 0.0), Some(big(0)));
        assert_eq!(scale_supply(&big(3), 4.0), Some(big(12)));
    }

    #[test]
    fn scale_supply_rounds_half_away_from_zero() {
        assert_eq!(scale_supply(&big(3), 0.5), Some(big(2)));
        assert_eq!(scale_supply(&big(3), -0.5), Some(big(-2)));
        assert_eq!(scale_supply(&big(5), 0.25), Some(big(1)));
    }

    #[test]
    fn scale_supply_keeps_precision_beyond_f64() {
        let supply: BigInt = "123456789012345678901234567890".parse().unwrap();
        assert_eq!(scale_supply(&supply, 2.0), Some(&supply * big(2)));
        assert_eq!(scale_supply(&supply, f64::NAN), None);
    }

    #[test]
    fn scale_supply_is_exact_across_binary_exponents() {
        let unit = BigInt::one() << 128;
        for rate in [1.0, -0.1, 3.75, 6.02e-23, 1e200] {
            let scaled = scale_supply(&unit, rate).and_then(|s| s.to_f64());
            assert_eq!(scaled, Some(rate * 2f64.powi(128)), "rate {rate}");
        }
    }

    #[test]
    fn subnormal_rate_rounds_to_zero() {
        let supply = BigInt::one() << 62;
        assert_eq!(scale_supply(&supply, f64::MIN_POSITIVE / 4.0), Some(big(0)));
        assert_eq!(scale_supply(&supply, -f64::MIN_POSITIVE / 4.0), Some(big(0)));
    }

    #[test]
    fn genesis_only_chain_has_no_amount() {
        let index = chain_with_prices(&[Some(0.1)]);
        let state = AbsorptionState::new(0, big(100), big(100));
        assert_eq!(next_absorption_amount(&index, &state, epoch(1)), None);
    }

    #[test]
    fn closed_window_has_no_amount() {
        let index = chain_with_prices(&[Some(0.1); 8]);
        // tip height 7, last absorption at 3, epoch 4: remaining 0
        let state = AbsorptionState::new(3, big(100), big(100));
        assert_eq!(next_absorption_amount(&index, &state, epoch(4)), None);
    }

    #[test]
    fn splits_remaining_target_over_remaining_blocks() {
        // last absorption at height 3 with median 0.5 over heights 0..=3
        let index = chain_with_prices(&[Some(0.5); 5]);
        let state = AbsorptionState::new(3, big(1_000), big(1_100));
        // target 500, already 100, remaining 4 - (4 - 3) = 3 blocks
        assert_eq!(
            next_absorption_amount(&index, &state, epoch(4)),
            Some(big(133))
        );
    }

    #[test]
    fn burn_truncates_toward_zero() {
        let index = chain_with_prices(&[Some(-0.5); 5]);
        let state = AbsorptionState::new(3, big(1_000), big(1_000));
        // target -500 over 3 blocks
        assert_eq!(
            next_absorption_amount(&index, &state, epoch(4)),
            Some(big(-166))
        );
    }

    #[test]
    fn undefined_reference_price_has_no_amount() {
        let index = chain_with_prices(&[None, None, None, None, Some(0.1)]);
        let state = AbsorptionState::new(3, big(1_000), big(1_000));
        assert_eq!(next_absorption_amount(&index, &state, epoch(4)), None);
    }

    #[test]
    fn state_records_absorption_at_current_supply() {
        let mut state = AbsorptionState::new(0, big(10), big(10));
        state.apply_supply_change(&big(-4));
        assert_eq!(state.already_absorbed(), big(-4));
        state.record_absorption(12);
        assert_eq!(state.last_absorption_height, 12);
        assert_eq!(state.already_absorbed(), big(0));
    }
}
