//! Freshness-gated price feed consulted before sealing a block header.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// A single observed market price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    pub observed_at: DateTime<Utc>,
}

/// Source of the price a miner embeds in a new block header.
pub trait FeedPriceSource: Send + Sync {
    /// The latest sample, if any was fed.
    fn last_price(&self) -> Option<PriceSample>;

    /// The latest price if it is fresh enough to mine with.
    fn price_to_mine(&self) -> Option<f64>;

    /// Replace the held sample with `price` observed now.
    fn feed_price(&self, price: f64);
}

/// Holds only the latest price sample; older samples are discarded.
pub struct FeedPrice {
    block_interval: Duration,
    last: RwLock<Option<PriceSample>>,
}

impl FeedPrice {
    /// Create a feed whose samples go stale after one `block_interval`.
    #[must_use]
    pub fn new(block_interval: Duration) -> Self {
        Self {
            block_interval,
            last: RwLock::new(None),
        }
    }

    #[must_use]
    pub fn block_interval(&self) -> Duration {
        self.block_interval
    }

    /// Replace the held sample with `price` observed at `observed_at`.
    pub fn feed_price_at(&self, price: f64, observed_at: DateTime<Utc>) {
        *self.last.write() = Some(PriceSample { price, observed_at });
        debug!(price, observed_at = %observed_at, "Price fed");
    }

    /// The held price if it was observed no later than `now` and within one block interval.
    #[must_use]
    pub fn price_to_mine_at(&self, now: DateTime<Utc>) -> Option<f64> {
        let sample = (*self.last.read())?;
        let age = now.signed_duration_since(sample.observed_at);
        if age < Duration::zero() || age > self.block_interval {
            return None;
        }
        Some(sample.price)
    }

    /// Header price derivation to mine: the fresh price expressed as its deviation from 1.0.
    #[must_use]
    pub fn derivation_to_mine(&self) -> Option<f64> {
        self.price_to_mine().map(|price| price - 1.0)
    }
}

impl FeedPriceSource for FeedPrice {
    fn last_price(&self) -> Option<PriceSample> {
        *self.last.read()
    }

    fn price_to_mine(&self) -> Option<f64> {
        self.price_to_mine_at(Utc::now())
    }

    fn feed_price(&self, price: f64) {
        self.feed_price_at(price, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> FeedPrice {
        FeedPrice::new(Duration::seconds(30))
    }

    #[test]
    fn empty_feed_has_nothing_to_mine() {
        let feed = feed();
        assert!(feed.last_price().is_none());
        assert_eq!(feed.price_to_mine(), None);
        assert_eq!(feed.derivation_to_mine(), None);
    }

    #[test]
    fn fresh_sample_is_mined() {
        let feed = feed();
        feed.feed_price(1.25);
        assert_eq!(feed.price_to_mine(), Some(1.25));
        assert_eq!(feed.derivation_to_mine(), Some(0.25));
    }

    #[test]
    fn stale_sample_is_not_mined() {
        let feed = feed();
        let observed = Utc::now();
        feed.feed_price_at(0.9, observed);
        assert_eq!(feed.price_to_mine_at(observed + Duration::seconds(30)), Some(0.9));
        assert_eq!(feed.price_to_mine_at(observed + Duration::seconds(31)), None);
    }

    #[test]
    fn sample_from_the_future_is_not_mined() {
        let feed = feed();
        let now = Utc::now();
        feed.feed_price_at(1.0, now + Duration::seconds(5));
        assert_eq!(feed.price_to_mine_at(now), None);
    }

    #[test]
    fn feeding_replaces_previous_sample() {
        let feed = feed();
        let now = Utc::now();
        feed.feed_price_at(1.1, now - Duration::seconds(10));
        feed.feed_price_at(1.2, now);
        let last = feed.last_price().unwrap();
        assert_eq!(last.price, 1.2);
        assert_eq!(last.observed_at, now);
    }
}
