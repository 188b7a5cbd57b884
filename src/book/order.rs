//! Order descriptors held by the book.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::chain::Height;
use crate::domain::{Amount, Hash256, Transaction};

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buys token 0, paying token 1. Sorted highest price first.
    Bid,
    /// Sells token 0 for token 1. Sorted lowest price first.
    Ask,
}

impl Side {
    /// Side that settles a supply adjustment: burns take bids, mints take asks.
    #[must_use]
    pub fn for_payout(payout: &BigInt) -> Option<Self> {
        match payout.sign() {
            Sign::Minus => Some(Self::Bid),
            Sign::Plus => Some(Self::Ask),
            Sign::NoSign => None,
        }
    }

    /// Whether `price` ranks strictly ahead of `other` on this side.
    #[must_use]
    pub fn ranks_before(&self, price: f64, other: f64) -> bool {
        match self {
            Self::Bid => price > other,
            Self::Ask => price < other,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// An admitted order. Built once at admission and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDescriptor {
    tx: Arc<Transaction>,
    side: Side,
    amount: Amount,
    payout: Amount,
    added_at: DateTime<Utc>,
    height: Height,
}

impl OrderDescriptor {
    /// Classify an order from the token balances of its transaction.
    ///
    /// A positive token-0 balance makes a bid; anything else an ask.
    #[must_use]
    pub fn new(
        tx: Arc<Transaction>,
        token0: Amount,
        token1: Amount,
        added_at: DateTime<Utc>,
        height: Height,
    ) -> Self {
        let side = if token0.is_positive() {
            Side::Bid
        } else {
            Side::Ask
        };
        Self {
            tx,
            side,
            amount: token0.abs(),
            payout: token1.abs(),
            added_at,
            height,
        }
    }

    #[must_use]
    pub fn hash(&self) -> &Hash256 {
        self.tx.hash()
    }

    #[must_use]
    pub fn tx(&self) -> &Arc<Transaction> {
        &self.tx
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Token-0 amount exchanged.
    #[must_use]
    pub const fn amount(&self) -> Amount {
        self.amount
    }

    /// Token-1 amount exchanged.
    #[must_use]
    pub const fn payout(&self) -> Amount {
        self.payout
    }

    #[must_use]
    pub const fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Best chain height when the order was admitted.
    #[must_use]
    pub const fn height(&self) -> Height {
        self.height
    }

    /// Token-1 paid per token-0 unit.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.payout.atoms() as f64 / self.amount.atoms() as f64
    }

    /// Row for order book listings.
    #[must_use]
    pub fn entry(&self) -> OrderBookEntry {
        OrderBookEntry {
            bid: self.side == Side::Bid,
            price: self.price(),
            amount: self.amount.to_coin(),
        }
    }
}

/// One row of an order book listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookEntry {
    pub bid: bool,
    pub price: f64,
    /// Token-0 amount in coins.
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Hash256;
    use rust_decimal_macros::dec;

    fn descriptor(token0: i64, token1: i64) -> OrderDescriptor {
        OrderDescriptor::new(
            Arc::new(Transaction::new(Hash256::ZERO, vec![])),
            Amount::from_atoms(token0),
            Amount::from_atoms(token1),
            Utc::now(),
            10,
        )
    }

    #[test]
    fn positive_token0_is_a_bid() {
        let order = descriptor(200_000_000, -100_000_000);
        assert_eq!(order.side(), Side::Bid);
        assert_eq!(order.amount().atoms(), 200_000_000);
        assert_eq!(order.payout().atoms(), 100_000_000);
        assert_eq!(order.price(), 0.5);
    }

    #[test]
    fn non_positive_token0_is_an_ask() {
        assert_eq!(descriptor(-5, 10).side(), Side::Ask);
        assert_eq!(descriptor(-5, 10).price(), 2.0);
    }

    #[test]
    fn entry_reports_amount_in_coins() {
        let entry = descriptor(-150_000_000, 300_000_000).entry();
        assert!(!entry.bid);
        assert_eq!(entry.price, 2.0);
        assert_eq!(entry.amount, dec!(1.5));
    }

    #[test]
    fn payout_sign_selects_side() {
        assert_eq!(Side::for_payout(&BigInt::from(-3)), Some(Side::Bid));
        assert_eq!(Side::for_payout(&BigInt::from(3)), Some(Side::Ask));
        assert_eq!(Side::for_payout(&BigInt::from(0)), None);
    }

    #[test]
    fn ranking_is_strict() {
        assert!(Side::Bid.ranks_before(2.0, 1.0));
        assert!(Side::Ask.ranks_before(1.0, 2.0));
        assert!(!Side::Ask.ranks_before(1.0, 1.0));
    }
}
