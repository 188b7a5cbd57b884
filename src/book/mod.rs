//! Order book of pending exchange orders.
//!
//! Orders are validated transactions whose net token balances describe a
//! swap between token 0 and token 1. The book keeps one price-sorted
//! sequence per side, an index by order hash and an index of every spent
//! outpoint so that no two admitted orders spend the same output.

mod order;
mod validate;

pub use order::{OrderBookEntry, OrderDescriptor, Side};
pub use validate::OrderValidator;

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use num_bigint::BigInt;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::chain::Height;
use crate::domain::{Balance, Hash256, OutPoint, Token, Transaction};
use crate::error::BookError;

#[derive(Debug, Default)]
struct BookInner {
    bids: Vec<Arc<OrderDescriptor>>,
    asks: Vec<Arc<OrderDescriptor>>,
    book: HashMap<Hash256, Arc<OrderDescriptor>>,
    outpoints: HashMap<OutPoint, Hash256>,
}

impl BookInner {
    fn side_mut(&mut self, side: Side) -> &mut Vec<Arc<OrderDescriptor>> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    fn side(&self, side: Side) -> &[Arc<OrderDescriptor>] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn check_double_spend(&self, tx: &Transaction) -> Result<(), BookError> {
        for outpoint in tx.inputs() {
            if let Some(spent_by) = self.outpoints.get(outpoint) {
                return Err(BookError::DuplicateSpend {
                    outpoint: *outpoint,
                    spent_by: *spent_by,
                });
            }
        }
        Ok(())
    }

    fn insert(&mut self, order: Arc<OrderDescriptor>) {
        let hash = *order.hash();
        for outpoint in order.tx().inputs() {
            self.outpoints.insert(*outpoint, hash);
        }
        self.book.insert(hash, Arc::clone(&order));

        // equal prices keep arrival order
        let side = order.side();
        let price = order.price();
        let orders = self.side_mut(side);
        let at = orders
            .iter()
            .position(|resting| side.ranks_before(price, resting.price()))
            .unwrap_or(orders.len());
        orders.insert(at, order);
    }

    fn remove(&mut self, hash: &Hash256) -> Option<Arc<OrderDescriptor>> {
        let order = self.book.remove(hash)?;
        for outpoint in order.tx().inputs() {
            if self.outpoints.get(outpoint) == Some(hash) {
                self.outpoints.remove(outpoint);
            }
        }
        let orders = self.side_mut(order.side());
        if let Some(at) = orders.iter().position(|resting| resting.hash() == hash) {
            orders.remove(at);
        }
        Some(order)
    }
}

/// Thread-safe order book.
///
/// All mutation happens under one write lock, so the per-side sequences,
/// the hash index and the outpoint index always agree.
pub struct OdrBook<V> {
    validator: V,
    inner: RwLock<BookInner>,
    last_updated: AtomicI64,
}

impl<V: OrderValidator> OdrBook<V> {
    #[must_use]
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            inner: RwLock::new(BookInner::default()),
            last_updated: AtomicI64::new(0),
        }
    }

    #[must_use]
    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Validate `tx` and add it to the book.
    ///
    /// The whole admission runs under the write lock, so two orders
    /// spending the same outpoint can never both be admitted.
    pub fn admit(&self, tx: Transaction) -> Result<Arc<OrderDescriptor>, BookError> {
        let hash = *tx.hash();
        let mut inner = self.inner.write();
        match self.maybe_accept(&mut inner, tx) {
            Ok(order) => {
                self.touch();
                debug!(
                    hash = %hash,
                    side = %order.side(),
                    amount = order.amount().atoms(),
                    payout = order.payout().atoms(),
                    orders = inner.book.len(),
                    "Order accepted"
                );
                Ok(order)
            }
            Err(err) => {
                debug!(hash = %hash, error = %err, "Order rejected");
                Err(err)
            }
        }
    }

    fn maybe_accept(
        &self,
        inner: &mut BookInner,
        tx: Transaction,
    ) -> Result<Arc<OrderDescriptor>, BookError> {
        let hash = *tx.hash();
        if inner.book.contains_key(&hash) {
            return Err(BookError::AlreadyInBook { hash });
        }

        self.validator.check_sanity(&tx)?;
        if self.validator.is_coinbase(&tx) {
            return Err(BookError::Coinbase { hash });
        }

        let best_height = self.validator.best_height();
        let next_height = best_height + 1;
        self.validator.check_standard(&tx, next_height)?;

        inner.check_double_spend(&tx)?;

        let inputs = self.validator.fetch_inputs(&tx)?;
        self.validator
            .check_sequence_lock(&tx, &inputs, next_height)?;
        let balance = self.validator.check_inputs(&tx, &inputs, next_height)?;
        classify(&hash, &balance)?;

        self.validator.check_inputs_standard(&tx, &inputs)?;
        self.validator.check_sig_op_cost(&tx, &inputs)?;
        self.validator.verify_signatures(&tx, &inputs)?;

        let order = Arc::new(OrderDescriptor::new(
            Arc::new(tx),
            balance.amount(Token::Token0),
            balance.amount(Token::Token1),
            Utc::now(),
            best_height,
        ));
        inner.insert(Arc::clone(&order));
        Ok(order)
    }

    /// Remove an order and release its outpoints. Unknown hashes are a no-op.
    pub fn remove(&self, hash: &Hash256) -> Option<Arc<OrderDescriptor>> {
        let removed = self.inner.write().remove(hash);
        if removed.is_some() {
            self.touch();
            debug!(hash = %hash, "Order removed");
        }
        removed
    }

    /// Remove every order that spends an input of `tx`, other than `tx` itself.
    pub fn remove_double_spends(&self, tx: &Transaction) -> Vec<Arc<OrderDescriptor>> {
        let mut inner = self.inner.write();
        let mut removed = Vec::new();
        for outpoint in tx.inputs() {
            let Some(spent_by) = inner.outpoints.get(outpoint).copied() else {
                continue;
            };
            if &spent_by == tx.hash() {
                continue;
            }
            if let Some(order) = inner.remove(&spent_by) {
                info!(
                    hash = %spent_by,
                    conflict = %tx.hash(),
                    outpoint = %outpoint,
                    "Removed double-spent order"
                );
                removed.push(order);
            }
        }
        if !removed.is_empty() {
            self.touch();
        }
        removed
    }

    /// Orders that settle a supply adjustment of `payout` token-1 units.
    ///
    /// Negative payouts take bids, positive payouts take asks. Orders are
    /// taken best price first until their payouts reach `|payout|`; the
    /// last order may overshoot since orders are never partially filled.
    #[must_use]
    pub fn select_for_payout(&self, payout: &BigInt) -> Vec<Arc<OrderDescriptor>> {
        let Some(side) = Side::for_payout(payout) else {
            return Vec::new();
        };
        let target = payout.magnitude();
        let inner = self.inner.read();

        let mut total = BigInt::default();
        let mut selected = Vec::new();
        for order in inner.side(side) {
            if total.magnitude() >= target {
                break;
            }
            total += BigInt::from(order.payout().atoms());
            selected.push(Arc::clone(order));
        }
        selected
    }

    /// Both sides walked from their best price, each truncated once its
    /// cumulative amount reaches `depth` coins. Unlimited when `depth <= 0`.
    #[must_use]
    pub fn select_for_depth(
        &self,
        depth: Decimal,
    ) -> (Vec<Arc<OrderDescriptor>>, Vec<Arc<OrderDescriptor>>) {
        let inner = self.inner.read();
        (
            orders_for_depth(&inner.asks, depth),
            orders_for_depth(&inner.bids, depth),
        )
    }

    /// Listing with asks from the highest price down, followed by bids
    /// from the highest price down.
    #[must_use]
    pub fn order_book(&self, depth: Decimal) -> Vec<OrderBookEntry> {
        let (asks, bids) = self.select_for_depth(depth);
        asks.iter()
            .rev()
            .chain(bids.iter())
            .map(|order| order.entry())
            .collect()
    }

    /// Last time an order was added to or removed from the book.
    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_updated.load(Ordering::Acquire))
            .unwrap_or_default()
    }

    fn touch(&self) {
        self.last_updated
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }

    #[must_use]
    pub fn contains(&self, hash: &Hash256) -> bool {
        self.inner.read().book.contains_key(hash)
    }

    #[must_use]
    pub fn fetch_order(&self, hash: &Hash256) -> Option<Arc<OrderDescriptor>> {
        self.inner.read().book.get(hash).cloned()
    }

    /// Hash of the order in the book spending `outpoint`, if any.
    #[must_use]
    pub fn check_spend(&self, outpoint: &OutPoint) -> Option<Hash256> {
        self.inner.read().outpoints.get(outpoint).copied()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.inner.read().book.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[must_use]
    pub fn order_hashes(&self) -> Vec<Hash256> {
        self.inner.read().book.keys().copied().collect()
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<Arc<OrderDescriptor>> {
        self.inner.read().book.values().cloned().collect()
    }

    /// Orders on one side, best price first.
    #[must_use]
    pub fn side_orders(&self, side: Side) -> Vec<Arc<OrderDescriptor>> {
        self.inner.read().side(side).to_vec()
    }

    /// Height the book was validated against when `hash` was admitted.
    #[must_use]
    pub fn admitted_at_height(&self, hash: &Hash256) -> Option<Height> {
        self.fetch_order(hash).map(|order| order.height())
    }
}

fn classify(hash: &Hash256, balance: &Balance) -> Result<(), BookError> {
    let token0 = balance.amount(Token::Token0);
    let token1 = balance.amount(Token::Token1);
    if !token0.is_positive() && !token1.is_positive() {
        return Err(BookError::NotAnOrder { hash: *hash });
    }
    if token0.atoms() == 0 {
        return Err(BookError::ZeroAmount { hash: *hash });
    }
    Ok(())
}

fn orders_for_depth(orders: &[Arc<OrderDescriptor>], depth: Decimal) -> Vec<Arc<OrderDescriptor>> {
    if depth <= Decimal::ZERO {
        return orders.to_vec();
    }
    let mut total = Decimal::ZERO;
    let mut selected = Vec::new();
    for order in orders {
        selected.push(Arc::clone(order));
        total += order.amount().to_coin();
        if total >= depth {
            break;
        }
    }
    selected
}
