//! Scripted order validation and order transaction builders.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::book::OrderValidator;
use crate::chain::Height;
use crate::domain::{Amount, Balance, Hash256, OutPoint, Transaction};
use crate::error::{RejectCode, RuleError};

use super::chain::test_hash;

/// Validator whose answers are scripted per transaction hash.
///
/// Transactions without a scripted balance fail input checks with
/// [`RejectCode::Invalid`], like an order spending unknown outputs.
#[derive(Debug, Default)]
pub struct ScriptedValidator {
    best_height: Height,
    balances: RwLock<HashMap<Hash256, Balance>>,
    coinbase: RwLock<HashSet<Hash256>>,
    signature_failures: RwLock<HashMap<Hash256, RuleError>>,
}

impl ScriptedValidator {
    pub fn new(best_height: Height) -> Self {
        Self {
            best_height,
            ..Self::default()
        }
    }

    /// Net balance `check_inputs` reports for `hash`, in atoms.
    pub fn set_balance(&self, hash: Hash256, token0: i64, token1: i64) {
        self.balances.write().insert(
            hash,
            Balance::new(Amount::from_atoms(token0), Amount::from_atoms(token1)),
        );
    }

    pub fn mark_coinbase(&self, hash: Hash256) {
        self.coinbase.write().insert(hash);
    }

    /// Make signature verification of `hash` fail with `err`.
    pub fn reject_signatures(&self, hash: Hash256, err: RuleError) {
        self.signature_failures.write().insert(hash, err);
    }
}

impl OrderValidator for ScriptedValidator {
    type Inputs = ();

    fn best_height(&self) -> Height {
        self.best_height
    }

    fn check_sanity(&self, tx: &Transaction) -> Result<(), RuleError> {
        if tx.inputs().is_empty() {
            return Err(RuleError::new(
                RejectCode::Malformed,
                "transaction has no inputs",
            ));
        }
        Ok(())
    }

    fn is_coinbase(&self, tx: &Transaction) -> bool {
        self.coinbase.read().contains(tx.hash())
    }

    fn fetch_inputs(&self, _tx: &Transaction) -> Result<(), RuleError> {
        Ok(())
    }

    fn check_sequence_lock(
        &self,
        _tx: &Transaction,
        _inputs: &(),
        _next_height: Height,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    fn check_inputs(
        &self,
        tx: &Transaction,
        _inputs: &(),
        _next_height: Height,
    ) -> Result<Balance, RuleError> {
        self.balances
            .read()
            .get(tx.hash())
            .copied()
            .ok_or_else(|| RuleError::new(RejectCode::Invalid, "inputs are missing or spent"))
    }

    fn verify_signatures(&self, tx: &Transaction, _inputs: &()) -> Result<(), RuleError> {
        match self.signature_failures.read().get(tx.hash()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Order hash for builder id `id`, kept clear of chain test hashes.
pub fn order_hash(id: u32) -> Hash256 {
    test_hash(1_000_000 + u64::from(id))
}

/// The single outpoint spent by the order built with id `id`.
pub fn order_outpoint(id: u32) -> OutPoint {
    OutPoint::new(test_hash(2_000_000 + u64::from(id)), 0)
}

/// Order transaction spending `inputs`, scripted with the given balance.
pub fn order_tx(
    validator: &ScriptedValidator,
    id: u32,
    inputs: Vec<OutPoint>,
    token0: i64,
    token1: i64,
) -> Transaction {
    let hash = order_hash(id);
    validator.set_balance(hash, token0, token1);
    Transaction::new(hash, inputs)
}

/// Ask selling `amount` token-0 atoms for `payout` token-1 atoms.
pub fn ask_tx(validator: &ScriptedValidator, id: u32, amount: i64, payout: i64) -> Transaction {
    order_tx(validator, id, vec![order_outpoint(id)], -amount, payout)
}

/// Bid buying `amount` token-0 atoms for `payout` token-1 atoms.
pub fn bid_tx(validator: &ScriptedValidator, id: u32, amount: i64, payout: i64) -> Transaction {
    order_tx(validator, id, vec![order_outpoint(id)], amount, -payout)
}
