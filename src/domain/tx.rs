//! Opaque handle to a validated transaction.

use super::id::{Hash256, OutPoint};

/// The parts of a transaction the order book reads: its hash and the
/// outputs it spends. Decoding and script data stay with the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    hash: Hash256,
    inputs: Vec<OutPoint>,
}

impl Transaction {
    #[must_use]
    pub fn new(hash: Hash256, inputs: Vec<OutPoint>) -> Self {
        Self { hash, inputs }
    }

    #[must_use]
    pub const fn hash(&self) -> &Hash256 {
        &self.hash
    }

    /// Outpoints consumed by this transaction.
    #[must_use]
    pub fn inputs(&self) -> &[OutPoint] {
        &self.inputs
    }
}
