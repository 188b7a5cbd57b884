//! Builders for chain indexes used across tests.

use crate::chain::{ChainIndex, EpochParams};
use crate::domain::Hash256;

/// Deterministic block hash: `n` in the last eight bytes, big-endian.
pub fn test_hash(n: u64) -> Hash256 {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    Hash256::new(bytes)
}

/// Epoch parameters for a test epoch length.
///
/// # Panics
///
/// Panics if `length` is not positive.
pub fn epoch(length: i32) -> EpochParams {
    EpochParams::new(length).expect("test epoch length must be positive")
}

/// Linear chain with one block per entry; the first entry is genesis at
/// height 0. Block `i` is hashed as `test_hash(i)`.
///
/// # Panics
///
/// Panics if `prices` is empty.
pub fn chain_with_prices(prices: &[Option<f64>]) -> ChainIndex {
    let (genesis, rest) = prices
        .split_first()
        .expect("chain needs at least a genesis block");
    let mut index = ChainIndex::with_genesis(test_hash(0), *genesis);
    for (height, price) in rest.iter().enumerate() {
        index
            .connect(test_hash(height as u64 + 1), *price)
            .expect("linear chain always connects to its tip");
    }
    index
}
