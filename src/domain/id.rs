//! Identifier types shared by the chain and the order book.

use std::fmt;

/// 256-bit identifier of a transaction or order.
///
/// The inner array is private so every construction goes through the
/// defined constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0; 32]);

    /// Create a hash from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a hash from its 64-character hex form.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

/// Reference to a specific spendable output of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    hash: Hash256,
    index: u32,
}

impl OutPoint {
    /// Create an outpoint referencing output `index` of transaction `hash`.
    #[must_use]
    pub const fn new(hash: Hash256, index: u32) -> Self {
        Self { hash, index }
    }

    /// Hash of the transaction holding the output.
    #[must_use]
    pub const fn hash(&self) -> &Hash256 {
        &self.hash
    }

    /// Output index within that transaction.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}
