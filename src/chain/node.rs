//! Block nodes as seen by the absorption core.

use std::fmt;

use crate::domain::Hash256;

/// Block height. Signed so height differences never wrap.
pub type Height = i32;

/// Index of a node inside a [`ChainIndex`](super::ChainIndex) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// A connected block header reduced to what the absorption core reads.
///
/// Nodes are never mutated once built. A missing price derivation means
/// the miner had no fresh price feed when sealing the header.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    hash: Hash256,
    height: Height,
    parent: Option<NodeId>,
    price_derivation: Option<f64>,
}

impl BlockNode {
    /// Create a node. A NaN or infinite `price_derivation` is stored as no value.
    #[must_use]
    pub fn new(
        hash: Hash256,
        height: Height,
        parent: Option<NodeId>,
        price_derivation: Option<f64>,
    ) -> Self {
        Self {
            hash,
            height,
            parent,
            price_derivation: price_derivation.filter(|p| p.is_finite()),
        }
    }

    /// Create a node from the raw header field, where NaN encodes "no value".
    #[must_use]
    pub fn from_header(hash: Hash256, height: Height, parent: Option<NodeId>, raw: f64) -> Self {
        Self::new(hash, height, parent, Some(raw))
    }

    #[must_use]
    pub const fn hash(&self) -> &Hash256 {
        &self.hash
    }

    #[must_use]
    pub const fn height(&self) -> Height {
        self.height
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The reported deviation of market price from 1.0, if any.
    #[must_use]
    pub const fn price_derivation(&self) -> Option<f64> {
        self.price_derivation
    }

    #[must_use]
    pub const fn is_genesis(&self) -> bool {
        self.parent.is_none()
    }
}
