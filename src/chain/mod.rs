//! Read-only view of the best chain.
//!
//! Nodes live in an arena ([`ChainIndex`]) and refer to their parent by
//! [`NodeId`], so an ancestor walk costs one lookup per step and never
//! holds references between nodes.

mod index;
mod node;
mod params;

pub use index::{Ancestors, ChainIndex, ChainView};
pub use node::{BlockNode, Height, NodeId};
pub use params::{ChainParams, EpochParams, Network};
