//! In-memory arena of block nodes with a best-chain height lookup.

use tracing::debug;

use super::node::{BlockNode, Height, NodeId};
use crate::domain::Hash256;
use crate::error::ChainError;

/// Read-only access to connected chain nodes.
///
/// Ancestor links are [`NodeId`]s into the view, so walking the chain
/// never borrows one node from another.
pub trait ChainView {
    /// Id of the current best chain tip, `None` for an empty chain.
    fn tip_id(&self) -> Option<NodeId>;

    /// Look up a node by id.
    fn node(&self, id: NodeId) -> Option<&BlockNode>;

    /// Id of the best-chain node at `height`.
    fn node_id_by_height(&self, height: Height) -> Option<NodeId>;

    /// The current best chain tip.
    fn tip(&self) -> Option<&BlockNode> {
        self.tip_id().and_then(|id| self.node(id))
    }

    /// The best-chain node at `height`.
    fn node_by_height(&self, height: Height) -> Option<&BlockNode> {
        self.node_id_by_height(height).and_then(|id| self.node(id))
    }

    /// Iterate from `start` back through its ancestors.
    fn ancestors<'a>(&'a self, start: &'a BlockNode) -> Ancestors<'a, Self>
    where
        Self: Sized,
    {
        Ancestors {
            view: self,
            next: Some(start),
        }
    }
}

/// Iterator over a node and its ancestors, nearest first.
pub struct Ancestors<'a, V> {
    view: &'a V,
    next: Option<&'a BlockNode>,
}

impl<'a, V: ChainView> Iterator for Ancestors<'a, V> {
    type Item = &'a BlockNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent().and_then(|id| self.view.node(id));
        Some(current)
    }
}

/// Arena holding every known node, plus the best chain indexed by height.
#[derive(Debug, Default, Clone)]
pub struct ChainIndex {
    nodes: Vec<BlockNode>,
    /// `best[h]` is the best-chain node at height `h`.
    best: Vec<NodeId>,
}

impl ChainIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index whose best chain is a single genesis node.
    #[must_use]
    pub fn with_genesis(hash: Hash256, price_derivation: Option<f64>) -> Self {
        let mut index = Self::new();
        let genesis = NodeId::new(0);
        index
            .nodes
            .push(BlockNode::new(hash, 0, None, price_derivation));
        index.best.push(genesis);
        index
    }

    /// Number of nodes in the arena, side branches included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the best chain tip.
    #[must_use]
    pub fn best_height(&self) -> Option<Height> {
        self.tip().map(BlockNode::height)
    }

    /// Build a node on top of `parent` without inserting it.
    ///
    /// A parent of `None` builds a genesis node.
    pub fn child_of(
        &self,
        parent: Option<NodeId>,
        hash: Hash256,
        price_derivation: Option<f64>,
    ) -> Result<BlockNode, ChainError> {
        let height = match parent {
            Some(id) => {
                self.node(id)
                    .ok_or(ChainError::UnknownParent { parent: id })?
                    .height()
                    + 1
            }
            None => 0,
        };
        Ok(BlockNode::new(hash, height, parent, price_derivation))
    }

    /// Build a candidate node extending the current tip, without inserting it.
    pub fn candidate(
        &self,
        hash: Hash256,
        price_derivation: Option<f64>,
    ) -> Result<BlockNode, ChainError> {
        self.child_of(self.tip_id(), hash, price_derivation)
    }

    /// Insert a node into the arena. The best chain is left untouched.
    pub fn insert(&mut self, node: BlockNode) -> Result<NodeId, ChainError> {
        let expected = match node.parent() {
            Some(parent) => {
                self.node(parent)
                    .ok_or(ChainError::UnknownParent { parent })?
                    .height()
                    + 1
            }
            // only genesis has no parent
            None => 0,
        };
        if node.height() != expected {
            return Err(ChainError::HeightMismatch {
                expected,
                actual: node.height(),
            });
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Insert a node extending the tip and make it the new tip.
    pub fn connect(
        &mut self,
        hash: Hash256,
        price_derivation: Option<f64>,
    ) -> Result<NodeId, ChainError> {
        let node = self.candidate(hash, price_derivation)?;
        let id = self.insert(node)?;
        self.best.push(id);
        Ok(id)
    }

    /// Make `id` the best chain tip, rewriting the height lookup back to the fork point.
    pub fn set_tip(&mut self, id: NodeId) -> Result<(), ChainError> {
        let mut branch = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current).ok_or(ChainError::UnknownNode { id: current })?;
            let height = node.height() as usize;
            if self.best.get(height) == Some(&current) {
                break;
            }
            branch.push(current);
            cursor = node.parent();
        }

        let fork_height = match branch.last().and_then(|&first| self.node(first)) {
            Some(first) => first.height() as usize,
            // `id` is already on the best chain
            None => self.node(id).map_or(0, |node| node.height() as usize + 1),
        };
        let detached = self.best.len().saturating_sub(fork_height);
        self.best.truncate(fork_height);
        self.best.extend(branch.into_iter().rev());

        debug!(tip = %id, fork_height, detached, "Best chain tip updated");
        Ok(())
    }
}

impl ChainView for ChainIndex {
    fn tip_id(&self) -> Option<NodeId> {
        self.best.last().copied()
    }

    fn node(&self, id: NodeId) -> Option<&BlockNode> {
        self.nodes.get(id.index())
    }

    fn node_id_by_height(&self, height: Height) -> Option<NodeId> {
        usize::try_from(height)
            .ok()
            .and_then(|h| self.best.get(h))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(n: u8) -> Hash256 {
        let mut bytes = [0u8; 32];
        bytes[0] = n;
        Hash256::new(bytes)
    }

    fn linear(len: u8) -> ChainIndex {
        let mut index = ChainIndex::with_genesis(hash(0), None);
        for n in 1..len {
            index.connect(hash(n), Some(f64::from(n))).unwrap();
        }
        index
    }

    #[test]
    fn connect_extends_tip() {
        let index = linear(5);
        assert_eq!(index.best_height(), Some(4));
        assert_eq!(index.node_by_height(2).unwrap().hash(), &hash(2));
        assert!(index.node_by_height(5).is_none());
        assert!(index.node_by_height(-1).is_none());
    }

    #[test]
    fn ancestors_walk_to_genesis() {
        let index = linear(4);
        let tip = index.tip().unwrap();
        let heights: Vec<_> = index.ancestors(tip).map(BlockNode::height).collect();
        assert_eq!(heights, vec![3, 2, 1, 0]);
    }

    #[test]
    fn candidate_is_not_inserted() {
        let index = linear(3);
        let candidate = index.candidate(hash(9), None).unwrap();
        assert_eq!(candidate.height(), 3);
        assert_eq!(candidate.parent(), index.tip_id());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn insert_rejects_unknown_parent() {
        let mut index = linear(2);
        let orphan = BlockNode::new(hash(7), 5, Some(NodeId::new(42)), None);
        assert_eq!(
            index.insert(orphan),
            Err(ChainError::UnknownParent {
                parent: NodeId::new(42)
            })
        );
    }

    #[test]
    fn insert_rejects_parentless_node_above_genesis() {
        let mut index = linear(2);
        let stray = BlockNode::new(hash(57), 57, None, None);
        assert_eq!(
            index.insert(stray),
            Err(ChainError::HeightMismatch {
                expected: 0,
                actual: 57
            })
        );
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn set_tip_reorganizes_to_side_branch() {
        let mut index = linear(4);
        let fork = index.node_id_by_height(1).unwrap();

        let side1 = index.child_of(Some(fork), hash(21), Some(-1.0)).unwrap();
        let side1 = index.insert(side1).unwrap();
        let side2 = index.child_of(Some(side1), hash(22), Some(-2.0)).unwrap();
        let side2 = index.insert(side2).unwrap();
        let side3 = index.child_of(Some(side2), hash(23), None).unwrap();
        let side3 = index.insert(side3).unwrap();

        index.set_tip(side3).unwrap();
        assert_eq!(index.tip_id(), Some(side3));
        assert_eq!(index.best_height(), Some(4));
        assert_eq!(index.node_by_height(2).unwrap().hash(), &hash(22));
        assert_eq!(index.node_by_height(1).unwrap().hash(), &hash(1));
    }

    #[test]
    fn set_tip_rewinds_to_ancestor() {
        let mut index = linear(5);
        let ancestor = index.node_id_by_height(2).unwrap();
        index.set_tip(ancestor).unwrap();
        assert_eq!(index.best_height(), Some(2));
        assert!(index.node_by_height(3).is_none());
    }
}
