//! Node arena with a free list for slot reuse

use std::ops::{Index, IndexMut};

use super::node::{Node, NodeId};

/// Growable node store with a free-index stack
///
/// Freed slots are cleared and recycled LIFO. Once every slot is free the
/// whole store is dropped, so churn cannot keep stale capacity alive.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    free_ids: Vec<NodeId>,
}

impl NodeArena {
    /// Wrap nodes produced by the static builder
    pub(crate) const fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            free_ids: Vec::new(),
        }
    }

    /// Get a fresh or recycled slot holding a default node
    pub(crate) fn allocate(&mut self) -> NodeId {
        if let Some(id) = self.free_ids.pop() {
            id
        } else {
            self.nodes.push(Node::default());
            NodeId::new(self.nodes.len() - 1)
        }
    }

    /// Clear a node and mark its slot free
    ///
    /// Returns `true` if this released the last live node and the arena was
    /// reset.
    pub(crate) fn free(&mut self, id: NodeId) -> bool {
        debug_assert!(id.index() < self.nodes.len(), "freeing out-of-range node {id:?}");
        debug_assert!(!self.free_ids.contains(&id), "double free of node {id:?}");

        self.nodes[id.index()] = Node::default();
        self.free_ids.push(id);

        if self.free_ids.len() == self.nodes.len() {
            self.nodes = Vec::new();
            self.free_ids = Vec::new();
            return true;
        }
        false
    }

    /// Drop every node and all capacity
    pub(crate) fn clear(&mut self) {
        self.nodes = Vec::new();
        self.free_ids = Vec::new();
    }

    /// Total slots, live and free
    pub(crate) fn capacity_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live nodes
    pub(crate) fn live_count(&self) -> usize {
        self.nodes.len() - self.free_ids.len()
    }

    /// Slots currently on the free stack
    pub(crate) fn free_ids(&self) -> &[NodeId] {
        &self.free_ids
    }

    /// Node at `id`, or `None` if out of range
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        debug_assert!(id.index() < self.nodes.len(), "node {id:?} out of range");
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        debug_assert!(id.index() < self.nodes.len(), "node {id:?} out of range");
        &mut self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_grows_then_recycles() {
        let mut arena = NodeArena::default();
        let a = arena.allocate();
        let b = arena.allocate();
        let c = arena.allocate();
        assert_eq!((a.index(), b.index(), c.index()), (0, 1, 2));

        arena[b].height = 4;
        assert!(!arena.free(b));
        assert_eq!(arena[b], Node::default());
        assert_eq!(arena.live_count(), 2);

        // LIFO reuse of freed slots
        assert!(!arena.free(a));
        assert_eq!(arena.allocate(), a);
        assert_eq!(arena.allocate(), b);
        assert_eq!(arena.allocate().index(), 3);
    }

    #[test]
    fn test_freeing_everything_resets_storage() {
        let mut arena = NodeArena::default();
        let ids: Vec<NodeId> = (0..4).map(|_| arena.allocate()).collect();

        for id in &ids[..3] {
            assert!(!arena.free(*id));
        }
        assert_eq!(arena.capacity_slots(), 4);

        assert!(arena.free(ids[3]));
        assert_eq!(arena.capacity_slots(), 0);
        assert!(arena.free_ids().is_empty());

        // Fresh allocations start from zero again.
        assert_eq!(arena.allocate().index(), 0);
    }

    #[test]
    fn test_get_out_of_range() {
        let arena = NodeArena::default();
        assert!(arena.get(NodeId::new(0)).is_none());
    }
}
