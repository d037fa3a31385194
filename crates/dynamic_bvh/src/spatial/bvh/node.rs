//! Tree nodes and the index type used to link them

use crate::geometry::Aabb;

/// External identifier of an object stored in the hierarchy
///
/// Opaque to the tree; typically an entity or asset handle.
pub type ObjectId = u32;

/// Index of a node in the arena
///
/// Indices stay valid until the node is freed; freed slots are reused by
/// later allocations, so a `NodeId` must not outlive the mutation that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the arena
    pub const fn index(self) -> usize {
        self.0
    }

    /// Shift by `offset` slots, used when splicing separately built fragments
    pub(crate) const fn offset(self, offset: usize) -> Self {
        Self(self.0 + offset)
    }
}

/// Single node in the hierarchy
///
/// A node is a leaf iff it has no children. Leaves carry the object id and
/// the (fattened) object bounds; inner nodes carry the tight union of their
/// children's bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    /// Object stored in this node (leaves only)
    pub object_id: Option<ObjectId>,

    /// World-space bounds of this node
    pub bounds: Aabb,

    /// 0 for leaves, one more than the taller child otherwise
    pub height: u32,

    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,

    /// Left child, `None` for leaves
    pub left: Option<NodeId>,

    /// Right child, `None` for leaves
    pub right: Option<NodeId>,
}

impl Node {
    /// Create an unlinked leaf
    pub(crate) fn leaf(object_id: ObjectId, bounds: Aabb) -> Self {
        Self {
            object_id: Some(object_id),
            bounds,
            ..Self::default()
        }
    }

    /// Check if this node is a leaf (has no children)
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The child that is not `child`
    pub(crate) fn other_child(&self, child: NodeId) -> Option<NodeId> {
        if self.left == Some(child) {
            self.right
        } else {
            self.left
        }
    }

    /// Shift every link by `offset` slots
    pub(crate) fn offset_links(&mut self, offset: usize) {
        self.parent = self.parent.map(|id| id.offset(offset));
        self.left = self.left.map(|id| id.offset(offset));
        self.right = self.right.map(|id| id.offset(offset));
    }
}
