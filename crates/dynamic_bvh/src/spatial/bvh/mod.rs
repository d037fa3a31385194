//! Dynamic bounding volume hierarchy
//!
//! A binary tree of AABBs stored in an index arena. Objects can be bulk
//! loaded with a top-down builder or inserted, moved and removed one at a
//! time; both paths produce the same node layout and share the query code.
//!
//! # Module Organization
//!
//! - [`node`] - Node layout and the arena index type
//! - `arena` - Node storage with free-list reuse
//! - `dynamic` - Insert, move, remove, refit and AVL-style rotations
//! - [`build`] - Static top-down construction strategies
//! - `query` - Stack-based candidate queries
//! - `validate` - Invariant checks for debugging and tests
//!
//! The tree is not internally synchronized. Mutators take `&mut self` and
//! queries take `&self`; share it across threads behind a `RwLock`.
//!
//! References:
//! - Erin Catto, "Dynamic Bounding Volume Hierarchies", GDC 2019
//! - Box2D `b2DynamicTree`

mod arena;
pub mod build;
mod dynamic;
pub mod node;
mod query;
mod validate;

use std::collections::HashMap;

use crate::config::BvhConfig;
use crate::geometry::Aabb;

use arena::NodeArena;

pub use build::{choose_split, BuildExecutor, BuildStrategy, SequentialExecutor};
pub use node::{Node, NodeId, ObjectId};

/// Errors reported by the hierarchy
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BvhError {
    /// The parallel id and AABB arrays passed to a constructor differ in length
    #[error("Object ID count ({ids}) does not match AABB count ({aabbs})")]
    LengthMismatch {
        /// Number of object ids supplied
        ids: usize,
        /// Number of AABBs supplied
        aabbs: usize,
    },

    /// An internal invariant does not hold
    #[error("BVH invariant violated: {0}")]
    Validation(String),
}

/// Dynamic bounding volume hierarchy using AABBs
#[derive(Debug, Clone, Default)]
pub struct BoundingVolumeHierarchy {
    /// Node storage
    arena: NodeArena,

    /// Object id to leaf node
    leaf_ids: HashMap<ObjectId, NodeId>,

    /// Root node, `None` when empty
    root: Option<NodeId>,

    /// Tuning parameters
    config: BvhConfig,
}

impl BoundingVolumeHierarchy {
    /// Create an empty hierarchy with default configuration
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an empty hierarchy with the given configuration
    pub fn with_config(config: BvhConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current configuration
    pub const fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Replace the configuration; affects subsequent operations only
    pub fn set_config(&mut self, config: BvhConfig) {
        self.config = config;
    }

    /// Number of objects in the tree
    pub fn size(&self) -> usize {
        self.leaf_ids.len()
    }

    /// Whether the tree holds no objects
    pub fn is_empty(&self) -> bool {
        self.leaf_ids.is_empty()
    }

    /// Whether `object_id` is stored in the tree
    pub fn contains(&self, object_id: ObjectId) -> bool {
        self.leaf_ids.contains_key(&object_id)
    }

    /// Height of the root (0 for a single leaf), `None` when empty
    pub fn height(&self) -> Option<u32> {
        self.root.map(|root| self.arena[root].height)
    }

    /// Number of live nodes, leaves and inner nodes together
    pub fn node_count(&self) -> usize {
        self.arena.live_count()
    }

    /// Root node index
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Bounds of the whole tree
    pub fn root_bounds(&self) -> Option<Aabb> {
        self.root.map(|root| self.arena[root].bounds)
    }

    /// Node at `id`, if the index is in range
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Leaf node holding `object_id`
    pub fn leaf_id(&self, object_id: ObjectId) -> Option<NodeId> {
        self.leaf_ids.get(&object_id).copied()
    }

    /// Stored (fattened) bounds of `object_id`
    pub fn fat_bounds(&self, object_id: ObjectId) -> Option<Aabb> {
        self.leaf_id(object_id).map(|leaf_id| self.arena[leaf_id].bounds)
    }

    /// Remove every object and release all node storage
    pub fn clear(&mut self) {
        self.arena.clear();
        self.leaf_ids.clear();
        self.root = None;
    }

    /// Run the invariant check after a mutation when configured to
    fn after_mutation(&self) {
        if cfg!(debug_assertions) && self.config.validate_mutations {
            self.debug_validate();
        }
    }
}
