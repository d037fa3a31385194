//! Top-down static construction
//!
//! Objects are split recursively in the order given; the strategy only
//! decides where each range is cut. Nodes are appended leaves-before-parents
//! so the last node written is the root.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::BvhConfig;
use crate::geometry::Aabb;

use super::arena::NodeArena;
use super::node::{Node, NodeId, ObjectId};
use super::{BoundingVolumeHierarchy, BvhError};

/// Ranges at least this large are handed to the executor as two fragments
const PARALLEL_THRESHOLD: usize = 1024;

/// Split selection used by the static builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BuildStrategy {
    /// Cut every range at its midpoint
    Fast,
    /// Surface area heuristic over a window around the midpoint
    #[default]
    Balanced,
    /// Surface area heuristic over every cut position
    Accurate,
}

impl BuildStrategy {
    /// Half-width of the candidate window searched by [`BuildStrategy::Balanced`]
    pub const DEFAULT_BALANCED_WINDOW: usize = 10;
}

/// Runs two independent build jobs, possibly in parallel
///
/// The builder never spawns threads itself; callers that want a parallel
/// build pass an executor backed by their own thread pool or scoped threads.
pub trait BuildExecutor: Sync {
    /// Run `a` and `b` and return both results
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send;
}

/// Executor that runs both jobs on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl BuildExecutor for SequentialExecutor {
    fn join<A, B, RA, RB>(&self, a: A, b: B) -> (RA, RB)
    where
        A: FnOnce() -> RA + Send,
        B: FnOnce() -> RB + Send,
        RA: Send,
        RB: Send,
    {
        (a(), b())
    }
}

/// Pick the cut position for a range of at least two boxes
///
/// Returns `split` in `1..bounds.len()`; the left part is `bounds[..split]`.
/// SAH candidates are scored as `area(left) * |left| + area(right) * |right|`;
/// the first strictly cheapest candidate wins and the midpoint is kept when
/// no candidate has a finite cost.
pub fn choose_split(bounds: &[Aabb], strategy: BuildStrategy, window: usize) -> usize {
    let len = bounds.len();
    debug_assert!(len >= 2, "cannot split a range of {len} boxes");
    let mid = len / 2;

    let (first, end) = match strategy {
        BuildStrategy::Fast => return mid.max(1),
        BuildStrategy::Balanced => (mid.saturating_sub(window).max(1), (mid + window).min(len)),
        BuildStrategy::Accurate => (1, len),
    };

    // prefix[i] bounds bounds[..=i], suffix[i] bounds bounds[i..]
    let prefix: Vec<Aabb> = bounds
        .iter()
        .scan(None, |acc: &mut Option<Aabb>, aabb| {
            let merged = acc.map_or(*aabb, |acc| acc.union(aabb));
            *acc = Some(merged);
            Some(merged)
        })
        .collect();
    let mut suffix: Vec<Aabb> = bounds
        .iter()
        .rev()
        .scan(None, |acc: &mut Option<Aabb>, aabb| {
            let merged = acc.map_or(*aabb, |acc| acc.union(aabb));
            *acc = Some(merged);
            Some(merged)
        })
        .collect();
    suffix.reverse();

    let mut best_split = mid;
    let mut best_cost = f32::INFINITY;
    for split in first..end {
        let left_area = prefix[split - 1].surface_area();
        let right_area = suffix[split].surface_area();
        let cost = left_area * split as f32 + right_area * (len - split) as f32;
        if cost < best_cost {
            best_split = split;
            best_cost = cost;
        }
    }

    best_split
}

/// Append the subtree for `ids`/`bounds` to `nodes`, returning its root
fn build_range(
    ids: &[ObjectId],
    bounds: &[Aabb],
    strategy: BuildStrategy,
    window: usize,
    nodes: &mut Vec<Node>,
) -> NodeId {
    if let ([id], [aabb]) = (ids, bounds) {
        nodes.push(Node::leaf(*id, *aabb));
        return NodeId::new(nodes.len() - 1);
    }

    let split = choose_split(bounds, strategy, window);
    let left_id = build_range(&ids[..split], &bounds[..split], strategy, window, nodes);
    let right_id = build_range(&ids[split..], &bounds[split..], strategy, window, nodes);

    push_parent(nodes, left_id, right_id)
}

/// Build a self-contained fragment whose root is its last node
///
/// Large ranges build their halves through `executor` and splice the right
/// fragment after the left one, which reproduces the sequential layout.
fn build_fragment<E: BuildExecutor>(
    ids: &[ObjectId],
    bounds: &[Aabb],
    strategy: BuildStrategy,
    window: usize,
    executor: &E,
) -> Vec<Node> {
    if ids.len() < PARALLEL_THRESHOLD {
        let mut nodes = Vec::with_capacity(ids.len() * 2 - 1);
        build_range(ids, bounds, strategy, window, &mut nodes);
        return nodes;
    }

    let split = choose_split(bounds, strategy, window);
    let (left, right) = executor.join(
        || build_fragment(&ids[..split], &bounds[..split], strategy, window, executor),
        || build_fragment(&ids[split..], &bounds[split..], strategy, window, executor),
    );

    let offset = left.len();
    let mut nodes = left;
    nodes.reserve(right.len() + 1);
    nodes.extend(right.into_iter().map(|mut node| {
        node.offset_links(offset);
        node
    }));

    let left_id = NodeId::new(offset - 1);
    let right_id = NodeId::new(nodes.len() - 1);
    push_parent(&mut nodes, left_id, right_id);
    nodes
}

/// Append an inner node over two already built subtrees
fn push_parent(nodes: &mut Vec<Node>, left_id: NodeId, right_id: NodeId) -> NodeId {
    let parent_id = NodeId::new(nodes.len());
    let left = &nodes[left_id.index()];
    let right = &nodes[right_id.index()];
    let parent = Node {
        object_id: None,
        bounds: left.bounds.union(&right.bounds),
        height: left.height.max(right.height) + 1,
        parent: None,
        left: Some(left_id),
        right: Some(right_id),
    };

    nodes[left_id.index()].parent = Some(parent_id);
    nodes[right_id.index()].parent = Some(parent_id);
    nodes.push(parent);
    parent_id
}

/// Split items into parallel arrays, keeping the first occurrence of each id
fn dedup_items(items: impl IntoIterator<Item = (ObjectId, Aabb)>) -> (Vec<ObjectId>, Vec<Aabb>) {
    let items = items.into_iter();
    let (lower, _) = items.size_hint();
    let mut seen = HashSet::with_capacity(lower);
    let mut ids = Vec::with_capacity(lower);
    let mut bounds = Vec::with_capacity(lower);

    for (id, aabb) in items {
        if seen.insert(id) {
            ids.push(id);
            bounds.push(aabb);
        } else {
            log::warn!("BVH: Skipping duplicate object ID {id} in static build");
        }
    }

    (ids, bounds)
}

impl BoundingVolumeHierarchy {
    /// Build a tree from parallel id and AABB arrays
    ///
    /// Leaves store the given AABBs without a margin. Duplicate ids keep
    /// their first AABB and log a warning.
    ///
    /// # Errors
    ///
    /// Returns [`BvhError::LengthMismatch`] if the arrays differ in length.
    pub fn new(
        object_ids: &[ObjectId],
        aabbs: &[Aabb],
        strategy: BuildStrategy,
    ) -> Result<Self, BvhError> {
        if object_ids.len() != aabbs.len() {
            return Err(BvhError::LengthMismatch {
                ids: object_ids.len(),
                aabbs: aabbs.len(),
            });
        }

        let (ids, bounds) = dedup_items(object_ids.iter().copied().zip(aabbs.iter().copied()));
        let config = BvhConfig {
            build_strategy: strategy,
            ..BvhConfig::default()
        };
        Ok(Self::from_parts(&ids, &bounds, config, &SequentialExecutor))
    }

    /// Build a tree from `(id, aabb)` pairs
    pub fn from_items(items: &[(ObjectId, Aabb)], strategy: BuildStrategy) -> Self {
        Self::build_with(items, strategy, &SequentialExecutor)
    }

    /// Build a tree, running large independent subtrees through `executor`
    ///
    /// The result is identical to [`BoundingVolumeHierarchy::from_items`].
    pub fn build_with<E: BuildExecutor>(
        items: &[(ObjectId, Aabb)],
        strategy: BuildStrategy,
        executor: &E,
    ) -> Self {
        let (ids, bounds) = dedup_items(items.iter().copied());
        let config = BvhConfig {
            build_strategy: strategy,
            ..BvhConfig::default()
        };
        Self::from_parts(&ids, &bounds, config, executor)
    }

    /// Rebuild the whole tree from its current leaves
    ///
    /// Leaves keep their stored (fattened) bounds. They are ordered along the
    /// widest axis of the root bounds and split with the configured strategy.
    pub fn rebuild(&mut self) {
        let Some(root_bounds) = self.root_bounds() else {
            return;
        };

        let size = root_bounds.size();
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };

        let mut items: Vec<(ObjectId, Aabb)> = self
            .leaf_ids
            .iter()
            .map(|(&object_id, &leaf_id)| (object_id, self.arena[leaf_id].bounds))
            .collect();
        items.sort_by(|(id_a, a), (id_b, b)| {
            a.center()[axis]
                .total_cmp(&b.center()[axis])
                .then(id_a.cmp(id_b))
        });

        let (ids, bounds): (Vec<ObjectId>, Vec<Aabb>) = items.into_iter().unzip();
        let height_before = self.height();
        *self = Self::from_parts(&ids, &bounds, self.config.clone(), &SequentialExecutor);

        log::debug!(
            "BVH: Rebuilt {} leaves, height {:?} -> {:?}",
            self.size(),
            height_before,
            self.height()
        );
        self.after_mutation();
    }

    /// Assemble a tree from deduplicated parallel arrays
    fn from_parts<E: BuildExecutor>(
        ids: &[ObjectId],
        bounds: &[Aabb],
        config: BvhConfig,
        executor: &E,
    ) -> Self {
        if ids.is_empty() {
            return Self::with_config(config);
        }

        let nodes = build_fragment(
            ids,
            bounds,
            config.build_strategy,
            config.balanced_window,
            executor,
        );

        let leaf_ids = nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.object_id.map(|id| (id, NodeId::new(index))))
            .collect();
        let root = NodeId::new(nodes.len() - 1);

        let bvh = Self {
            arena: NodeArena::from_nodes(nodes),
            leaf_ids,
            root: Some(root),
            config,
        };
        bvh.after_mutation();
        bvh
    }
}
