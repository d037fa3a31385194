//! Incremental maintenance: insert, move, remove, refit and rotations

use crate::geometry::{Aabb, ContainmentType};

use super::node::{Node, NodeId, ObjectId};
use super::BoundingVolumeHierarchy;

impl BoundingVolumeHierarchy {
    /// Insert an object with its tight bounds, fattened by `margin`
    ///
    /// Inserting an id that is already present logs a warning and does
    /// nothing. Negative margins are treated as zero.
    pub fn insert(&mut self, object_id: ObjectId, aabb: &Aabb, margin: f32) {
        if self.leaf_ids.contains_key(&object_id) {
            log::warn!("BVH: Attempted to insert leaf with existing object ID {object_id}");
            return;
        }

        let leaf_id = self.arena.allocate();
        self.arena[leaf_id] = Node::leaf(object_id, aabb.inflate(margin.max(0.0)));
        self.insert_leaf(leaf_id);
        self.leaf_ids.insert(object_id, leaf_id);

        self.after_mutation();
    }

    /// Insert using the configured default margin
    pub fn insert_default(&mut self, object_id: ObjectId, aabb: &Aabb) {
        self.insert(object_id, aabb, self.config.default_margin);
    }

    /// Update an object's bounds
    ///
    /// If the stored fat bounds still contain `aabb` and are less than
    /// `2 * margin` larger on every axis, nothing changes. Otherwise the leaf
    /// is removed and reinserted with freshly fattened bounds. Unknown ids log
    /// a warning and do nothing.
    pub fn move_object(&mut self, object_id: ObjectId, aabb: &Aabb, margin: f32) {
        let Some(&leaf_id) = self.leaf_ids.get(&object_id) else {
            log::warn!("BVH: Attempted to move missing leaf with object ID {object_id}");
            return;
        };

        let fat_bounds = &self.arena[leaf_id].bounds;
        if fat_bounds.contains(aabb) == ContainmentType::Contains {
            let slack = fat_bounds.extents() - aabb.extents();
            let threshold = margin * 2.0;
            if slack.x < threshold && slack.y < threshold && slack.z < threshold {
                return;
            }
        }

        self.remove_leaf(leaf_id);
        self.insert(object_id, aabb, margin);
    }

    /// Move using the configured default margin
    pub fn move_default(&mut self, object_id: ObjectId, aabb: &Aabb) {
        self.move_object(object_id, aabb, self.config.default_margin);
    }

    /// Remove an object, pruning its parent
    ///
    /// Unknown ids log a warning and do nothing.
    pub fn remove(&mut self, object_id: ObjectId) {
        let Some(&leaf_id) = self.leaf_ids.get(&object_id) else {
            log::warn!("BVH: Attempted to remove missing leaf with object ID {object_id}");
            return;
        };

        self.remove_leaf(leaf_id);
        self.after_mutation();
    }

    /// Branch and bound descent for the cheapest sibling of a new leaf
    fn best_sibling(&self, root_id: NodeId, leaf_bounds: &Aabb) -> NodeId {
        // Every ancestor of the new leaf grows by at least the leaf's area.
        let inherit_cost = leaf_bounds.surface_area() * 2.0;

        let descend_cost = |child_id: Option<NodeId>| -> f32 {
            child_id.map_or(f32::INFINITY, |child_id| {
                let child = &self.arena[child_id];
                let merged_area = child.bounds.union(leaf_bounds).surface_area();
                if child.is_leaf() {
                    merged_area + inherit_cost
                } else {
                    (merged_area - child.bounds.surface_area()) + inherit_cost
                }
            })
        };

        let mut sibling_id = root_id;
        loop {
            let sibling = &self.arena[sibling_id];
            if sibling.is_leaf() {
                break;
            }

            // Cost of pairing the new leaf with this whole subtree.
            let cost = sibling.bounds.union(leaf_bounds).surface_area() * 2.0;
            let left_cost = descend_cost(sibling.left);
            let right_cost = descend_cost(sibling.right);

            if cost < left_cost && cost < right_cost {
                break;
            }

            let next = if left_cost < right_cost {
                sibling.left
            } else {
                sibling.right
            };
            match next {
                Some(next_id) => sibling_id = next_id,
                None => {
                    log::warn!("BVH: Sibling leaf search failed at node {sibling_id:?}");
                    break;
                }
            }
        }

        sibling_id
    }

    /// Link an allocated, unlinked leaf into the tree
    fn insert_leaf(&mut self, leaf_id: NodeId) {
        let Some(root_id) = self.root else {
            self.root = Some(leaf_id);
            return;
        };

        let parent_id = self.arena.allocate();
        let sibling_id = self.best_sibling(root_id, &self.arena[leaf_id].bounds);

        let sibling = &self.arena[sibling_id];
        let prev_parent_id = sibling.parent;
        let bounds = sibling.bounds.union(&self.arena[leaf_id].bounds);
        let height = sibling.height + 1;
        self.arena[parent_id] = Node {
            object_id: None,
            bounds,
            height,
            parent: prev_parent_id,
            left: Some(sibling_id),
            right: Some(leaf_id),
        };
        self.arena[sibling_id].parent = Some(parent_id);
        self.arena[leaf_id].parent = Some(parent_id);

        match prev_parent_id {
            Some(prev_parent_id) => self.replace_child(prev_parent_id, sibling_id, parent_id),
            None => self.root = Some(parent_id),
        }

        self.refit(leaf_id);
    }

    /// Unlink and free a leaf, promoting its sibling into the parent's place
    pub(super) fn remove_leaf(&mut self, leaf_id: NodeId) {
        let leaf = &self.arena[leaf_id];
        let parent_id = leaf.parent;
        if let Some(object_id) = leaf.object_id {
            self.leaf_ids.remove(&object_id);
        }

        let Some(parent_id) = parent_id else {
            self.root = None;
            self.free_node(leaf_id);
            return;
        };

        let parent = &self.arena[parent_id];
        let sibling_id = parent.other_child(leaf_id);
        let grandparent_id = parent.parent;
        self.free_node(leaf_id);

        let Some(sibling_id) = sibling_id else {
            log::error!("BVH: Inner node {parent_id:?} has a single child");
            debug_assert!(sibling_id.is_some(), "inner node {parent_id:?} must have two children");
            return;
        };

        self.arena[sibling_id].parent = grandparent_id;
        match grandparent_id {
            Some(grandparent_id) => self.replace_child(grandparent_id, parent_id, sibling_id),
            None => self.root = Some(sibling_id),
        }
        self.free_node(parent_id);

        self.refit(sibling_id);
    }

    /// Walk from `node_id`'s parent to the root, rebalancing and refitting
    pub(super) fn refit(&mut self, node_id: NodeId) {
        let mut parent_id = self.arena[node_id].parent;
        while let Some(id) = parent_id {
            let subtree_root = self.balance(id);
            self.update_from_children(subtree_root);
            parent_id = self.arena[subtree_root].parent;
        }
    }

    /// Rotate the taller child up if the children differ in height by more than one
    ///
    /// Returns the root of the (possibly new) subtree.
    fn balance(&mut self, node_id: NodeId) -> NodeId {
        let node = &self.arena[node_id];
        let (Some(left_id), Some(right_id)) = (node.left, node.right) else {
            return node_id;
        };

        let balance = i64::from(self.arena[right_id].height) - i64::from(self.arena[left_id].height);
        if balance > 1 {
            self.rotate_up(node_id, right_id)
        } else if balance < -1 {
            self.rotate_up(node_id, left_id)
        } else {
            node_id
        }
    }

    /// Promote `pivot_id` into `node_id`'s place
    ///
    /// The pivot keeps its taller child and takes the old node as its left
    /// child; the old node takes the pivot's shorter child in the slot the
    /// pivot vacated. If that leaves the demoted node lopsided (possible when
    /// a leaf was paired with a tall subtree) it is rebalanced in turn.
    fn rotate_up(&mut self, node_id: NodeId, pivot_id: NodeId) -> NodeId {
        let pivot = &self.arena[pivot_id];
        let (Some(first_id), Some(second_id)) = (pivot.left, pivot.right) else {
            return node_id;
        };

        let (taller_id, shorter_id) = if self.arena[first_id].height > self.arena[second_id].height {
            (first_id, second_id)
        } else {
            (second_id, first_id)
        };
        let former_parent_id = self.arena[node_id].parent;

        // Swap node and pivot.
        self.replace_child(node_id, pivot_id, shorter_id);
        self.arena[shorter_id].parent = Some(node_id);
        self.arena[node_id].parent = Some(pivot_id);

        let pivot = &mut self.arena[pivot_id];
        pivot.parent = former_parent_id;
        pivot.left = Some(node_id);
        pivot.right = Some(taller_id);

        match former_parent_id {
            Some(former_parent_id) => self.replace_child(former_parent_id, node_id, pivot_id),
            None => self.root = Some(pivot_id),
        }

        self.update_from_children(node_id);
        self.balance(node_id);
        self.update_from_children(pivot_id);

        log::trace!("BVH: Rotated node {pivot_id:?} above {node_id:?}");
        pivot_id
    }

    /// Recompute bounds and height of an inner node from its children
    fn update_from_children(&mut self, node_id: NodeId) {
        let node = &self.arena[node_id];
        let (bounds, height) = match (node.left, node.right) {
            (Some(left_id), Some(right_id)) => {
                let left = &self.arena[left_id];
                let right = &self.arena[right_id];
                (left.bounds.union(&right.bounds), left.height.max(right.height) + 1)
            }
            (Some(child_id), None) | (None, Some(child_id)) => {
                let child = &self.arena[child_id];
                (child.bounds, child.height + 1)
            }
            (None, None) => return,
        };

        let node = &mut self.arena[node_id];
        node.bounds = bounds;
        node.height = height;
    }

    /// Point `parent_id`'s link to `old_child` at `new_child`
    fn replace_child(&mut self, parent_id: NodeId, old_child: NodeId, new_child: NodeId) {
        let parent = &mut self.arena[parent_id];
        if parent.left == Some(old_child) {
            parent.left = Some(new_child);
        } else {
            debug_assert_eq!(parent.right, Some(old_child), "{old_child:?} is not a child of {parent_id:?}");
            parent.right = Some(new_child);
        }
    }

    /// Free a slot, logging when the arena resets
    fn free_node(&mut self, node_id: NodeId) {
        if self.arena.free(node_id) {
            log::debug!("BVH: All nodes released, node storage reset");
        }
    }
}
