//! Structural invariant checks

use std::collections::HashSet;

use super::node::NodeId;
use super::{BoundingVolumeHierarchy, BvhError};

impl BoundingVolumeHierarchy {
    /// Check every structural invariant of the tree
    ///
    /// Verifies parent/child links, exact inner bounds, heights, leaf
    /// registration in the object index and that every arena slot is either
    /// reachable from the root or on the free list. Balance is checked
    /// separately by [`BoundingVolumeHierarchy::is_balanced`], since static
    /// SAH builds are not height balanced.
    ///
    /// # Errors
    ///
    /// Returns [`BvhError::Validation`] describing the first violation found.
    pub fn validate(&self) -> Result<(), BvhError> {
        let fail = |message: String| Err(BvhError::Validation(message));

        let Some(root_id) = self.root else {
            if !self.leaf_ids.is_empty() {
                return fail(format!("empty tree indexes {} objects", self.leaf_ids.len()));
            }
            if self.arena.live_count() != 0 {
                return fail(format!("empty tree holds {} live nodes", self.arena.live_count()));
            }
            return Ok(());
        };

        let Some(root) = self.arena.get(root_id) else {
            return fail(format!("root {root_id:?} out of range"));
        };
        if root.parent.is_some() {
            return fail(format!("root {root_id:?} has parent {:?}", root.parent));
        }

        let free: HashSet<NodeId> = self.arena.free_ids().iter().copied().collect();
        let mut visited = vec![false; self.arena.capacity_slots()];
        let mut visited_count = 0;
        let mut leaf_count = 0;
        let mut stack = vec![root_id];

        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.get(node_id) else {
                return fail(format!("link to out-of-range node {node_id:?}"));
            };
            if free.contains(&node_id) {
                return fail(format!("free node {node_id:?} is linked into the tree"));
            }
            if std::mem::replace(&mut visited[node_id.index()], true) {
                return fail(format!("node {node_id:?} reached twice"));
            }
            visited_count += 1;

            match (node.left, node.right) {
                (None, None) => {
                    let Some(object_id) = node.object_id else {
                        return fail(format!("leaf {node_id:?} has no object id"));
                    };
                    if node.height != 0 {
                        return fail(format!("leaf {node_id:?} has height {}", node.height));
                    }
                    if self.leaf_ids.get(&object_id) != Some(&node_id) {
                        return fail(format!(
                            "object {object_id} in leaf {node_id:?} is indexed at {:?}",
                            self.leaf_ids.get(&object_id)
                        ));
                    }
                    leaf_count += 1;
                }
                (Some(left_id), Some(right_id)) => {
                    if node.object_id.is_some() {
                        return fail(format!("inner node {node_id:?} carries object {:?}", node.object_id));
                    }
                    let (Some(left), Some(right)) = (self.arena.get(left_id), self.arena.get(right_id)) else {
                        return fail(format!("inner node {node_id:?} links out of range"));
                    };
                    if left.parent != Some(node_id) || right.parent != Some(node_id) {
                        return fail(format!("children of {node_id:?} do not link back"));
                    }
                    if node.bounds != left.bounds.union(&right.bounds) {
                        return fail(format!("bounds of {node_id:?} are not the union of its children"));
                    }
                    if node.height != left.height.max(right.height) + 1 {
                        return fail(format!(
                            "height of {node_id:?} is {} but children are {} and {}",
                            node.height, left.height, right.height
                        ));
                    }
                    stack.push(left_id);
                    stack.push(right_id);
                }
                _ => return fail(format!("inner node {node_id:?} has a single child")),
            }
        }

        if leaf_count != self.leaf_ids.len() {
            return fail(format!(
                "{leaf_count} leaves reachable but {} objects indexed",
                self.leaf_ids.len()
            ));
        }
        if visited_count + free.len() != self.arena.capacity_slots() {
            return fail(format!(
                "{visited_count} reachable and {} free nodes in {} slots",
                free.len(),
                self.arena.capacity_slots()
            ));
        }

        Ok(())
    }

    /// Whether sibling heights differ by at most one at every inner node
    pub fn is_balanced(&self) -> bool {
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(node_id) = stack.pop() {
            let node = &self.arena[node_id];
            if let (Some(left_id), Some(right_id)) = (node.left, node.right) {
                let left = i64::from(self.arena[left_id].height);
                let right = i64::from(self.arena[right_id].height);
                if (left - right).abs() > 1 {
                    return false;
                }
                stack.push(left_id);
                stack.push(right_id);
            }
        }
        true
    }

    /// Panic on a broken invariant in debug builds
    pub fn debug_validate(&self) {
        if cfg!(debug_assertions) {
            if let Err(err) = self.validate() {
                log::error!("{err}");
                panic!("{err}");
            }
        }
    }
}
