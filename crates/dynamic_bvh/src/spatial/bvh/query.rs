//! Candidate queries
//!
//! Every query walks the tree depth-first with an explicit stack and prunes
//! subtrees whose bounds fail the volume test. Results are candidates for a
//! narrow phase: they overlap the stored (possibly fattened) leaf bounds, in
//! no particular order.

use crate::geometry::{Aabb, BoundingSphere, OrientedBoundingBox, Ray};

use super::node::ObjectId;
use super::BoundingVolumeHierarchy;

impl BoundingVolumeHierarchy {
    /// All object ids in the tree
    pub fn bounded_object_ids(&self) -> Vec<ObjectId> {
        self.leaf_ids.keys().copied().collect()
    }

    /// Objects whose bounds are hit by `ray` no further than `max_distance`
    pub fn bounded_object_ids_by_ray(&self, ray: &Ray, max_distance: f32) -> Vec<ObjectId> {
        self.bounded_object_ids_by(|bounds| {
            ray.intersects(bounds)
                .is_some_and(|distance| distance <= max_distance)
        })
    }

    /// Objects whose bounds overlap `aabb`
    pub fn bounded_object_ids_by_aabb(&self, aabb: &Aabb) -> Vec<ObjectId> {
        self.bounded_object_ids_by(|bounds| aabb.intersects(bounds))
    }

    /// Objects whose bounds overlap `obb`
    pub fn bounded_object_ids_by_obb(&self, obb: &OrientedBoundingBox) -> Vec<ObjectId> {
        // Cheap reject against the enclosing box before the full SAT.
        let obb_bounds = obb.to_aabb();
        self.bounded_object_ids_by(|bounds| obb_bounds.intersects(bounds) && obb.intersects(bounds))
    }

    /// Objects whose bounds overlap `sphere`
    pub fn bounded_object_ids_by_sphere(&self, sphere: &BoundingSphere) -> Vec<ObjectId> {
        self.bounded_object_ids_by(|bounds| sphere.intersects(bounds))
    }

    /// Objects reached by descending only into nodes whose bounds pass `test`
    ///
    /// `test` must be conservative: if it rejects a node's bounds it must
    /// also reject every box inside them.
    pub fn bounded_object_ids_by<F>(&self, mut test: F) -> Vec<ObjectId>
    where
        F: FnMut(&Aabb) -> bool,
    {
        let mut object_ids = Vec::new();
        let mut stack = Vec::with_capacity(64);
        stack.extend(self.root);

        while let Some(node_id) = stack.pop() {
            let node = &self.arena[node_id];
            if !test(&node.bounds) {
                continue;
            }

            if let Some(object_id) = node.object_id {
                object_ids.push(object_id);
            } else {
                stack.extend(node.left);
                stack.extend(node.right);
            }
        }

        object_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::spatial::bvh::BuildStrategy;

    fn unit_box_at(x: f32) -> Aabb {
        Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0))
    }

    fn span(min_x: f32, max_x: f32) -> Aabb {
        Aabb::new(Vec3::new(min_x, -1.0, -1.0), Vec3::new(max_x, 2.0, 2.0))
    }

    fn three_boxes() -> BoundingVolumeHierarchy {
        let mut bvh = BoundingVolumeHierarchy::default();
        bvh.insert(1, &unit_box_at(0.0), 0.0);
        bvh.insert(2, &unit_box_at(10.0), 0.0);
        bvh.insert(3, &unit_box_at(20.0), 0.0);
        bvh
    }

    fn sorted(mut ids: Vec<ObjectId>) -> Vec<ObjectId> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_aabb_query_three_boxes() {
        let bvh = three_boxes();
        assert_eq!(bvh.size(), 3);
        assert_eq!(sorted(bvh.bounded_object_ids_by_aabb(&span(-1.0, 21.0))), vec![1, 2, 3]);
        assert!(bvh.bounded_object_ids_by_aabb(&span(5.0, 6.0)).is_empty());
        assert_eq!(bvh.bounded_object_ids_by_aabb(&span(10.5, 10.6)), vec![2]);
    }

    #[test]
    fn test_touching_faces_count() {
        let bvh = three_boxes();
        assert_eq!(bvh.bounded_object_ids_by_aabb(&span(11.0, 12.0)), vec![2]);
    }

    #[test]
    fn test_all_ids() {
        let bvh = three_boxes();
        assert_eq!(sorted(bvh.bounded_object_ids()), vec![1, 2, 3]);
        assert!(BoundingVolumeHierarchy::default().bounded_object_ids().is_empty());
    }

    #[test]
    fn test_ray_query_respects_max_distance() {
        let bvh = three_boxes();
        let ray = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(sorted(bvh.bounded_object_ids_by_ray(&ray, 100.0)), vec![1, 2, 3]);
        // Entry distances are 5, 15 and 25.
        assert_eq!(sorted(bvh.bounded_object_ids_by_ray(&ray, 15.0)), vec![1, 2]);
        assert!(bvh.bounded_object_ids_by_ray(&ray, 4.0).is_empty());

        let backwards = Ray::new(Vec3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(bvh.bounded_object_ids_by_ray(&backwards, 100.0).is_empty());
    }

    #[test]
    fn test_ray_from_inside_hits_at_zero() {
        let bvh = three_boxes();
        let ray = Ray::new(Vec3::new(10.5, 0.5, 0.5), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(bvh.bounded_object_ids_by_ray(&ray, 0.0), vec![2]);
    }

    #[test]
    fn test_sphere_query() {
        let bvh = three_boxes();
        let sphere = BoundingSphere::new(Vec3::new(12.0, 0.5, 0.5), 1.5);
        assert_eq!(bvh.bounded_object_ids_by_sphere(&sphere), vec![2]);

        let miss = BoundingSphere::new(Vec3::new(15.5, 0.5, 0.5), 1.0);
        assert!(bvh.bounded_object_ids_by_sphere(&miss).is_empty());
    }

    #[test]
    fn test_obb_query() {
        let bvh = three_boxes();
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_4);

        let hit = OrientedBoundingBox::new(Vec3::new(10.5, 0.5, 0.5), Vec3::new(3.0, 0.2, 0.2), rotation);
        assert_eq!(bvh.bounded_object_ids_by_obb(&hit), vec![2]);

        let miss = OrientedBoundingBox::new(Vec3::new(15.0, 5.0, 0.5), Vec3::new(2.0, 0.2, 0.2), rotation);
        assert!(bvh.bounded_object_ids_by_obb(&miss).is_empty());
    }

    #[test]
    fn test_custom_predicate() {
        let items: Vec<(ObjectId, Aabb)> = (0..10).map(|id| (id, unit_box_at(id as f32 * 2.0))).collect();
        let bvh = BoundingVolumeHierarchy::from_items(&items, BuildStrategy::Fast);
        let mut visited = 0;
        let ids = bvh.bounded_object_ids_by(|bounds| {
            visited += 1;
            bounds.max.x >= 15.0
        });
        assert_eq!(sorted(ids), vec![7, 8, 9]);
        assert!(visited < bvh.node_count());
    }

    #[test]
    fn test_fat_bounds_are_candidates() {
        let mut bvh = BoundingVolumeHierarchy::default();
        bvh.insert(1, &unit_box_at(0.0), 0.5);
        // Misses the tight box but hits the fattened one.
        assert_eq!(bvh.bounded_object_ids_by_aabb(&span(1.2, 1.4)), vec![1]);
        assert!(bvh.bounded_object_ids_by_aabb(&span(1.6, 1.8)).is_empty());
    }
}
