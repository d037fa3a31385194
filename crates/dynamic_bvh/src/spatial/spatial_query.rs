//! Abstract spatial query interface for broad-phase collision detection
//!
//! Collision systems talk to the broad phase through [`SpatialQuery`] with
//! position + radius pairs, so the partitioning scheme can be swapped
//! without touching them. The hierarchy implements it by mapping each
//! object to the cube enclosing its bounding sphere.

use std::any::Any;

use crate::foundation::math::Vec3;
use crate::geometry::{Aabb, BoundingSphere, Ray};
use crate::spatial::bvh::{BoundingVolumeHierarchy, ObjectId};

/// Abstract interface for spatial partitioning used in broad-phase collision detection
pub trait SpatialQuery: Send + Sync {
    /// Insert an object at a position with a bounding radius
    fn insert(&mut self, object_id: ObjectId, position: Vec3, radius: f32);

    /// Remove an object from the spatial structure
    fn remove(&mut self, object_id: ObjectId);

    /// Update an object's position in the spatial structure
    fn update(&mut self, object_id: ObjectId, position: Vec3, radius: f32);

    /// Query objects near a specific object, excluding the object itself
    fn query_nearby(&self, object_id: ObjectId) -> Vec<ObjectId>;

    /// Query objects within a sphere
    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<ObjectId>;

    /// Query objects within an AABB
    fn query_aabb(&self, aabb: &Aabb) -> Vec<ObjectId>;

    /// Query objects along a ray up to `max_distance`
    fn query_ray(&self, ray: &Ray, max_distance: f32) -> Vec<ObjectId>;

    /// Clear all objects from the spatial structure
    fn clear(&mut self);

    /// Get the number of objects in the structure
    fn entity_count(&self) -> usize;

    /// Get an object's stored position and bounding radius (if it exists)
    ///
    /// The radius is the largest half-extent of the stored bounds, so it
    /// includes any margin the structure added.
    fn get_entity_data(&self, object_id: ObjectId) -> Option<(Vec3, f32)>;

    /// Downcast to Any for type-specific access
    fn as_any(&self) -> &dyn Any;

    /// Downcast to Any for mutable type-specific access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

fn sphere_bounds(position: Vec3, radius: f32) -> Aabb {
    BoundingSphere::new(position, radius).to_aabb()
}

impl SpatialQuery for BoundingVolumeHierarchy {
    fn insert(&mut self, object_id: ObjectId, position: Vec3, radius: f32) {
        self.insert_default(object_id, &sphere_bounds(position, radius));
    }

    fn remove(&mut self, object_id: ObjectId) {
        Self::remove(self, object_id);
    }

    fn update(&mut self, object_id: ObjectId, position: Vec3, radius: f32) {
        self.move_default(object_id, &sphere_bounds(position, radius));
    }

    fn query_nearby(&self, object_id: ObjectId) -> Vec<ObjectId> {
        let Some(bounds) = self.fat_bounds(object_id) else {
            return Vec::new();
        };
        let mut nearby = self.bounded_object_ids_by_aabb(&bounds);
        nearby.retain(|&other| other != object_id);
        nearby
    }

    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<ObjectId> {
        self.bounded_object_ids_by_sphere(&BoundingSphere::new(center, radius))
    }

    fn query_aabb(&self, aabb: &Aabb) -> Vec<ObjectId> {
        self.bounded_object_ids_by_aabb(aabb)
    }

    fn query_ray(&self, ray: &Ray, max_distance: f32) -> Vec<ObjectId> {
        self.bounded_object_ids_by_ray(ray, max_distance)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn entity_count(&self) -> usize {
        self.size()
    }

    fn get_entity_data(&self, object_id: ObjectId) -> Option<(Vec3, f32)> {
        self.fat_bounds(object_id).map(|bounds| {
            let extents = bounds.extents();
            (bounds.center(), extents.x.max(extents.y).max(extents.z))
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
