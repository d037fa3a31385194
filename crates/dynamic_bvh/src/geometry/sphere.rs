//! Bounding spheres

use crate::foundation::math::utils::clamp_components;
use crate::foundation::math::Vec3;

use super::aabb::Aabb;

/// A bounding sphere for proximity queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.abs() }
    }

    /// Check if this sphere intersects with another
    pub fn intersects_sphere(&self, other: &Self) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if this sphere touches an AABB
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        let closest_point = clamp_components(&self.center, &aabb.min, &aabb.max);
        (closest_point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Tight AABB around the sphere
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::new(self.radius, self.radius, self.radius))
    }
}
