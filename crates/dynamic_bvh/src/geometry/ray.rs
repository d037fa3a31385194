//! Rays for ray casting and picking

use crate::foundation::math::Vec3;

use super::aabb::Aabb;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized, or zero for a degenerate ray)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// A zero-length direction yields a degenerate ray that behaves like a
    /// point test at `origin`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
        }
    }

    /// Test ray intersection with an AABB using the slab method
    ///
    /// Returns the distance to the entry point (0 if the origin is inside the
    /// box), or `None` if the box is missed or lies behind the origin.
    pub fn intersects(&self, aabb: &Aabb) -> Option<f32> {
        if self.direction == Vec3::zeros() {
            return aabb.contains_point(&self.origin).then_some(0.0);
        }

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (slab_min, slab_max) = (aabb.min[axis], aabb.max[axis]);

            if dir == 0.0 {
                // Parallel to this slab: miss unless the origin is between its planes.
                if origin < slab_min || origin > slab_max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / dir;
            let t1 = (slab_min - origin) * inv_dir;
            let t2 = (slab_max - origin) * inv_dir;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}
