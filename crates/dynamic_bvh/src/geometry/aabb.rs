//! Axis-aligned bounding boxes

use serde::{Deserialize, Serialize};

use crate::foundation::math::utils::{max_components, min_components};
use crate::foundation::math::Vec3;

/// Result of a containment test between two volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentType {
    /// The volumes do not touch
    Disjoint,
    /// The volumes overlap but the other volume is not fully enclosed
    Intersects,
    /// The other volume lies entirely inside this one (faces inclusive)
    Contains,
}

/// Axis-Aligned Bounding Box for spatial queries
///
/// Overlap and containment are inclusive on faces, so touching boxes count
/// as intersecting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    ///
    /// Corners are reordered per axis, so a box given "inside out" still
    /// describes the same region.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min_components(&min, &max),
            max: max_components(&min, &max),
        }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Surface area of the box
    pub fn surface_area(&self) -> f32 {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Inflate the box by a uniform margin on every axis
    pub fn inflate(&self, margin: f32) -> Self {
        let delta = Vec3::new(margin, margin, margin);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Smallest box enclosing both `self` and `other`
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: min_components(&self.min, &other.min),
            max: max_components(&self.max, &other.max),
        }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Classify how `other` relates to this box
    pub fn contains(&self, other: &Self) -> ContainmentType {
        if !self.intersects(other) {
            return ContainmentType::Disjoint;
        }

        if other.min.x >= self.min.x && other.max.x <= self.max.x &&
           other.min.y >= self.min.y && other.max.y <= self.max.y &&
           other.min.z >= self.min.z && other.max.z <= self.max.z
        {
            ContainmentType::Contains
        } else {
            ContainmentType::Intersects
        }
    }
}
