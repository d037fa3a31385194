//! Oriented bounding boxes

use crate::foundation::math::{Mat3, Quat, Vec3};

use super::aabb::Aabb;

/// An oriented bounding box: a box with its own rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    /// Center of the box in world space
    pub center: Vec3,
    /// Half-size along each local axis
    pub extents: Vec3,
    /// Rotation from local to world space
    pub rotation: Quat,
}

impl OrientedBoundingBox {
    /// Creates a new oriented box
    pub fn new(center: Vec3, extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            extents: extents.abs(),
            rotation,
        }
    }

    /// World-space local axes as the columns of a rotation matrix
    pub fn axes(&self) -> Mat3 {
        self.rotation.to_rotation_matrix().into_inner()
    }

    /// Tight AABB around the rotated box
    pub fn to_aabb(&self) -> Aabb {
        let axes = self.axes();
        // Half-width along each world axis is the abs-rotated extents.
        let extents = axes.abs() * self.extents;
        Aabb::from_center_extents(self.center, extents)
    }

    /// Separating axis test against an AABB
    ///
    /// Tests the three world axes, the three box axes, and the nine edge
    /// cross products, so a `true` result is an exact overlap.
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        const AXIS_EPSILON: f32 = 1.0e-6;

        let axes = self.axes();
        let obb_axes = [
            axes.column(0).into_owned(),
            axes.column(1).into_owned(),
            axes.column(2).into_owned(),
        ];
        let world_axes = [Vec3::x(), Vec3::y(), Vec3::z()];
        let aabb_extents = aabb.extents();
        let offset = self.center - aabb.center();

        let separated_on = |axis: &Vec3| -> bool {
            if axis.magnitude_squared() < AXIS_EPSILON {
                // Parallel edges produce a null axis; a face axis already covers it.
                return false;
            }
            let aabb_radius = aabb_extents.x * axis.x.abs()
                + aabb_extents.y * axis.y.abs()
                + aabb_extents.z * axis.z.abs();
            let obb_radius = self.extents.x * obb_axes[0].dot(axis).abs()
                + self.extents.y * obb_axes[1].dot(axis).abs()
                + self.extents.z * obb_axes[2].dot(axis).abs();
            offset.dot(axis).abs() > aabb_radius + obb_radius
        };

        if world_axes.iter().any(|axis| separated_on(axis)) {
            return false;
        }
        if obb_axes.iter().any(|axis| separated_on(axis)) {
            return false;
        }
        for world_axis in &world_axes {
            for obb_axis in &obb_axes {
                if separated_on(&world_axis.cross(obb_axis)) {
                    return false;
                }
            }
        }

        true
    }
}

impl From<Aabb> for OrientedBoundingBox {
    fn from(aabb: Aabb) -> Self {
        Self::new(aabb.center(), aabb.extents(), Quat::identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn rotated_z(angle: f32) -> Quat {
        Quat::from_axis_angle(&Vec3::z_axis(), angle)
    }

    #[test]
    fn test_axis_aligned_obb_matches_aabb_overlap() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let touching = OrientedBoundingBox::from(Aabb::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
        ));
        let apart = OrientedBoundingBox::from(Aabb::new(
            Vec3::new(1.5, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
        ));
        assert!(touching.intersects(&aabb));
        assert!(!apart.intersects(&aabb));
    }

    #[test]
    fn test_rotated_obb_separated_by_its_own_axis() {
        // A diamond whose tight AABB overlaps the box corner, but the diamond itself does not.
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let diamond = OrientedBoundingBox::new(
            Vec3::new(2.3, 2.3, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            rotated_z(FRAC_PI_4),
        );
        assert!(diamond.to_aabb().intersects(&aabb));
        assert!(!diamond.intersects(&aabb));
    }

    #[test]
    fn test_rotated_obb_overlapping() {
        let aabb = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let diamond = OrientedBoundingBox::new(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            rotated_z(FRAC_PI_4),
        );
        assert!(diamond.intersects(&aabb));
    }

    #[test]
    fn test_to_aabb_of_rotated_box() {
        let obb = OrientedBoundingBox::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), rotated_z(FRAC_PI_4));
        let aabb = obb.to_aabb();
        assert_relative_eq!(aabb.max.x, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(aabb.max.y, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(aabb.max.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(aabb.center(), Vec3::zeros(), epsilon = 1e-5);
    }
}
