//! Math utilities and types
//!
//! Provides the vector and rotation types the geometry module is built on.

pub use nalgebra::{Matrix3, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Component-wise minimum of two vectors
    pub fn min_components(a: &Vec3, b: &Vec3) -> Vec3 {
        Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
    }

    /// Component-wise maximum of two vectors
    pub fn max_components(a: &Vec3, b: &Vec3) -> Vec3 {
        Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
    }

    /// Clamp every component of `value` into `[min, max]`
    ///
    /// Never panics; an inverted range resolves to `max`.
    pub fn clamp_components(value: &Vec3, min: &Vec3, max: &Vec3) -> Vec3 {
        Vec3::new(
            value.x.max(min.x).min(max.x),
            value.y.max(min.y).min(max.y),
            value.z.max(min.z).min(max.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::Vec3;

    #[test]
    fn test_component_min_max() {
        let a = Vec3::new(1.0, -2.0, 3.0);
        let b = Vec3::new(0.0, 4.0, 3.5);
        assert_eq!(min_components(&a, &b), Vec3::new(0.0, -2.0, 3.0));
        assert_eq!(max_components(&a, &b), Vec3::new(1.0, 4.0, 3.5));
    }

    #[test]
    fn test_clamp_components() {
        let v = Vec3::new(-5.0, 0.5, 9.0);
        let clamped = clamp_components(&v, &Vec3::zeros(), &Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(clamped, Vec3::new(0.0, 0.5, 1.0));
    }
}
