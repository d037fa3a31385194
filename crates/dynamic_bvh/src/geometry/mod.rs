//! Bounding volume primitives consumed by the hierarchy
//!
//! Provides the value types the BVH tests its node bounds against: boxes,
//! oriented boxes, spheres and rays. Only the intersection routines the
//! broad phase needs live here; narrow-phase tests belong to the caller.
//!
//! # Key Types
//!
//! - [`Aabb`] - Axis-aligned box stored as min/max corners
//! - [`OrientedBoundingBox`] - Rotated box, tested against AABBs with SAT
//! - [`BoundingSphere`] - Sphere, tested against AABBs by closest point
//! - [`Ray`] - Ray with slab-method AABB test returning the entry distance

pub mod aabb;
pub mod obb;
pub mod ray;
pub mod sphere;

pub use aabb::{Aabb, ContainmentType};
pub use obb::OrientedBoundingBox;
pub use ray::Ray;
pub use sphere::BoundingSphere;
