//! # Dynamic BVH
//!
//! An incrementally maintained bounding volume hierarchy over axis-aligned
//! bounding boxes, used as the broad phase of the engine.
//!
//! ## Features
//!
//! - **Dynamic maintenance**: insert, move and remove objects without a rebuild
//! - **Fat AABBs**: leaves are inflated by a margin so small motions are free
//! - **AVL balancing**: single rotations on every refit keep the height logarithmic
//! - **Static builds**: median, windowed SAH and exhaustive SAH strategies
//! - **Queries**: ray (with max distance), AABB, OBB and sphere candidate queries
//!
//! ## Quick Start
//!
//! ```rust
//! use dynamic_bvh::prelude::*;
//!
//! let mut bvh = BoundingVolumeHierarchy::default();
//! bvh.insert(1, &Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)), 0.1);
//! bvh.insert(2, &Aabb::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(6.0, 1.0, 1.0)), 0.1);
//!
//! let query = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(2.0, 2.0, 2.0));
//! assert_eq!(bvh.bounded_object_ids_by_aabb(&query), vec![1]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod spatial;

pub use config::{BvhConfig, Config, ConfigError};
pub use spatial::bvh::{
    BoundingVolumeHierarchy, BuildExecutor, BuildStrategy, BvhError, NodeId, ObjectId,
    SequentialExecutor,
};

/// Common imports for users of the hierarchy
pub mod prelude {
    pub use crate::{
        config::{BvhConfig, Config},
        foundation::math::{Quat, Vec3},
        geometry::{Aabb, BoundingSphere, ContainmentType, OrientedBoundingBox, Ray},
        spatial::{
            bvh::{BoundingVolumeHierarchy, BuildStrategy, BvhError, ObjectId},
            SpatialQuery,
        },
    };
}
