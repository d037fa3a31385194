//! Spatial partitioning data structures
//!
//! Provides efficient spatial indexing for collision detection,
//! ray casting, and proximity queries in 3D space.

pub mod bvh;
mod spatial_query;

pub use bvh::{BoundingVolumeHierarchy, BuildStrategy, BvhError, NodeId, ObjectId};
pub use spatial_query::SpatialQuery;
