//! Rendering-side data preparation for the voxel engine.
//!
//! The GPU pipeline itself lives outside this crate; it consumes the flat
//! face-record buffers produced by [`meshing`] together with each chunk's
//! position or transform.

pub mod meshing;

pub use meshing::{ChunkMesh, FaceRecord, MeshManager};
