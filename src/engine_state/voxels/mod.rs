//! # Voxels
//!
//! Representation, storage and queries of the voxel world.
//!
//! ## Architecture
//!
//! * **Block**: block ids and their properties (opacity, textures, solidity)
//! * **Chunk**: fixed-size 3D arrays of blocks plus links to neighboring chunks
//! * **World**: the registry of live chunks, grid and floating, and global coordinates
//! * **Raycast**: 3D-DDA traversal of the block grid
//!
//! ## Data Flow
//!
//! 1. The world receives chunk payloads and block writes
//! 2. It delegates to the owning chunk, reporting which chunk and local cell changed
//! 3. The caller turns that report into mesh invalidation
//! 4. Queries (block lookups, solidity, raycasts) read already resident data

pub mod block;
pub mod chunk;
pub mod raycast;
pub mod world;
