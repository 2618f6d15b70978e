//! Messages exchanged between the engine and the mesh worker.
//!
//! Payload buffers are moved into the messages, so handing a chunk to the
//! worker never copies its block data.

use cgmath::{Matrix4, Point3};
use web_time::Duration;

use crate::engine_state::voxels::{
    block::BlockTypeSize,
    chunk::{ChunkPosition, FloatingId},
};

/// A chunk's position together with its complete block array.
#[derive(Debug, Clone)]
pub struct ChunkPayload {
    /// Grid coordinate or floating identity of the chunk
    pub position: ChunkPosition,
    /// One block id per cell, `CHUNK_SIZE` bytes
    pub data: Vec<BlockTypeSize>,
}

/// A single block write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockUpdate {
    /// Global block coordinate, or chunk-local when `floating_id` is set
    pub position: Point3<i32>,
    /// The new block id
    pub block: BlockTypeSize,
    /// Floating chunk the write targets, if any
    pub floating_id: Option<FloatingId>,
}

/// Requests sent to the mesh worker.
#[derive(Debug)]
pub enum MeshWorkerRequest {
    /// Bulk load or replace of grid chunks. Each chunk is fully remeshed and
    /// the neighbors reading it are invalidated.
    ChunkData {
        /// The chunks to load
        chunks: Vec<ChunkPayload>,
    },
    /// Load or replace a floating chunk.
    LoneChunkData {
        /// Floating chunk identity
        id: FloatingId,
        /// Local-to-world transform
        transform: Option<Matrix4<f32>>,
        /// Complete block array
        data: Vec<BlockTypeSize>,
    },
    /// Block writes; only the affected regions are remeshed.
    BlockUpdate {
        /// The writes, applied in order
        blocks: Vec<BlockUpdate>,
    },
    /// Drop a grid chunk and its mesh cache.
    Forget {
        /// Chunk coordinate of the dropped chunk
        chunk: Point3<i32>,
    },
    /// Drop a floating chunk and its mesh cache.
    ForgetLone {
        /// Floating chunk identity
        id: FloatingId,
    },
}

/// Messages produced by the mesh worker.
#[derive(Debug)]
pub enum MeshWorkerMessage {
    /// The complete face buffer of a chunk, as `FaceRecord` bytes. An empty
    /// buffer means the chunk has nothing visible.
    Mesh {
        /// Which chunk the buffer belongs to
        position: ChunkPosition,
        /// Packed face records
        data: Vec<u8>,
    },
    /// Time one flush spent meshing.
    MeshTime {
        /// Elapsed time
        time: Duration,
    },
}
