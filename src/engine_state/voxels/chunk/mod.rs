//! # Chunk Module
//!
//! This module provides the `Chunk` struct for managing 32x32x32 blocks of
//! voxel data together with the links to its 26 neighboring chunks.
//!
//! ## Storage
//!
//! Block IDs live in one dense, contiguous array addressed as
//! `(x * CHUNK_DIMENSION + y) * CHUNK_DIMENSION + z`. The array is the same
//! byte buffer that chunk payloads carry, so loading a chunk is a move rather
//! than a conversion.
//!
//! ## Neighbors
//!
//! Neighbor links are `ChunkHandle`s into the owning [`World`]'s chunk arena
//! rather than references, which keeps the cyclic neighbor graph free of
//! ownership cycles. The world keeps them symmetric: if this chunk's slot for
//! offset `o` holds B, then B's slot for `-o` holds this chunk.

use cgmath::{Matrix4, Point3, Vector3};
use thiserror::Error;

use super::block::{BlockTypeSize, AIR};
use super::world::World;
use neighborhood::{neighbor_index, MIDDLE, NEIGHBOR_COUNT};

pub mod neighborhood;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 32;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Identifier of a floating chunk.
pub type FloatingId = u32;

/// Index of a chunk inside a [`World`]'s arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkHandle(pub(crate) usize);

/// Where a chunk lives: either on the global chunk grid, or as a floating
/// chunk placed by an arbitrary rigid transform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChunkPosition {
    /// A grid chunk at the given chunk coordinates (not block coordinates).
    Grid(Point3<i32>),
    /// A floating chunk, e.g. a movable structure.
    Floating {
        /// The floating chunk's identifier.
        id: FloatingId,
        /// Local-to-world transform. `None` means identity.
        transform: Option<Matrix4<f32>>,
    },
}

/// Hashable identity of a chunk, used as registry key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkKey {
    /// A grid chunk at the given chunk coordinates.
    Grid(Point3<i32>),
    /// A floating chunk.
    Floating(FloatingId),
}

impl ChunkPosition {
    /// The registry key for this position.
    pub fn key(&self) -> ChunkKey {
        match *self {
            ChunkPosition::Grid(position) => ChunkKey::Grid(position),
            ChunkPosition::Floating { id, .. } => ChunkKey::Floating(id),
        }
    }

    /// Whether this is a floating chunk.
    pub fn is_floating(&self) -> bool {
        matches!(self, ChunkPosition::Floating { .. })
    }
}

impl From<Point3<i32>> for ChunkPosition {
    fn from(position: Point3<i32>) -> Self {
        ChunkPosition::Grid(position)
    }
}

impl From<Point3<i32>> for ChunkKey {
    fn from(position: Point3<i32>) -> Self {
        ChunkKey::Grid(position)
    }
}

/// Errors raised when replacing a chunk's block data.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkDataError {
    /// The payload does not hold exactly one byte per block.
    #[error("chunk data holds {actual} blocks, expected {expected}")]
    InvalidLength {
        /// `CHUNK_SIZE`
        expected: usize,
        /// Length of the rejected payload.
        actual: usize,
    },
}

/// A 32x32x32 collection of voxel blocks plus its neighbor links.
///
/// Chunks are created empty (all air) and populated later by terrain
/// generation or network sync, so a registered chunk may briefly hold
/// placeholder data.
#[derive(Debug)]
pub struct Chunk {
    /// Where this chunk lives.
    pub position: ChunkPosition,
    data: Box<[BlockTypeSize]>,
    /// Neighbor slots indexed by [`neighbor_index`]. Slot 13 refers to the
    /// chunk itself once registered.
    pub(crate) neighbors: [Option<ChunkHandle>; NEIGHBOR_COUNT],
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    pub fn new(position: ChunkPosition) -> Self {
        Self::filled(position, AIR)
    }

    /// Creates a chunk consisting entirely of `block`.
    pub fn filled(position: ChunkPosition, block: BlockTypeSize) -> Self {
        Chunk {
            position,
            data: vec![block; CHUNK_SIZE as usize].into_boxed_slice(),
            neighbors: [None; NEIGHBOR_COUNT],
        }
    }

    /// Creates a chunk from a payload of `CHUNK_SIZE` block IDs.
    pub fn with_data(position: ChunkPosition, data: Vec<BlockTypeSize>) -> Result<Self, ChunkDataError> {
        Self::check_length(&data)?;
        Ok(Chunk {
            position,
            data: data.into_boxed_slice(),
            neighbors: [None; NEIGHBOR_COUNT],
        })
    }

    fn check_length(data: &[BlockTypeSize]) -> Result<(), ChunkDataError> {
        if data.len() != CHUNK_SIZE as usize {
            return Err(ChunkDataError::InvalidLength {
                expected: CHUNK_SIZE as usize,
                actual: data.len(),
            });
        }
        Ok(())
    }

    /// Whether `local` lies inside the chunk.
    #[inline]
    pub fn inside(local: Point3<i32>) -> bool {
        (0..CHUNK_DIMENSION).contains(&local.x)
            && (0..CHUNK_DIMENSION).contains(&local.y)
            && (0..CHUNK_DIMENSION).contains(&local.z)
    }

    #[inline]
    fn index(local: Point3<i32>) -> usize {
        ((local.x * CHUNK_DIMENSION + local.y) * CHUNK_DIMENSION + local.z) as usize
    }

    /// Gets the block at the given chunk-local coordinates. Does not perform
    /// any bounds checks of its own; callers guarantee `local` is inside.
    #[inline]
    pub fn get(&self, local: Point3<i32>) -> BlockTypeSize {
        self.data[Self::index(local)]
    }

    /// Gets the block at `local`, or `default` outside the chunk.
    #[inline]
    pub fn get_checked(&self, local: Point3<i32>, default: BlockTypeSize) -> BlockTypeSize {
        if Self::inside(local) {
            self.get(local)
        } else {
            default
        }
    }

    /// Gets the block at chunk-local coordinates that may lie up to one chunk
    /// outside this chunk, looking the block up in the adjacent chunk.
    ///
    /// # Returns
    /// `None` (void) if the adjacent chunk is not registered.
    pub fn get_with_neighbor(&self, world: &World, local: Point3<i32>) -> Option<BlockTypeSize> {
        let wrap = |coord: i32| {
            if coord < 0 {
                (coord + CHUNK_DIMENSION, -1)
            } else if coord >= CHUNK_DIMENSION {
                (coord - CHUNK_DIMENSION, 1)
            } else {
                (coord, 0)
            }
        };
        let (x, dx) = wrap(local.x);
        let (y, dy) = wrap(local.y);
        let (z, dz) = wrap(local.z);
        let block = Point3::new(x, y, z);
        let index = neighbor_index(Vector3::new(dx, dy, dz));
        if index == MIDDLE {
            return Some(self.get(block));
        }
        let handle = self.neighbors[index]?;
        world.chunk(handle).map(|neighbor| neighbor.get(block))
    }

    /// Sets the block at the given chunk-local coordinates. Does not perform
    /// any bounds checks and does not invalidate any mesh.
    #[inline]
    pub fn set(&mut self, local: Point3<i32>, block: BlockTypeSize) {
        self.data[Self::index(local)] = block;
    }

    /// Makes the chunk consist entirely of `block`.
    pub fn fill(&mut self, block: BlockTypeSize) {
        self.data.fill(block);
    }

    /// Replaces the whole block array with a chunk payload.
    pub fn set_data(&mut self, data: Vec<BlockTypeSize>) -> Result<(), ChunkDataError> {
        Self::check_length(&data)?;
        self.data = data.into_boxed_slice();
        Ok(())
    }

    /// The raw block array.
    pub fn data(&self) -> &[BlockTypeSize] {
        &self.data
    }

    /// Gives up the chunk, returning its block array.
    pub fn into_data(self) -> Vec<BlockTypeSize> {
        self.data.into_vec()
    }

    /// The chunk registered at `offset` from this one, if any.
    pub fn neighbor(&self, offset: Vector3<i32>) -> Option<ChunkHandle> {
        self.neighbors[neighbor_index(offset)]
    }

    /// All neighbor slots, indexed by [`neighbor_index`].
    pub fn neighbors(&self) -> &[Option<ChunkHandle>; NEIGHBOR_COUNT] {
        &self.neighbors
    }
}
