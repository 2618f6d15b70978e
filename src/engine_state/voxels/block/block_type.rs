//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and
//! the static properties the mesher and the raycaster query for each of them.

use num_derive::FromPrimitive;

use super::{block_side::BlockSide, BlockTypeSize};

/// Enumerates all known block types in the voxel world.
///
/// The discriminant is the raw ID stored in chunk data. The `FromPrimitive`
/// derive allows conversion from those raw bytes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Known and empty.
    AIR = 0,

    /// Plain opaque stone.
    STONE = 1,

    /// Transparent glass. Hides faces between adjacent glass blocks.
    GLASS = 2,

    /// A plain white opaque block, mostly used for test scenes.
    WHITE = 3,

    /// Translucent foliage. Adjacent leaves still draw their shared faces so
    /// the inner structure of a canopy stays visible.
    LEAVES = 4,

    /// Opaque grass with different textures on top, bottom and sides.
    GRASS = 5,
}

/// Maps each block type to its texture index for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`, the inner array by
/// `BlockSide` as a `usize`: [Back, Front, Left, Right, Bottom, Top].
/// `None` means the face has no geometry at all.
static BLOCK_TYPE_TO_TEXTURE_INDICES: [[Option<u8>; 6]; 6] = [
    [None; 6],    // AIR
    [Some(0); 6], // STONE
    [Some(1); 6], // GLASS
    [Some(2); 6], // WHITE
    [Some(3); 6], // LEAVES
    [Some(6), Some(6), Some(6), Some(6), Some(5), Some(4)], // GRASS (top: 4, bottom: 5, sides: 6)
];

impl BlockType {
    /// Converts a raw block ID to a `BlockType`.
    ///
    /// # Returns
    /// `None` for IDs that do not correspond to any known block type.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The raw ID of this block type, as stored in chunk data.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether the block hides the faces of blocks behind it.
    pub fn is_opaque(self) -> bool {
        matches!(self, BlockType::STONE | BlockType::WHITE | BlockType::GRASS)
    }

    /// Whether two adjacent blocks of this type still render the face between them.
    pub fn shows_adjacent_faces(self) -> bool {
        self == BlockType::LEAVES
    }

    /// The texture drawn on the given face, or `None` if that face has no geometry.
    pub fn texture(self, side: BlockSide) -> Option<u8> {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self as usize][side as usize]
    }

    /// Generates a random opaque or translucent block type (excluding AIR).
    ///
    /// Used by demo scene generation.
    pub fn get_random_type() -> Self {
        Self::from_id(fastrand::u8(1..6)).unwrap_or(BlockType::STONE)
    }
}
