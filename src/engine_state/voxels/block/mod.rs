//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! Chunks store blocks as raw IDs (`BlockTypeSize`); the helpers here answer
//! property queries over those IDs, including the void sentinel.
//!
//! ## Void
//!
//! A block read that lands in a chunk which is not loaded yields `None`
//! ("void") rather than an ID. Void is distinct from `BlockType::AIR`, which
//! means the cell is known to be empty.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in chunk data.
pub type BlockTypeSize = u8;

/// Raw ID of `BlockType::AIR`.
pub const AIR: BlockTypeSize = BlockType::AIR as BlockTypeSize;

/// Whether the block can cull faces and darken corners.
///
/// Void and unknown IDs are not opaque.
pub fn is_opaque(block: Option<BlockTypeSize>) -> bool {
    block
        .and_then(BlockType::from_id)
        .is_some_and(BlockType::is_opaque)
}

/// Whether entities and rays collide with the block.
///
/// Everything except air and void is solid, including IDs this build does not know.
pub fn is_solid(block: Option<BlockTypeSize>) -> bool {
    matches!(block, Some(id) if id != AIR)
}

/// The texture drawn on `side` of `block`, or `None` when nothing is drawn.
pub fn texture(block: Option<BlockTypeSize>, side: BlockSide) -> Option<u8> {
    block
        .and_then(BlockType::from_id)
        .and_then(|block_type| block_type.texture(side))
}

/// Whether adjacent blocks of this same type keep the face between them.
pub fn shows_adjacent_faces(block: BlockTypeSize) -> bool {
    BlockType::from_id(block).is_some_and(BlockType::shows_adjacent_faces)
}
