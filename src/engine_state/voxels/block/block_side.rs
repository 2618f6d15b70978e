//! # Block Side Module
//!
//! This module defines the six faces of a voxel block, the outward normal of
//! each face, and the corners of each face used when sampling ambient occlusion.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned the face id written into face records, so the
/// discriminants must stay in sync with the renderer's vertex shader.
///
/// The order is: [BACK, FRONT, LEFT, RIGHT, BOTTOM, TOP]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The back face (facing negative Z)
    BACK = 0,

    /// The front face (facing positive Z)
    FRONT = 1,

    /// The left face (facing negative X)
    LEFT = 2,

    /// The right face (facing positive X)
    RIGHT = 3,

    /// The bottom face (facing negative Y)
    BOTTOM = 4,

    /// The top face (facing positive Y)
    TOP = 5,
}

/// Corners of the unit square a face is built from, in the order the packed
/// ambient-occlusion byte stores them (two bits each, lowest bits first).
const SQUARE_CORNERS: [(i32, i32); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

impl BlockSide {
    /// Returns an array containing all six block faces in face-id order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::BACK,
            BlockSide::FRONT,
            BlockSide::LEFT,
            BlockSide::RIGHT,
            BlockSide::BOTTOM,
            BlockSide::TOP,
        ]
    }

    /// The face id stored in face records.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The outward unit normal of this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::BACK => Vector3::new(0, 0, -1),
            BlockSide::FRONT => Vector3::new(0, 0, 1),
            BlockSide::LEFT => Vector3::new(-1, 0, 0),
            BlockSide::RIGHT => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
        }
    }

    /// Gets one corner of this face in block-local unit coordinates (each
    /// component is 0 or 1).
    ///
    /// The face's square is mirrored for odd (positive-facing) sides and then
    /// rotated onto the face's axis, matching how the vertex shader expands
    /// a face record into a quad.
    ///
    /// # Arguments
    /// * `index` - Which corner, `0..4`, in AO packing order
    pub fn corner(self, index: usize) -> Vector3<i32> {
        let (sx, sy) = SQUARE_CORNERS[index];
        let face = self as u8;
        let flipped = if face & 1 != 0 {
            Vector3::new(1 - sx, sy, 1)
        } else {
            Vector3::new(sx, sy, 0)
        };
        if face & 4 != 0 {
            Vector3::new(flipped.x, flipped.z, 1 - flipped.y)
        } else if face & 2 != 0 {
            Vector3::new(flipped.z, flipped.y, 1 - flipped.x)
        } else {
            flipped
        }
    }
}
