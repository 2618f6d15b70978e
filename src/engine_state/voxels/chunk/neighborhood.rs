//! # Chunk Neighborhood Module
//!
//! Helpers for the 3×3×3 neighborhood of a chunk. An offset `(dx, dy, dz)`
//! with each component in `{-1, 0, 1}` maps to the index
//! `((dx + 1) * 3 + dy + 1) * 3 + dz + 1`, so index 13 is the chunk itself.
//!
//! The same indexing is reused for the 27 mesh regions of a single chunk,
//! where each component instead names an axis band (near face, interior,
//! far face).

use cgmath::Vector3;

/// Number of slots in a neighborhood, including the center.
pub const NEIGHBOR_COUNT: usize = 27;

/// Index of the zero offset.
pub const MIDDLE: usize = neighbor_index_of(0, 0, 0);

/// Maps an offset to its neighborhood index.
#[inline]
pub const fn neighbor_index_of(dx: i32, dy: i32, dz: i32) -> usize {
    (((dx + 1) * 3 + dy + 1) * 3 + dz + 1) as usize
}

/// Maps an offset vector to its neighborhood index.
#[inline]
pub fn neighbor_index(offset: Vector3<i32>) -> usize {
    neighbor_index_of(offset.x, offset.y, offset.z)
}

/// Inverse of [`neighbor_index_of`].
#[inline]
pub const fn offset_components(index: usize) -> [i32; 3] {
    let i = index as i32;
    [i / 9 % 3 - 1, i / 3 % 3 - 1, i % 3 - 1]
}

/// Inverse of [`neighbor_index`].
#[inline]
pub fn offset_of(index: usize) -> Vector3<i32> {
    let [x, y, z] = offset_components(index);
    Vector3::new(x, y, z)
}

/// All 27 offsets, in index order.
pub fn offsets() -> impl Iterator<Item = Vector3<i32>> {
    (0..NEIGHBOR_COUNT).map(offset_of)
}

/// The 26 nonzero offsets, in index order.
pub fn neighbor_offsets() -> impl Iterator<Item = Vector3<i32>> {
    (0..NEIGHBOR_COUNT)
        .filter(|&index| index != MIDDLE)
        .map(offset_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_is_thirteen() {
        assert_eq!(MIDDLE, 13);
    }

    #[test]
    fn index_and_offset_are_inverse() {
        for index in 0..NEIGHBOR_COUNT {
            assert_eq!(neighbor_index(offset_of(index)), index);
        }
        assert_eq!(neighbor_index(Vector3::new(-1, -1, -1)), 0);
        assert_eq!(neighbor_index(Vector3::new(1, 1, 1)), 26);
    }

    #[test]
    fn negated_offset_mirrors_index() {
        for offset in offsets() {
            assert_eq!(neighbor_index(-offset), 26 - neighbor_index(offset));
        }
    }

    #[test]
    fn twenty_six_neighbors() {
        assert_eq!(neighbor_offsets().count(), 26);
        assert!(neighbor_offsets().all(|o| o != Vector3::new(0, 0, 0)));
    }
}
