//! Dirty-region propagation across chunk boundaries.
//!
//! Every chunk's mesh is cached in 27 regions, indexed like the chunk
//! neighborhood but naming axis bands of a single chunk: near face
//! (coordinate 0), interior, far face (coordinate `CHUNK_DIMENSION - 1`).
//!
//! When a chunk changes next to a neighbor, the neighbor's regions that read
//! the changed cells must be remeshed. [`NEIGHBOR_AFFECTED_REGIONS`] lists them
//! per neighbor offset:
//! - face neighbor: the 3×3 regions of its touching face
//! - edge neighbor: the 3 regions along its touching edge
//! - vertex neighbor: its single touching corner
//!
//! Ambient occlusion reads diagonal cells, so this is one band wider than
//! plain face adjacency would need.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::chunk::neighborhood::{
    neighbor_index, neighbor_index_of, neighbor_offsets, offset_components, MIDDLE, NEIGHBOR_COUNT,
};
use crate::engine_state::voxels::chunk::{Chunk, CHUNK_DIMENSION};

/// Region indices to invalidate in a neighbor, per neighbor offset index.
pub struct DirtyTable {
    regions: [[u8; 9]; NEIGHBOR_COUNT],
    counts: [u8; NEIGHBOR_COUNT],
}

impl DirtyTable {
    /// Builds the table. A region `r` of the neighbor at offset `o` is listed
    /// when `r` lies on the neighbor's side facing back at us on every axis
    /// where `o` is nonzero.
    pub const fn build() -> Self {
        let mut regions = [[0u8; 9]; NEIGHBOR_COUNT];
        let mut counts = [0u8; NEIGHBOR_COUNT];
        let mut neighbor = 0;
        while neighbor < NEIGHBOR_COUNT {
            if neighbor != MIDDLE {
                let o = offset_components(neighbor);
                let mut region = 0;
                while region < NEIGHBOR_COUNT {
                    let r = offset_components(region);
                    let mut touching = true;
                    let mut axis = 0;
                    while axis < 3 {
                        if o[axis] != 0 && r[axis] != -o[axis] {
                            touching = false;
                        }
                        axis += 1;
                    }
                    if touching {
                        regions[neighbor][counts[neighbor] as usize] = region as u8;
                        counts[neighbor] += 1;
                    }
                    region += 1;
                }
            }
            neighbor += 1;
        }
        DirtyTable { regions, counts }
    }

    /// Regions of the neighbor at `neighbor` (a neighborhood index) that read
    /// cells of this chunk.
    pub fn regions(&self, neighbor: usize) -> &[u8] {
        &self.regions[neighbor][..self.counts[neighbor] as usize]
    }
}

/// Precomputed at compile time.
pub static NEIGHBOR_AFFECTED_REGIONS: DirtyTable = DirtyTable::build();

/// Classifies a local coordinate into its axis band: -1 near face, 0 interior, 1 far face.
#[inline]
pub fn band(coord: i32) -> i32 {
    if coord <= 0 {
        -1
    } else if coord >= CHUNK_DIMENSION - 1 {
        1
    } else {
        0
    }
}

/// The cache region containing a chunk-local coordinate.
pub fn region_of(local: Point3<i32>) -> usize {
    neighbor_index_of(band(local.x), band(local.y), band(local.z))
}

/// A region that a block write invalidates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AffectedRegion {
    /// Offset of the chunk owning the region; zero for the written chunk.
    pub chunk_offset: Vector3<i32>,
    /// Region index within that chunk.
    pub region: usize,
}

/// Every region whose faces may change when the block at `local` changes.
///
/// Inside the written chunk these are the regions of all cells in the
/// block's 3×3×3 neighborhood (their faces and AO read the block). Neighbor
/// chunks are only touched when the block sits on the matching boundary, and
/// then receive the regions from [`NEIGHBOR_AFFECTED_REGIONS`].
pub fn affected_regions(local: Point3<i32>) -> Vec<AffectedRegion> {
    let mut affected = Vec::new();

    let mut own = [false; NEIGHBOR_COUNT];
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                let cell = local + Vector3::new(dx, dy, dz);
                if Chunk::inside(cell) {
                    own[region_of(cell)] = true;
                }
            }
        }
    }
    for (region, _) in own.iter().enumerate().filter(|(_, dirty)| **dirty) {
        affected.push(AffectedRegion {
            chunk_offset: Vector3::new(0, 0, 0),
            region,
        });
    }

    let block_band = [band(local.x), band(local.y), band(local.z)];
    for offset in neighbor_offsets() {
        let touches = (0..3).all(|axis| offset[axis] == 0 || offset[axis] == block_band[axis]);
        if !touches {
            continue;
        }
        for &region in chunk_loaded_regions(offset) {
            affected.push(AffectedRegion {
                chunk_offset: offset,
                region: region as usize,
            });
        }
    }

    affected
}

/// Regions of the neighbor at `offset` to invalidate when this chunk's data
/// is replaced wholesale.
pub fn chunk_loaded_regions(offset: Vector3<i32>) -> &'static [u8] {
    NEIGHBOR_AFFECTED_REGIONS.regions(neighbor_index(offset))
}
