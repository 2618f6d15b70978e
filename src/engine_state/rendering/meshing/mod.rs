//! Mesh generation and caching for voxel rendering.
//!
//! This module converts chunk block data into the flat face-record buffers the
//! renderer draws, regenerating only what changed.
//!
//! # Architecture
//! - `ChunkMesh`: per-chunk cache of 27 regions, each holding its faces and a dirty flag
//! - `MeshManager`: owns the caches of every chunk and the set of chunks waiting for a remesh
//! - `dirty`: which regions a block write or a chunk load invalidates, here and in neighbors
//! - `face`: the 8-byte `FaceRecord` format
//!
//! # Regions
//! Each axis of a chunk splits into three bands: the near face (coordinate 0),
//! the interior, and the far face (coordinate `CHUNK_DIMENSION - 1`). Their
//! intersections give 27 regions indexed like the chunk neighborhood, so
//! region 13 is the large interior core and the rest are thin boundary
//! slabs, edges and corners. The concatenation of all regions' faces is
//! always the chunk's mesh.
//!
//! # Performance Considerations
//! - Entirely air chunks skip region work altogether
//! - The interior region of an entirely opaque chunk is skipped, nothing in it can be seen
//! - Interior cells read their neighbors straight from the chunk array; only
//!   boundary regions pay for cross-chunk lookups

use std::collections::{BTreeSet, HashMap};

use cgmath::{Point3, Vector3};
use log::{debug, trace};

use crate::engine_state::voxels::{
    block::{self, block_side::BlockSide, BlockTypeSize, AIR},
    chunk::{
        neighborhood::{neighbor_index, offset_components, MIDDLE, NEIGHBOR_COUNT},
        Chunk, ChunkHandle, ChunkPosition, CHUNK_DIMENSION, CHUNK_SIZE,
    },
    world::{SetBlockOutcome, World},
};

pub mod dirty;
mod face;

pub use face::{face_bytes, FaceRecord};

/// Cached faces of one region of a chunk.
#[derive(Debug, Default)]
struct RegionCache {
    faces: Vec<FaceRecord>,
    dirty: bool,
}

/// Coordinate range covered by each axis band.
const BAND_BOUNDS: [(i32, i32); 3] = [(0, 1), (1, CHUNK_DIMENSION - 1), (CHUNK_DIMENSION - 1, CHUNK_DIMENSION)];

/// Region cache and precomputed flags for one chunk's mesh.
#[derive(Debug)]
pub struct ChunkMesh {
    cache: [RegionCache; NEIGHBOR_COUNT],
    /// Floating chunks are rendered like entities and are treated as if
    /// surrounded by air: their outer faces are visible without neighbors.
    lone: bool,
    air_blocks: usize,
    opaque_blocks: usize,
}

impl ChunkMesh {
    /// Creates a cache for `chunk` with every region dirty.
    pub fn new(chunk: &Chunk) -> Self {
        let mut mesh = ChunkMesh {
            cache: Default::default(),
            lone: false,
            air_blocks: 0,
            opaque_blocks: 0,
        };
        mesh.handle_data_update(chunk);
        mesh.mark_all_dirty();
        mesh
    }

    /// Recounts the chunk's air and opaque blocks and re-reads whether it is
    /// a floating chunk, so none of this needs recomputing when the chunk is
    /// remeshed because of a neighbor. Must be called whenever the chunk's
    /// whole payload is replaced.
    pub fn handle_data_update(&mut self, chunk: &Chunk) {
        self.lone = chunk.position.is_floating();
        self.air_blocks = chunk.data().iter().filter(|&&b| b == AIR).count();
        self.opaque_blocks = chunk
            .data()
            .iter()
            .filter(|&&b| block::is_opaque(Some(b)))
            .count();
    }

    /// Updates the block counts after a single cell changed from `previous`
    /// to `block`.
    pub fn handle_block_update(&mut self, previous: BlockTypeSize, block: BlockTypeSize) {
        if previous == AIR {
            self.air_blocks -= 1;
        }
        if block == AIR {
            self.air_blocks += 1;
        }
        if block::is_opaque(Some(previous)) {
            self.opaque_blocks -= 1;
        }
        if block::is_opaque(Some(block)) {
            self.opaque_blocks += 1;
        }
    }

    /// Whether every block of the chunk is air.
    pub fn is_entirely_air(&self) -> bool {
        self.air_blocks == CHUNK_SIZE as usize
    }

    /// Whether every block of the chunk is opaque.
    pub fn is_entirely_opaque(&self) -> bool {
        self.opaque_blocks == CHUNK_SIZE as usize
    }

    /// Marks every region dirty and drops all cached faces.
    pub fn mark_all_dirty(&mut self) {
        for entry in self.cache.iter_mut() {
            entry.faces.clear();
            entry.dirty = true;
        }
    }

    /// Marks one region dirty.
    pub fn mark_dirty(&mut self, region: usize) {
        self.cache[region].dirty = true;
    }

    /// Whether a region waits to be regenerated.
    pub fn is_dirty(&self, region: usize) -> bool {
        self.cache[region].dirty
    }

    /// Whether any region waits to be regenerated.
    pub fn has_dirty_regions(&self) -> bool {
        self.cache.iter().any(|entry| entry.dirty)
    }

    /// Cached faces of one region, as of the last `generate_mesh`.
    pub fn region_faces(&self, region: usize) -> &[FaceRecord] {
        &self.cache[region].faces
    }

    /// Regenerates the dirty regions and returns the chunk's whole mesh.
    ///
    /// # Arguments
    /// * `world` - Resolves cross-chunk lookups for boundary regions
    /// * `chunk` - The chunk this cache belongs to
    pub fn generate_mesh(&mut self, world: &World, chunk: &Chunk) -> Vec<FaceRecord> {
        if self.is_entirely_air() {
            for entry in self.cache.iter_mut() {
                entry.faces.clear();
                entry.dirty = false;
            }
            return Vec::new();
        }

        for region in 0..NEIGHBOR_COUNT {
            if !self.cache[region].dirty {
                continue;
            }
            let mut faces = std::mem::take(&mut self.cache[region].faces);
            faces.clear();
            if !(region == MIDDLE && self.is_entirely_opaque()) {
                self.mesh_region(world, chunk, region, &mut faces);
            }
            let entry = &mut self.cache[region];
            entry.faces = faces;
            entry.dirty = false;
        }

        self.cache
            .iter()
            .flat_map(|entry| entry.faces.iter().copied())
            .collect()
    }

    fn mesh_region(&self, world: &World, chunk: &Chunk, region: usize, faces: &mut Vec<FaceRecord>) {
        let lone = self.lone;
        let neighbor_at = |position: Point3<i32>| -> Option<BlockTypeSize> {
            if region == MIDDLE {
                Some(chunk.get(position))
            } else if lone {
                Some(chunk.get_checked(position, AIR))
            } else {
                chunk.get_with_neighbor(world, position)
            }
        };

        let [bx, by, bz] = offset_components(region);
        let (x_min, x_max) = BAND_BOUNDS[(bx + 1) as usize];
        let (y_min, y_max) = BAND_BOUNDS[(by + 1) as usize];
        let (z_min, z_max) = BAND_BOUNDS[(bz + 1) as usize];

        for x in x_min..x_max {
            for y in y_min..y_max {
                for z in z_min..z_max {
                    let position = Point3::new(x, y, z);
                    let block = chunk.get(position);
                    if block == AIR {
                        continue;
                    }
                    for side in BlockSide::all() {
                        let Some(texture) = block::texture(Some(block), side) else {
                            continue;
                        };
                        let normal = side.normal();
                        let neighbor = neighbor_at(position + normal);
                        // Void hides the face until the neighbor is known.
                        let Some(neighbor) = neighbor else { continue };
                        if block::is_opaque(Some(neighbor)) {
                            continue;
                        }
                        if block == neighbor && !block::shows_adjacent_faces(block) {
                            continue;
                        }
                        let ao = if block::is_opaque(Some(block)) {
                            ambient_occlusion(position, side, &neighbor_at)
                        } else {
                            0
                        };
                        faces.push(FaceRecord::new(
                            x as u8,
                            y as u8,
                            z as u8,
                            side.id(),
                            texture,
                            ao,
                        ));
                    }
                }
            }
        }
    }
}

/// Packs the occlusion level of the four corners of a face.
///
/// Each corner counts the opaque cells among the diagonal cell in front of
/// the corner and the two cells in front of the face that share the corner's
/// edges, giving a level from 0 to 3.
fn ambient_occlusion<F>(position: Point3<i32>, side: BlockSide, block_at: &F) -> u8
where
    F: Fn(Point3<i32>) -> Option<BlockTypeSize>,
{
    let normal = side.normal();
    let front = position + normal;
    let mut ao = 0u8;
    for index in 0..4 {
        let corner = side.corner(index);
        let toward = |axis: usize| if corner[axis] != 0 { 1 } else { -1 };

        let mut diagonal = front;
        let mut opaque = 0u8;
        for axis in 0..3 {
            if normal[axis] != 0 {
                continue;
            }
            diagonal[axis] += toward(axis);
            let mut edge = Vector3::new(0, 0, 0);
            edge[axis] = toward(axis);
            opaque += block::is_opaque(block_at(front + edge)) as u8;
        }
        opaque += block::is_opaque(block_at(diagonal)) as u8;
        ao |= opaque << (index * 2);
    }
    ao
}

/// Owns the mesh caches of every chunk in a world and tracks which chunks
/// need a remesh.
///
/// # Dirty Batching
/// Invalidations only mark regions and queue the chunk. Callers decide when
/// to `flush`, so many updates arriving together are remeshed once.
#[derive(Default)]
pub struct MeshManager {
    meshes: HashMap<ChunkHandle, ChunkMesh>,
    dirty_chunks: BTreeSet<ChunkHandle>,
}

impl MeshManager {
    /// Creates a manager with no caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks waiting for a remesh.
    pub fn pending(&self) -> usize {
        self.dirty_chunks.len()
    }

    /// The cache of a chunk, if it has been meshed or invalidated before.
    pub fn mesh(&self, handle: ChunkHandle) -> Option<&ChunkMesh> {
        self.meshes.get(&handle)
    }

    fn mesh_entry(&mut self, world: &World, handle: ChunkHandle) -> Option<&mut ChunkMesh> {
        let chunk = world.chunk(handle)?;
        Some(
            self.meshes
                .entry(handle)
                .or_insert_with(|| ChunkMesh::new(chunk)),
        )
    }

    /// Marks one region of a chunk dirty and queues the chunk.
    pub fn mark_region_dirty(&mut self, world: &World, handle: ChunkHandle, region: usize) {
        if let Some(mesh) = self.mesh_entry(world, handle) {
            mesh.mark_dirty(region);
            self.dirty_chunks.insert(handle);
        }
    }

    /// Handles a chunk whose whole payload was (re)loaded: the chunk's cache
    /// is rebuilt from scratch and the regions of its registered neighbors
    /// that read it are invalidated.
    ///
    /// Handles are reused once a chunk is deleted, so any cache still stored
    /// under `handle` may belong to a previous occupant and is replaced.
    pub fn chunk_loaded(&mut self, world: &World, handle: ChunkHandle) {
        let Some(chunk) = world.chunk(handle) else { return };
        self.meshes.insert(handle, ChunkMesh::new(chunk));
        self.dirty_chunks.insert(handle);

        for (index, neighbor) in chunk.neighbors().iter().enumerate() {
            let Some(neighbor) = *neighbor else { continue };
            if index == MIDDLE {
                continue;
            }
            for &region in dirty::NEIGHBOR_AFFECTED_REGIONS.regions(index) {
                self.mark_region_dirty(world, neighbor, region as usize);
            }
        }
    }

    /// Handles a single block write reported by [`World::set_block`].
    pub fn block_changed(&mut self, world: &World, outcome: &SetBlockOutcome) {
        let Some(handle) = outcome.chunk else { return };
        let Some(chunk) = world.chunk(handle) else { return };
        let block = chunk.get(outcome.local);
        match (self.meshes.get_mut(&handle), outcome.previous) {
            (Some(mesh), Some(previous)) => mesh.handle_block_update(previous, block),
            (Some(mesh), None) => mesh.handle_data_update(chunk),
            (None, _) => {
                self.meshes.insert(handle, ChunkMesh::new(chunk));
            }
        }
        for affected in dirty::affected_regions(outcome.local) {
            let target = if affected.chunk_offset == Vector3::new(0, 0, 0) {
                Some(handle)
            } else {
                chunk.neighbors()[neighbor_index(affected.chunk_offset)]
            };
            if let Some(target) = target {
                self.mark_region_dirty(world, target, affected.region);
            }
        }
    }

    /// Drops a chunk's cache, e.g. when the chunk is unloaded.
    pub fn forget(&mut self, handle: ChunkHandle) {
        self.meshes.remove(&handle);
        self.dirty_chunks.remove(&handle);
    }

    /// Remeshes every queued chunk.
    ///
    /// # Returns
    /// The position and complete face list of each remeshed chunk. Empty lists
    /// are included so stale geometry can be dropped.
    pub fn flush(&mut self, world: &World) -> Vec<(ChunkPosition, Vec<FaceRecord>)> {
        let dirty_chunks = std::mem::take(&mut self.dirty_chunks);
        let mut meshes = Vec::with_capacity(dirty_chunks.len());
        for handle in dirty_chunks {
            let Some(chunk) = world.chunk(handle) else {
                self.meshes.remove(&handle);
                continue;
            };
            let Some(mesh) = self.meshes.get_mut(&handle) else { continue };
            let faces = mesh.generate_mesh(world, chunk);
            trace!("Meshed chunk {:?}: {} faces", chunk.position, faces.len());
            meshes.push((chunk.position, faces));
        }
        debug!("Flushed {} chunk meshes", meshes.len());
        meshes
    }
}
