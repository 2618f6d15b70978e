//! # World Module
//!
//! This module provides the `World` struct which registers the live chunks of
//! the voxel world and wires up their neighbor links.
//!
//! ## Architecture
//!
//! Chunks live in an arena of slots and are addressed by `ChunkHandle`.
//! Two maps point into the arena:
//! - grid chunks, keyed by chunk coordinate
//! - floating chunks, keyed by `FloatingId` and positioned by a rigid transform
//!
//! Grid chunks are linked to their 26 neighbors as they are registered and
//! unlinked again when deleted. Floating chunks have no neighbors.
//!
//! ## Coordinates
//!
//! Global block coordinates split into a chunk coordinate
//! (`floor(coord / CHUNK_DIMENSION)` per axis) and a local coordinate
//! (`coord - chunk * CHUNK_DIMENSION`). Floating chunks take coordinates that
//! are already local.

use std::collections::HashMap;

use cgmath::{EuclideanSpace, Matrix4, MetricSpace, Point3, SquareMatrix, Transform, Vector3};
use log::{trace, warn};

use super::block::{self, BlockTypeSize};
use super::chunk::neighborhood::{neighbor_index, neighbor_offsets, offset_of, MIDDLE, NEIGHBOR_COUNT};
use super::chunk::{Chunk, ChunkHandle, ChunkKey, ChunkPosition, FloatingId, CHUNK_DIMENSION};
use super::raycast::{raycast, RaycastHit};

/// Creates the chunk for a position that has been referenced but not loaded yet.
pub type ChunkFactory = Box<dyn Fn(&ChunkPosition) -> Chunk + Send>;

/// Result of [`World::set_block`].
///
/// Carries enough information for the caller to drive mesh invalidation
/// without the world knowing about meshes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetBlockOutcome {
    /// The chunk the block was written to, or `None` if it isn't loaded.
    pub chunk: Option<ChunkHandle>,
    /// Chunk coordinate of the block. Zero for floating chunks.
    pub chunk_position: Point3<i32>,
    /// Chunk-local coordinate of the block.
    pub local: Point3<i32>,
    /// The block that was overwritten, if the write happened.
    pub previous: Option<BlockTypeSize>,
}

/// The closest solid block hit by [`World::raycast`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldRaycastHit {
    /// Block position: global for grid hits, chunk-local for floating chunk hits.
    pub block: Point3<i32>,
    /// Intersection point in world space.
    pub position: Point3<f32>,
    /// Face normal of the hit block in the realm it belongs to.
    pub normal: Vector3<i32>,
    /// World-space distance from the ray origin to `position`.
    pub distance: f32,
    /// Set when the hit block belongs to a floating chunk.
    pub floating_id: Option<FloatingId>,
    /// Transform of the floating chunk that was hit.
    pub transform: Option<Matrix4<f32>>,
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_engine_core::engine_state::voxels::{chunk::ChunkPosition, world::World};
///
/// let mut world = World::default();
/// let handle = world.ensure(ChunkPosition::Grid(Point3::new(0, 0, 0)));
/// assert_eq!(world.lookup(Point3::new(0, 0, 0).into()), Some(handle));
/// ```
pub struct World {
    slots: Vec<Option<Chunk>>,
    free_slots: Vec<usize>,
    grid: HashMap<Point3<i32>, ChunkHandle>,
    floating: HashMap<FloatingId, ChunkHandle>,
    factory: ChunkFactory,
}

impl Default for World {
    /// A world whose factory creates empty (all air) chunks.
    fn default() -> Self {
        World::new(Box::new(|position| Chunk::new(*position)))
    }
}

/// Splits a global block coordinate into chunk and chunk-local coordinates.
pub fn global_to_chunk(global: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
    let chunk = global.map(|coord| coord.div_euclid(CHUNK_DIMENSION));
    let local = global.map(|coord| coord.rem_euclid(CHUNK_DIMENSION));
    (chunk, local)
}

impl World {
    /// Creates a new, empty world.
    ///
    /// # Arguments
    /// * `factory` - Builds chunks for [`World::ensure`]
    pub fn new(factory: ChunkFactory) -> Self {
        World {
            slots: Vec::new(),
            free_slots: Vec::new(),
            grid: HashMap::new(),
            floating: HashMap::new(),
            factory,
        }
    }

    /// Number of registered chunks, grid and floating.
    pub fn len(&self) -> usize {
        self.grid.len() + self.floating.len()
    }

    /// Whether no chunk is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The chunk behind a handle, or `None` if it has been deleted.
    pub fn chunk(&self, handle: ChunkHandle) -> Option<&Chunk> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    /// Mutable access to the chunk behind a handle.
    pub fn chunk_mut(&mut self, handle: ChunkHandle) -> Option<&mut Chunk> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Registers a chunk and links it with its registered neighbors.
    ///
    /// If a chunk is already registered under the same key its contents are
    /// replaced in place: the handle and the neighbor links stay as they were.
    ///
    /// # Returns
    /// The handle of the registered chunk.
    pub fn register(&mut self, mut chunk: Chunk) -> ChunkHandle {
        let key = chunk.position.key();
        if let Some(handle) = self.lookup(key) {
            if let Some(existing) = self.slots[handle.0].as_mut() {
                chunk.neighbors = existing.neighbors;
                *existing = chunk;
            }
            return handle;
        }

        let handle = self.allocate_slot();
        chunk.neighbors = [None; NEIGHBOR_COUNT];
        chunk.neighbors[MIDDLE] = Some(handle);

        match key {
            ChunkKey::Floating(id) => {
                self.floating.insert(id, handle);
            }
            ChunkKey::Grid(position) => {
                self.grid.insert(position, handle);
                for offset in neighbor_offsets() {
                    let Some(neighbor) = self.grid.get(&(position + offset)).copied() else {
                        continue;
                    };
                    chunk.neighbors[neighbor_index(offset)] = Some(neighbor);
                    if let Some(neighbor_chunk) = self.chunk_mut(neighbor) {
                        neighbor_chunk.neighbors[neighbor_index(-offset)] = Some(handle);
                    }
                }
                trace!("Registered chunk {:?} as {:?}", position, handle);
            }
        }

        self.slots[handle.0] = Some(chunk);
        handle
    }

    fn allocate_slot(&mut self) -> ChunkHandle {
        match self.free_slots.pop() {
            Some(index) => ChunkHandle(index),
            None => {
                self.slots.push(None);
                ChunkHandle(self.slots.len() - 1)
            }
        }
    }

    /// Gets a chunk by its key.
    pub fn lookup(&self, key: ChunkKey) -> Option<ChunkHandle> {
        match key {
            ChunkKey::Grid(position) => self.grid.get(&position).copied(),
            ChunkKey::Floating(id) => self.floating.get(&id).copied(),
        }
    }

    /// Gets a chunk by its position. If the chunk doesn't exist, the factory
    /// creates it and it is registered.
    pub fn ensure(&mut self, position: ChunkPosition) -> ChunkHandle {
        if let Some(handle) = self.lookup(position.key()) {
            return handle;
        }
        let chunk = (self.factory)(&position);
        self.register(chunk)
    }

    /// Removes the grid chunk at the given chunk coordinates and clears the
    /// slots that its neighbors held for it.
    ///
    /// # Returns
    /// The removed chunk, or `None` if nothing was registered there.
    pub fn delete(&mut self, position: Point3<i32>) -> Option<Chunk> {
        let handle = self.grid.remove(&position)?;
        let chunk = self.release_slot(handle)?;
        for (index, neighbor) in chunk.neighbors.iter().enumerate() {
            let Some(neighbor) = *neighbor else { continue };
            if index == MIDDLE {
                continue;
            }
            if let Some(neighbor_chunk) = self.chunk_mut(neighbor) {
                neighbor_chunk.neighbors[neighbor_index(-offset_of(index))] = None;
            }
        }
        trace!("Deleted chunk {:?}", position);
        Some(chunk)
    }

    /// Removes a floating chunk.
    pub fn delete_floating(&mut self, id: FloatingId) -> Option<Chunk> {
        let handle = self.floating.remove(&id)?;
        self.release_slot(handle)
    }

    fn release_slot(&mut self, handle: ChunkHandle) -> Option<Chunk> {
        let chunk = self.slots.get_mut(handle.0)?.take()?;
        self.free_slots.push(handle.0);
        Some(chunk)
    }

    /// Looks up a block by its global coordinates.
    ///
    /// # Arguments
    /// * `position` - Global block coordinates, or local ones for floating chunks
    /// * `floating_id` - Reads from that floating chunk instead of the grid
    ///
    /// # Returns
    /// `None` (void) if the chunk isn't loaded, or if the local coordinates
    /// fall outside a floating chunk.
    pub fn get_block(&self, position: Point3<i32>, floating_id: Option<FloatingId>) -> Option<BlockTypeSize> {
        match floating_id {
            Some(id) => {
                let chunk = self.chunk(self.lookup(ChunkKey::Floating(id))?)?;
                Chunk::inside(position).then(|| chunk.get(position))
            }
            None => {
                let (chunk_position, local) = global_to_chunk(position);
                let chunk = self.chunk(self.lookup(ChunkKey::Grid(chunk_position))?)?;
                Some(chunk.get(local))
            }
        }
    }

    /// Sets a block by its global coordinates. Does nothing if the chunk
    /// doesn't exist. Floating chunks take local coordinates and are not clamped;
    /// writes outside them are dropped.
    pub fn set_block(
        &mut self,
        position: Point3<i32>,
        block: BlockTypeSize,
        floating_id: Option<FloatingId>,
    ) -> SetBlockOutcome {
        let (chunk_position, local, key) = match floating_id {
            Some(id) => (Point3::origin(), position, ChunkKey::Floating(id)),
            None => {
                let (chunk_position, local) = global_to_chunk(position);
                (chunk_position, local, ChunkKey::Grid(chunk_position))
            }
        };
        let mut handle = self.lookup(key);
        if floating_id.is_some() && !Chunk::inside(local) {
            handle = None;
        }
        let mut previous = None;
        if let Some(chunk) = handle.and_then(|handle| self.chunk_mut(handle)) {
            previous = Some(chunk.get(local));
            chunk.set(local, block);
        }
        SetBlockOutcome {
            chunk: handle,
            chunk_position,
            local,
            previous,
        }
    }

    /// Reads a chunk-local coordinate that may spill into an adjacent chunk.
    /// See [`Chunk::get_with_neighbor`].
    pub fn get_with_neighbor(&self, handle: ChunkHandle, local: Point3<i32>) -> Option<BlockTypeSize> {
        self.chunk(handle)?.get_with_neighbor(self, local)
    }

    /// Snapshot of every registered chunk, grid chunks first. The list is
    /// not live, so it's safe to register or delete while iterating it.
    pub fn chunks(&self) -> Vec<ChunkHandle> {
        self.grid.values().chain(self.floating.values()).copied().collect()
    }

    /// Snapshot of the floating chunks.
    pub fn floating_chunks(&self) -> Vec<ChunkHandle> {
        self.floating.values().copied().collect()
    }

    /// Whether entities collide with the block at the given global coordinates.
    /// Unloaded blocks are not solid.
    pub fn is_solid(&self, position: Point3<i32>) -> bool {
        block::is_solid(self.get_block(position, None))
    }

    /// Casts a ray through the grid and through every floating chunk.
    ///
    /// Floating chunks are traversed in their own local space by carrying the
    /// ray through the inverse of their transform; hits are brought back to
    /// world space before picking the closest one.
    ///
    /// # Arguments
    /// * `origin` - World-space starting point
    /// * `direction` - Unit direction vector
    /// * `max_distance` - Reach of the ray
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<WorldRaycastHit> {
        let mut closest = raycast(|cell| self.is_solid(cell), origin, direction, max_distance)
            .next()
            .map(|hit| WorldRaycastHit {
                block: hit.block,
                position: hit.position,
                normal: hit.normal,
                distance: hit.distance,
                floating_id: None,
                transform: None,
            });

        for handle in self.floating.values() {
            let Some(chunk) = self.chunk(*handle) else { continue };
            let ChunkPosition::Floating { id, transform } = chunk.position else {
                continue;
            };
            let local_to_world = transform.unwrap_or_else(Matrix4::identity);
            let Some(world_to_local) = local_to_world.invert() else {
                warn!("Floating chunk {} has a singular transform, skipping raycast", id);
                continue;
            };
            let local_origin = world_to_local.transform_point(origin);
            let local_direction = world_to_local.transform_vector(direction);
            let hit: Option<RaycastHit> = raycast(
                |cell| block::is_solid(Some(chunk.get_checked(cell, block::AIR))),
                local_origin,
                local_direction,
                max_distance,
            )
            .next();
            let Some(hit) = hit else { continue };

            let position = local_to_world.transform_point(hit.position);
            let distance = origin.distance(position);
            if closest.map_or(true, |closest| distance < closest.distance) {
                closest = Some(WorldRaycastHit {
                    block: hit.block,
                    position,
                    normal: hit.normal,
                    distance,
                    floating_id: Some(id),
                    transform,
                });
            }
        }

        closest
    }
}
