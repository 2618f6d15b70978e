//! # Engine State Module
//!
//! The engine-side coordinator of the voxel world.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the main-thread world and the mesh worker
//! * `rendering` - Mesh generation: region caches, face culling, ambient occlusion
//! * `task_management` - The mesh worker thread and its message protocol
//! * `voxels` - Blocks, chunks, the world registry and raycasting
//!
//! ## Architecture
//!
//! The engine keeps its own `World` for queries that must answer immediately
//! (block lookups, collision, raycasts), while the mesh worker keeps a second
//! copy that it remeshes from. Every chunk payload and block write is applied
//! to both: locally right away, and on the worker through a request message.
//! Finished meshes flow back and are stored per chunk until the renderer
//! picks them up.

use std::collections::HashMap;

use cgmath::{Matrix4, Point3, Vector3};
use log::{debug, trace, warn};
use thiserror::Error;
use web_time::Duration;

use crate::config::EngineConfig;
use task_management::{
    message::{BlockUpdate, ChunkPayload, MeshWorkerMessage, MeshWorkerRequest},
    MeshWorkerHandle, WorkerError,
};
use voxels::{
    block::BlockTypeSize,
    chunk::{Chunk, ChunkDataError, ChunkKey, ChunkPosition, FloatingId},
    world::{SetBlockOutcome, World, WorldRaycastHit},
};

pub mod rendering;
pub mod task_management;
pub mod voxels;

/// Errors surfaced by [`EngineState`].
#[derive(Error, Debug)]
pub enum EngineError {
    /// A chunk payload was malformed.
    #[error(transparent)]
    ChunkData(#[from] ChunkDataError),
    /// The mesh worker is unavailable.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// The main state container of the voxel engine.
///
/// # Examples
///
/// ```no_run
/// use voxel_engine_core::{config::EngineConfig, engine_state::EngineState};
///
/// let mut engine = EngineState::new(EngineConfig::default())?;
/// // Main loop
/// loop {
///     engine.process_mesh_messages();
///     // hand engine.meshes() to the renderer
/// #   break;
/// }
/// # Ok::<(), voxel_engine_core::engine_state::EngineError>(())
/// ```
pub struct EngineState {
    /// The main-thread copy of the voxel world
    pub world: World,
    config: EngineConfig,
    mesh_worker: MeshWorkerHandle,
    /// Latest face buffer per chunk, as `FaceRecord` bytes
    meshes: HashMap<ChunkKey, Vec<u8>>,
    last_mesh_time: Option<Duration>,
}

impl EngineState {
    /// Creates the engine state and starts the mesh worker.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mesh_worker = MeshWorkerHandle::spawn(&config)?;
        Ok(EngineState {
            world: World::default(),
            config,
            mesh_worker,
            meshes: HashMap::new(),
            last_mesh_time: None,
        })
    }

    /// The configuration the engine runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loads or replaces chunks.
    ///
    /// Every payload is validated before anything is applied, so a malformed
    /// batch leaves both worlds untouched.
    pub fn set_chunks(&mut self, chunks: Vec<ChunkPayload>) -> Result<(), EngineError> {
        let mut local = Vec::with_capacity(chunks.len());
        for payload in &chunks {
            local.push(Chunk::with_data(payload.position, payload.data.clone())?);
        }
        for chunk in local {
            self.world.register(chunk);
        }
        debug!("Loading {} chunks", chunks.len());
        self.mesh_worker
            .send(MeshWorkerRequest::ChunkData { chunks })?;
        Ok(())
    }

    /// Loads or replaces a floating chunk, e.g. to move it to a new transform.
    pub fn set_lone_chunk(
        &mut self,
        id: FloatingId,
        transform: Option<Matrix4<f32>>,
        data: Vec<BlockTypeSize>,
    ) -> Result<(), EngineError> {
        let chunk = Chunk::with_data(ChunkPosition::Floating { id, transform }, data.clone())?;
        self.world.register(chunk);
        self.mesh_worker
            .send(MeshWorkerRequest::LoneChunkData { id, transform, data })?;
        Ok(())
    }

    /// Writes a single block.
    ///
    /// # Arguments
    /// * `position` - Global coordinates, or local ones when `floating_id` is set
    /// * `block` - The new block id
    /// * `floating_id` - Targets a floating chunk instead of the grid
    pub fn set_block(
        &mut self,
        position: Point3<i32>,
        block: BlockTypeSize,
        floating_id: Option<FloatingId>,
    ) -> Result<SetBlockOutcome, EngineError> {
        let outcome = self.world.set_block(position, block, floating_id);
        self.mesh_worker.send(MeshWorkerRequest::BlockUpdate {
            blocks: vec![BlockUpdate {
                position,
                block,
                floating_id,
            }],
        })?;
        Ok(outcome)
    }

    /// Writes a batch of blocks in order.
    pub fn set_blocks(&mut self, blocks: Vec<BlockUpdate>) -> Result<(), EngineError> {
        for update in &blocks {
            self.world
                .set_block(update.position, update.block, update.floating_id);
        }
        self.mesh_worker
            .send(MeshWorkerRequest::BlockUpdate { blocks })?;
        Ok(())
    }

    /// Unloads a grid chunk and drops its mesh.
    pub fn forget_chunk(&mut self, position: Point3<i32>) -> Result<(), EngineError> {
        self.world.delete(position);
        self.meshes.remove(&ChunkKey::Grid(position));
        self.mesh_worker
            .send(MeshWorkerRequest::Forget { chunk: position })?;
        Ok(())
    }

    /// Unloads a floating chunk and drops its mesh.
    pub fn forget_lone_chunk(&mut self, id: FloatingId) -> Result<(), EngineError> {
        self.world.delete_floating(id);
        self.meshes.remove(&ChunkKey::Floating(id));
        self.mesh_worker.send(MeshWorkerRequest::ForgetLone { id })?;
        Ok(())
    }

    /// Collects everything the mesh worker has finished.
    ///
    /// Meshes of chunks that were forgotten in the meantime are discarded.
    ///
    /// # Returns
    /// The number of meshes stored.
    pub fn process_mesh_messages(&mut self) -> usize {
        let messages = self.mesh_worker.poll();
        self.store_messages(messages)
    }

    /// Like [`EngineState::process_mesh_messages`], but first waits up to
    /// `timeout` for the worker to produce something.
    pub fn wait_for_mesh_messages(&mut self, timeout: Duration) -> usize {
        let Some(first) = self.mesh_worker.wait(timeout) else {
            return 0;
        };
        let mut messages = vec![first];
        messages.extend(self.mesh_worker.poll());
        self.store_messages(messages)
    }

    fn store_messages(&mut self, messages: Vec<MeshWorkerMessage>) -> usize {
        let mut stored = 0;
        for message in messages {
            match message {
                MeshWorkerMessage::Mesh { position, data } => {
                    let key = position.key();
                    if self.world.lookup(key).is_none() {
                        warn!("Discarding mesh for unloaded chunk {:?}", key);
                        continue;
                    }
                    trace!("Stored mesh for {:?}: {} bytes", key, data.len());
                    self.meshes.insert(key, data);
                    stored += 1;
                }
                MeshWorkerMessage::MeshTime { time } => {
                    debug!("Mesh worker flush took {:?}", time);
                    self.last_mesh_time = Some(time);
                }
            }
        }
        stored
    }

    /// The latest face buffer of a chunk.
    pub fn mesh_for(&self, key: ChunkKey) -> Option<&[u8]> {
        self.meshes.get(&key).map(Vec::as_slice)
    }

    /// Every stored face buffer.
    pub fn meshes(&self) -> impl Iterator<Item = (&ChunkKey, &[u8])> {
        self.meshes.iter().map(|(key, data)| (key, data.as_slice()))
    }

    /// Time the mesh worker spent on its most recent flush.
    pub fn last_mesh_time(&self) -> Option<Duration> {
        self.last_mesh_time
    }

    /// Whether the block at the given global coordinates blocks movement.
    pub fn is_solid_at(&self, position: Point3<i32>) -> bool {
        self.world.is_solid(position)
    }

    /// Casts a ray through the grid and every floating chunk.
    ///
    /// # Arguments
    /// * `max_distance` - Reach of the ray; the configured default when `None`
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: Option<f32>,
    ) -> Option<WorldRaycastHit> {
        let max_distance = max_distance.unwrap_or(self.config.max_ray_distance);
        self.world.raycast(origin, direction, max_distance)
    }
}
