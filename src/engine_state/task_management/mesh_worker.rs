//! The mesh worker's state: its own copy of the world plus the mesh caches.
//!
//! Requests are applied one at a time. Remeshing is deferred until the end of
//! a scheduling tick (see [`run`]) unless too many chunks are waiting, in which
//! case the pending work is flushed right away.

use std::sync::mpsc::{Receiver, Sender};

use log::{debug, warn};
use web_time::Instant;

use super::message::{BlockUpdate, ChunkPayload, MeshWorkerMessage, MeshWorkerRequest};
use super::WorkerError;
use crate::engine_state::rendering::meshing::{face_bytes, MeshManager};
use crate::engine_state::voxels::{
    chunk::{Chunk, ChunkKey, ChunkPosition},
    world::World,
};

/// World and mesh caches owned by the mesh worker thread.
pub struct MeshWorker {
    world: World,
    meshes: MeshManager,
    flush_threshold: usize,
    outbox: Sender<MeshWorkerMessage>,
}

impl MeshWorker {
    /// Creates a worker that reports meshes through `outbox`.
    ///
    /// # Arguments
    /// * `flush_threshold` - Number of waiting chunks above which a request
    ///   flushes immediately instead of at the end of the tick
    /// * `outbox` - Receives `Mesh` and `MeshTime` messages
    pub fn new(flush_threshold: usize, outbox: Sender<MeshWorkerMessage>) -> Self {
        MeshWorker {
            world: World::default(),
            meshes: MeshManager::new(),
            flush_threshold,
            outbox,
        }
    }

    /// The worker's copy of the world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of chunks waiting for a remesh.
    pub fn pending(&self) -> usize {
        self.meshes.pending()
    }

    /// Applies one request, flushing if the dirty set grew past the threshold.
    pub fn handle(&mut self, request: MeshWorkerRequest) -> Result<(), WorkerError> {
        match request {
            MeshWorkerRequest::ChunkData { chunks } => {
                for payload in chunks {
                    self.load_chunk(payload);
                    self.flush_if_over_threshold()?;
                }
            }
            MeshWorkerRequest::LoneChunkData { id, transform, data } => {
                self.load_chunk(ChunkPayload {
                    position: ChunkPosition::Floating { id, transform },
                    data,
                });
                self.flush_if_over_threshold()?;
            }
            MeshWorkerRequest::BlockUpdate { blocks } => {
                for update in blocks {
                    self.apply_block_update(update);
                    self.flush_if_over_threshold()?;
                }
            }
            MeshWorkerRequest::Forget { chunk } => {
                if let Some(handle) = self.world.lookup(ChunkKey::Grid(chunk)) {
                    self.meshes.forget(handle);
                }
                self.world.delete(chunk);
            }
            MeshWorkerRequest::ForgetLone { id } => {
                if let Some(handle) = self.world.lookup(ChunkKey::Floating(id)) {
                    self.meshes.forget(handle);
                }
                self.world.delete_floating(id);
            }
        }
        Ok(())
    }

    fn load_chunk(&mut self, payload: ChunkPayload) {
        let chunk = match Chunk::with_data(payload.position, payload.data) {
            Ok(chunk) => chunk,
            Err(error) => {
                warn!("Dropping chunk {:?}: {}", payload.position, error);
                return;
            }
        };
        let handle = self.world.register(chunk);
        self.meshes.chunk_loaded(&self.world, handle);
    }

    fn apply_block_update(&mut self, update: BlockUpdate) {
        let outcome = self
            .world
            .set_block(update.position, update.block, update.floating_id);
        if outcome.chunk.is_none() {
            warn!(
                "Block update at {:?} (floating {:?}) targets an unloaded chunk",
                update.position, update.floating_id
            );
            return;
        }
        self.meshes.block_changed(&self.world, &outcome);
    }

    fn flush_if_over_threshold(&mut self) -> Result<(), WorkerError> {
        if self.meshes.pending() > self.flush_threshold {
            debug!(
                "{} chunks pending, flushing before the end of the tick",
                self.meshes.pending()
            );
            self.flush()?;
        }
        Ok(())
    }

    /// Remeshes every waiting chunk and sends the results.
    ///
    /// Sends one `Mesh` message per remeshed chunk followed by one `MeshTime`
    /// message. Does nothing when no chunk is waiting.
    pub fn flush(&mut self) -> Result<(), WorkerError> {
        if self.meshes.pending() == 0 {
            return Ok(());
        }
        let start = Instant::now();
        let meshes = self.meshes.flush(&self.world);
        let time = start.elapsed();
        for (position, faces) in meshes {
            self.outbox
                .send(MeshWorkerMessage::Mesh {
                    position,
                    data: face_bytes(&faces).to_vec(),
                })
                .map_err(|_| WorkerError::Disconnected)?;
        }
        self.outbox
            .send(MeshWorkerMessage::MeshTime { time })
            .map_err(|_| WorkerError::Disconnected)
    }
}

/// The worker thread's loop.
///
/// Blocks for the next request, then applies every request already queued
/// behind it as one tick before flushing. Returns when the request channel
/// closes or the engine stops listening.
pub fn run(
    mut worker: MeshWorker,
    requests: Receiver<MeshWorkerRequest>,
) -> Result<(), WorkerError> {
    while let Ok(first) = requests.recv() {
        for request in std::iter::once(first).chain(requests.try_iter()) {
            worker.handle(request)?;
        }
        worker.flush()?;
    }
    Ok(())
}
