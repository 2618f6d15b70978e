//! # Task Management
//!
//! Runs mesh generation on a dedicated worker thread so large remesh batches
//! never stall the caller.
//!
//! ## Architecture Overview
//! - `MeshWorkerHandle`: owned by the engine; sends requests and collects results
//! - `MeshWorker`: lives on the worker thread and exclusively owns its copy of the
//!   world and every mesh cache, so no locking is needed
//! - `message`: the request and result types crossing the thread boundary
//!
//! ## Lifecycle
//! 1. The engine publishes requests via `MeshWorkerHandle::send()`
//! 2. The worker applies every request queued at the time it wakes up as one tick
//! 3. Dirty chunks are remeshed at the end of the tick, or earlier once more
//!    than `flush_threshold` chunks are waiting
//! 4. Results are drained on the engine side in `poll()`
//!
//! Dropping the handle closes the request channel and joins the worker.

pub mod mesh_worker;
pub mod message;

use std::io;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{error, info};
use thiserror::Error;
use web_time::Duration;

use crate::config::EngineConfig;
use mesh_worker::MeshWorker;
use message::{MeshWorkerMessage, MeshWorkerRequest};

/// Errors raised by the mesh worker channel.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// The other end of the channel is gone.
    #[error("mesh worker channel disconnected")]
    Disconnected,
    /// The worker thread could not be started.
    #[error("failed to spawn mesh worker thread")]
    Spawn(#[from] io::Error),
}

/// Engine-side end of the mesh worker.
///
/// # Fields
/// - `request_sender`: Sends requests to the worker; dropped first on shutdown
/// - `message_receiver`: Receives meshes and timings from the worker
/// - `worker`: Handle to the worker thread, joined on drop
#[derive(Debug)]
pub struct MeshWorkerHandle {
    request_sender: Option<Sender<MeshWorkerRequest>>,
    message_receiver: Receiver<MeshWorkerMessage>,
    worker: Option<JoinHandle<()>>,
}

impl MeshWorkerHandle {
    /// Starts the mesh worker thread.
    ///
    /// # Arguments
    /// * `config` - Supplies the flush threshold
    pub fn spawn(config: &EngineConfig) -> Result<Self, WorkerError> {
        let (request_tx, request_rx) = channel::<MeshWorkerRequest>();
        let (message_tx, message_rx) = channel::<MeshWorkerMessage>();
        let flush_threshold = config.flush_threshold;

        let worker_closure = move || {
            let worker = MeshWorker::new(flush_threshold, message_tx);
            match mesh_worker::run(worker, request_rx) {
                Ok(()) => info!("Mesh worker stopped"),
                Err(error) => error!("Mesh worker stopped: {}", error),
            }
        };

        let worker = thread::Builder::new()
            .name("mesh-worker".to_string())
            .spawn(worker_closure)?;
        info!("Mesh worker started (flush threshold {})", flush_threshold);

        Ok(MeshWorkerHandle {
            request_sender: Some(request_tx),
            message_receiver: message_rx,
            worker: Some(worker),
        })
    }

    /// Publishes a request. Never blocks.
    ///
    /// # Returns
    /// `Err(WorkerError::Disconnected)` if the worker has stopped.
    pub fn send(&self, request: MeshWorkerRequest) -> Result<(), WorkerError> {
        self.request_sender
            .as_ref()
            .ok_or(WorkerError::Disconnected)?
            .send(request)
            .map_err(|_| WorkerError::Disconnected)
    }

    /// Drains every message the worker has produced so far without blocking.
    pub fn poll(&self) -> Vec<MeshWorkerMessage> {
        self.message_receiver.try_iter().collect()
    }

    /// Waits up to `timeout` for the next message.
    pub fn wait(&self, timeout: Duration) -> Option<MeshWorkerMessage> {
        self.message_receiver.recv_timeout(timeout).ok()
    }
}

impl Drop for MeshWorkerHandle {
    fn drop(&mut self) {
        self.request_sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Mesh worker panicked");
            }
        }
    }
}
