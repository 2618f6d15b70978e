#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Engine Core
//!
//! The data side of a voxel engine: chunked block storage, a neighbor-linked
//! world registry, incremental chunk meshing and voxel raycasting.
//!
//! ## Key Modules
//!
//! * `engine_state` - The world, the mesh builder, the mesh worker and the engine coordinator
//! * `config` - JSON configuration of the engine's tunables
//!
//! ## Architecture
//!
//! * Chunks are 32x32x32 dense arrays of block ids, linked to their 26 neighbors
//! * Meshes are cached in 27 regions per chunk so block writes only remesh what they touch
//! * Meshing runs on a dedicated worker thread that owns its own copy of the world
//! * Face buffers are plain bytes ready to be uploaded by a GPU renderer
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     voxel_engine_core::run(None)
//! }
//! ```

use std::path::Path;

use log::info;

pub mod config;
mod demo;
pub mod engine_state;

use config::EngineConfig;

/// Initializes logging, loads the configuration and runs the demo scene.
///
/// # Arguments
/// * `config_path` - JSON configuration file; defaults are used when `None`
pub fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    let mut log_builder = env_logger::Builder::new();
    log_builder.target(env_logger::Target::Stdout);
    match &config.log_filter {
        Some(filter) => log_builder.parse_filters(filter),
        None => log_builder.parse_env("RUST_LOG"),
    };
    log_builder.try_init()?;

    info!("Logger initialized");
    demo::run(config)
}
