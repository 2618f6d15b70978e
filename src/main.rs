//! # Voxel Engine Entry Point
//!
//! Runs the library's demo scene. The optional first argument is a JSON
//! configuration file.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- engine.json
//! ```

use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    voxel_engine_core::run(config_path.as_deref())
}
