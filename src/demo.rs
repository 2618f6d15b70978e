//! Demo scene: a few chunks of random terrain, an ambient occlusion showcase
//! and a floating chunk, meshed on the worker and probed with raycasts.

use std::mem::size_of;

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use log::{info, warn};
use web_time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::engine_state::{
    rendering::FaceRecord,
    task_management::message::ChunkPayload,
    voxels::{
        block::{block_type::BlockType, BlockTypeSize, AIR},
        chunk::{Chunk, ChunkPosition, CHUNK_DIMENSION},
    },
    EngineState,
};

/// Terrain chunks along X and Z.
const TERRAIN_EXTENT: i32 = 2;
const FLOATING_ID: u32 = 1;
const MESH_TIMEOUT: Duration = Duration::from_secs(5);

fn blank_chunk() -> Chunk {
    Chunk::new(ChunkPosition::Grid(Point3::origin()))
}

/// Rolling terrain: stone with a grass cover and the occasional random block.
fn terrain_chunk() -> Vec<BlockTypeSize> {
    let mut chunk = blank_chunk();
    for x in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            let height = 8 + fastrand::i32(0..4);
            for y in 0..height {
                chunk.set(Point3::new(x, y, z), BlockType::STONE.id());
            }
            chunk.set(Point3::new(x, height, z), BlockType::GRASS.id());
            if fastrand::u8(0..64) == 0 {
                chunk.set(Point3::new(x, height + 1, z), BlockType::get_random_type().id());
            }
        }
    }
    chunk.into_data()
}

/// A white floor with pillars and steps that produce every occlusion level.
fn ao_showcase_chunk() -> Vec<BlockTypeSize> {
    let white = BlockType::WHITE.id();
    let mut chunk = blank_chunk();
    for x in 0..CHUNK_DIMENSION {
        for z in 0..CHUNK_DIMENSION {
            chunk.set(Point3::new(x, 0, z), white);
        }
    }
    for step in 0..4 {
        for y in 1..=step + 1 {
            chunk.set(Point3::new(4 + step * 2, y, 4), white);
        }
    }
    for (x, z) in [(16, 16), (17, 17), (16, 17)] {
        chunk.set(Point3::new(x, 1, z), white);
    }
    chunk.into_data()
}

/// A small glass cage around a leaf core.
fn floating_chunk() -> Vec<BlockTypeSize> {
    let mut chunk = blank_chunk();
    for x in 0..5 {
        for y in 0..5 {
            for z in 0..5 {
                let shell = [x, y, z].iter().any(|&c| c == 0 || c == 4);
                let block = if shell {
                    BlockType::GLASS.id()
                } else {
                    BlockType::LEAVES.id()
                };
                chunk.set(Point3::new(x, y, z), block);
            }
        }
    }
    chunk.into_data()
}

/// Builds the scene, waits for its meshes and logs what was produced.
pub fn run(config: EngineConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut engine = EngineState::new(config)?;

    let mut chunks = Vec::new();
    for x in 0..TERRAIN_EXTENT {
        for z in 0..TERRAIN_EXTENT {
            chunks.push(ChunkPayload {
                position: ChunkPosition::Grid(Point3::new(x, 0, z)),
                data: terrain_chunk(),
            });
        }
    }
    chunks.push(ChunkPayload {
        position: ChunkPosition::Grid(Point3::new(TERRAIN_EXTENT + 1, 0, 0)),
        data: ao_showcase_chunk(),
    });
    let expected = chunks.len() + 1;
    engine.set_chunks(chunks)?;

    let transform = Matrix4::from_translation(Vector3::new(8.0, 40.0, 8.0));
    engine.set_lone_chunk(FLOATING_ID, Some(transform), floating_chunk())?;

    // Dig a hole through the grass to exercise incremental remeshing.
    engine.set_block(Point3::new(31, 8, 31), AIR, None)?;
    engine.set_block(Point3::new(32, 8, 32), AIR, None)?;

    let deadline = Instant::now() + MESH_TIMEOUT;
    while engine.meshes().count() < expected {
        let now = Instant::now();
        if now >= deadline {
            warn!("Timed out waiting for meshes");
            break;
        }
        engine.wait_for_mesh_messages(deadline - now);
    }

    let faces: usize = engine
        .meshes()
        .map(|(_, data)| data.len() / size_of::<FaceRecord>())
        .sum();
    info!(
        "Meshed {} chunks with {} faces in {:?} (last flush {:?})",
        engine.meshes().count(),
        faces,
        start.elapsed(),
        engine.last_mesh_time()
    );

    let down = Vector3::new(0.0, -1.0, 0.0);
    for origin in [Point3::new(10.5, 60.0, 10.5), Point3::new(40.5, 60.0, 20.5)] {
        match engine.raycast(origin, down, None) {
            Some(hit) => info!(
                "Ray from {:?} hit block {:?} at {:?} (floating chunk {:?})",
                origin, hit.block, hit.position, hit.floating_id
            ),
            None => info!("Ray from {:?} hit nothing", origin),
        }
    }
    info!(
        "Block below the floating chunk is solid: {}",
        engine.is_solid_at(Point3::new(10, 8, 10))
    );

    Ok(())
}
