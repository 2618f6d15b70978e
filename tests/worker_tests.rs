use std::time::{Duration, Instant};

use cgmath::{Matrix4, Point3, Vector3};
use voxel_engine_core::config::EngineConfig;
use voxel_engine_core::engine_state::{
    task_management::{
        message::{BlockUpdate, ChunkPayload, MeshWorkerMessage, MeshWorkerRequest},
        MeshWorkerHandle,
    },
    voxels::{
        block::{block_type::BlockType, AIR},
        chunk::{ChunkKey, ChunkPosition, CHUNK_DIMENSION, CHUNK_SIZE},
    },
    EngineError, EngineState,
};

const FACE_SIZE: usize = 8;

fn single_block_payload(position: Point3<i32>) -> ChunkPayload {
    let mut data = vec![AIR; CHUNK_SIZE as usize];
    let index = ((5 * CHUNK_DIMENSION + 5) * CHUNK_DIMENSION + 5) as usize;
    data[index] = BlockType::STONE.id();
    ChunkPayload {
        position: ChunkPosition::Grid(position),
        data,
    }
}

/// Pumps mesh messages until `done` holds or five seconds pass.
fn wait_until(engine: &mut EngineState, done: impl Fn(&EngineState) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(engine) {
        if Instant::now() >= deadline {
            return false;
        }
        engine.wait_for_mesh_messages(Duration::from_millis(50));
    }
    true
}

fn face_count(engine: &EngineState, key: ChunkKey) -> Option<usize> {
    engine.mesh_for(key).map(|data| data.len() / FACE_SIZE)
}

#[test]
fn loaded_chunks_come_back_meshed() {
    let mut engine = EngineState::new(EngineConfig::default()).unwrap();
    let key = ChunkKey::Grid(Point3::new(0, 0, 0));
    engine
        .set_chunks(vec![single_block_payload(Point3::new(0, 0, 0))])
        .unwrap();
    assert!(wait_until(&mut engine, |engine| engine.mesh_for(key).is_some()));
    assert_eq!(face_count(&engine, key), Some(6));
    assert!(engine.last_mesh_time().is_some());
}

#[test]
fn block_updates_are_remeshed() {
    let mut engine = EngineState::new(EngineConfig::default()).unwrap();
    let key = ChunkKey::Grid(Point3::new(0, 0, 0));
    engine
        .set_chunks(vec![single_block_payload(Point3::new(0, 0, 0))])
        .unwrap();
    assert!(wait_until(&mut engine, |engine| face_count(engine, key) == Some(6)));

    engine
        .set_blocks(vec![BlockUpdate {
            position: Point3::new(6, 5, 5),
            block: BlockType::STONE.id(),
            floating_id: None,
        }])
        .unwrap();
    assert!(engine.is_solid_at(Point3::new(6, 5, 5)));
    assert!(wait_until(&mut engine, |engine| face_count(engine, key) == Some(10)));

    engine.set_block(Point3::new(5, 5, 5), AIR, None).unwrap();
    assert!(wait_until(&mut engine, |engine| face_count(engine, key) == Some(6)));
}

#[test]
fn forgotten_chunks_lose_their_mesh() {
    let mut engine = EngineState::new(EngineConfig::default()).unwrap();
    let key = ChunkKey::Grid(Point3::new(2, 0, 0));
    engine
        .set_chunks(vec![single_block_payload(Point3::new(2, 0, 0))])
        .unwrap();
    assert!(wait_until(&mut engine, |engine| engine.mesh_for(key).is_some()));

    engine.forget_chunk(Point3::new(2, 0, 0)).unwrap();
    assert!(engine.mesh_for(key).is_none());
    assert!(engine.world.lookup(key).is_none());
    engine.process_mesh_messages();
    assert!(engine.mesh_for(key).is_none());
}

#[test]
fn lone_chunks_are_meshed_and_raycast() {
    let mut engine = EngineState::new(EngineConfig::default()).unwrap();
    let mut data = vec![AIR; CHUNK_SIZE as usize];
    data[0] = BlockType::WHITE.id();
    let transform = Matrix4::from_translation(Vector3::new(0.0, 100.0, 0.0));
    engine.set_lone_chunk(9, Some(transform), data).unwrap();

    let key = ChunkKey::Floating(9);
    assert!(wait_until(&mut engine, |engine| engine.mesh_for(key).is_some()));
    assert_eq!(face_count(&engine, key), Some(6));

    let hit = engine
        .raycast(
            Point3::new(0.5, 120.0, 0.5),
            Vector3::new(0.0, -1.0, 0.0),
            None,
        )
        .unwrap();
    assert_eq!(hit.floating_id, Some(9));
    assert!((hit.position.y - 101.0).abs() < 1e-4);

    engine.forget_lone_chunk(9).unwrap();
    assert!(engine.mesh_for(key).is_none());
}

#[test]
fn raycast_uses_configured_reach() {
    let config = EngineConfig {
        max_ray_distance: 10.0,
        ..EngineConfig::default()
    };
    let mut engine = EngineState::new(config).unwrap();
    engine
        .set_chunks(vec![single_block_payload(Point3::new(0, 0, 0))])
        .unwrap();
    let origin = Point3::new(5.5, 25.5, 5.5);
    let down = Vector3::new(0.0, -1.0, 0.0);
    assert!(engine.raycast(origin, down, None).is_none());
    let hit = engine.raycast(origin, down, Some(30.0)).unwrap();
    assert_eq!(hit.block, Point3::new(5, 5, 5));
}

#[test]
fn malformed_payload_is_rejected() {
    let mut engine = EngineState::new(EngineConfig::default()).unwrap();
    let result = engine.set_chunks(vec![ChunkPayload {
        position: ChunkPosition::Grid(Point3::new(0, 0, 0)),
        data: vec![AIR; 12],
    }]);
    assert!(matches!(result, Err(EngineError::ChunkData(_))));
    assert!(engine.world.is_empty());
}

#[test]
fn handle_talks_to_the_worker_directly() {
    let worker = MeshWorkerHandle::spawn(&EngineConfig::default()).unwrap();
    worker
        .send(MeshWorkerRequest::ChunkData {
            chunks: vec![single_block_payload(Point3::new(0, 0, 0))],
        })
        .unwrap();

    let mut meshes = 0;
    let mut timings = 0;
    while timings == 0 {
        match worker.wait(Duration::from_secs(5)) {
            Some(MeshWorkerMessage::Mesh { data, .. }) => {
                assert_eq!(data.len(), 6 * FACE_SIZE);
                meshes += 1;
            }
            Some(MeshWorkerMessage::MeshTime { .. }) => timings += 1,
            None => panic!("mesh worker produced nothing"),
        }
    }
    assert_eq!(meshes, 1);
    assert!(worker.poll().is_empty());
}
