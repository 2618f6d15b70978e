use cgmath::{Point3, Vector3};
use voxel_engine_core::engine_state::voxels::{
    block::{block_type::BlockType, AIR},
    chunk::{neighborhood::neighbor_offsets, Chunk, ChunkKey, ChunkPosition, CHUNK_SIZE},
    world::World,
};

fn grid(x: i32, y: i32, z: i32) -> ChunkPosition {
    ChunkPosition::Grid(Point3::new(x, y, z))
}

fn cube_world() -> World {
    let mut world = World::default();
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                world.ensure(grid(x, y, z));
            }
        }
    }
    world
}

#[test]
fn neighbor_links_are_symmetric() {
    let world = cube_world();
    assert_eq!(world.len(), 27);
    for a in world.chunks() {
        let chunk_a = world.chunk(a).unwrap();
        for offset in neighbor_offsets() {
            let Some(b) = chunk_a.neighbor(offset) else { continue };
            let chunk_b = world.chunk(b).unwrap();
            assert_eq!(chunk_b.neighbor(-offset), Some(a), "offset {:?}", offset);
        }
    }

    let center = world.lookup(Point3::new(0, 0, 0).into()).unwrap();
    let center_chunk = world.chunk(center).unwrap();
    assert_eq!(center_chunk.neighbor(Vector3::new(0, 0, 0)), Some(center));
    assert!(neighbor_offsets().all(|offset| center_chunk.neighbor(offset).is_some()));
}

#[test]
fn links_follow_registration_order() {
    let mut world = World::default();
    let a = world.ensure(grid(0, 0, 0));
    assert_eq!(world.chunk(a).unwrap().neighbor(Vector3::new(1, 1, 0)), None);

    let b = world.ensure(grid(1, 1, 0));
    assert_eq!(world.chunk(a).unwrap().neighbor(Vector3::new(1, 1, 0)), Some(b));
    assert_eq!(world.chunk(b).unwrap().neighbor(Vector3::new(-1, -1, 0)), Some(a));

    // Two apart: not neighbors.
    let c = world.ensure(grid(2, 0, 0));
    assert!(world
        .chunk(c)
        .unwrap()
        .neighbors()
        .iter()
        .filter_map(|slot| *slot)
        .all(|handle| handle == c || handle == b));
}

#[test]
fn void_and_air_are_distinct() {
    let mut world = World::default();
    let origin = world.ensure(grid(0, 0, 0));
    let outside = Point3::new(-1, 4, 4);
    assert_eq!(world.get_with_neighbor(origin, outside), None);

    let west = world.ensure(grid(-1, 0, 0));
    assert_eq!(world.get_with_neighbor(origin, outside), Some(AIR));

    world
        .chunk_mut(west)
        .unwrap()
        .set(Point3::new(31, 4, 4), BlockType::STONE.id());
    assert_eq!(
        world.get_with_neighbor(origin, outside),
        Some(BlockType::STONE.id())
    );
}

#[test]
fn delete_unlinks_neighbors() {
    let mut world = cube_world();
    let center = world.lookup(Point3::new(0, 0, 0).into()).unwrap();
    let removed = world.delete(Point3::new(1, 0, 0)).unwrap();
    assert_eq!(removed.position, grid(1, 0, 0));
    assert_eq!(removed.into_data().len(), CHUNK_SIZE as usize);

    assert_eq!(world.lookup(Point3::new(1, 0, 0).into()), None);
    assert_eq!(world.chunk(center).unwrap().neighbor(Vector3::new(1, 0, 0)), None);
    assert_eq!(world.get_with_neighbor(center, Point3::new(32, 0, 0)), None);
    assert_eq!(world.len(), 26);
    assert!(world.delete(Point3::new(1, 0, 0)).is_none());
}

#[test]
fn global_block_access_spans_chunks() {
    let mut world = cube_world();
    let stone = BlockType::STONE.id();
    for position in [
        Point3::new(0, 0, 0),
        Point3::new(-1, -1, -1),
        Point3::new(31, 32, -32),
        Point3::new(-32, 63, 5),
    ] {
        let outcome = world.set_block(position, stone, None);
        assert!(outcome.chunk.is_some(), "{:?}", position);
        assert_eq!(world.get_block(position, None), Some(stone));
        assert!(world.is_solid(position));
    }

    let outcome = world.set_block(Point3::new(-1, 32, 5), stone, None);
    assert_eq!(outcome.chunk_position, Point3::new(-1, 1, 0));
    assert_eq!(outcome.local, Point3::new(31, 0, 5));

    // Outside the loaded cube.
    let outcome = world.set_block(Point3::new(100, 0, 0), stone, None);
    assert_eq!(outcome.chunk, None);
    assert_eq!(world.get_block(Point3::new(100, 0, 0), None), None);
    assert!(!world.is_solid(Point3::new(100, 0, 0)));
}

#[test]
fn floating_chunks_take_local_coordinates() {
    let mut world = World::default();
    world.ensure(grid(0, 0, 0));
    let floating = world.register(Chunk::new(ChunkPosition::Floating {
        id: 7,
        transform: None,
    }));
    assert_eq!(world.lookup(ChunkKey::Floating(7)), Some(floating));
    assert_eq!(world.floating_chunks(), vec![floating]);

    let glass = BlockType::GLASS.id();
    let outcome = world.set_block(Point3::new(3, 4, 5), glass, Some(7));
    assert_eq!(outcome.chunk, Some(floating));
    assert_eq!(outcome.previous, Some(AIR));
    assert_eq!(world.get_block(Point3::new(3, 4, 5), Some(7)), Some(glass));
    assert_eq!(world.get_block(Point3::new(3, 4, 5), None), Some(AIR));

    let outcome = world.set_block(Point3::new(3, 4, 5), AIR, Some(7));
    assert_eq!(outcome.previous, Some(glass));

    let dropped = world.set_block(Point3::new(-1, 0, 0), glass, Some(7));
    assert_eq!(dropped.chunk, None);
    assert_eq!(dropped.previous, None);
    assert_eq!(world.get_block(Point3::new(40, 0, 0), Some(7)), None);
    assert_eq!(world.get_block(Point3::new(0, 0, 0), Some(8)), None);

    // Floating chunks never take part in the grid's neighbor links.
    let floating_chunk = world.chunk(floating).unwrap();
    assert!(neighbor_offsets().all(|offset| floating_chunk.neighbor(offset).is_none()));

    assert!(world.delete_floating(7).is_some());
    assert_eq!(world.lookup(ChunkKey::Floating(7)), None);
}

#[test]
fn factory_builds_missing_chunks() {
    let mut world = World::new(Box::new(|position| {
        Chunk::filled(*position, BlockType::STONE.id())
    }));
    let handle = world.ensure(grid(3, 3, 3));
    assert_eq!(world.ensure(grid(3, 3, 3)), handle);
    assert_eq!(
        world.get_block(Point3::new(96, 96, 96), None),
        Some(BlockType::STONE.id())
    );
}

#[test]
fn chunk_snapshot_survives_deletion() {
    let mut world = cube_world();
    for handle in world.chunks() {
        let position = match world.chunk(handle).unwrap().position {
            ChunkPosition::Grid(position) => position,
            ChunkPosition::Floating { .. } => unreachable!(),
        };
        world.delete(position);
    }
    assert!(world.is_empty());
}
