use cgmath::{Deg, Matrix4, Point3, Vector3};
use voxel_engine_core::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{Chunk, ChunkPosition},
    raycast::{raycast, DEFAULT_MAX_DISTANCE},
    world::World,
};

const EPSILON: f32 = 1e-4;

fn forward() -> Vector3<f32> {
    Vector3::new(0.0, 0.0, 1.0)
}

fn single_block_world() -> World {
    let mut world = World::default();
    world.ensure(ChunkPosition::Grid(Point3::new(0, 0, 0)));
    world.set_block(Point3::new(0, 0, 0), BlockType::STONE.id(), None);
    world
}

fn floating_block(world: &mut World, id: u32, transform: Matrix4<f32>) {
    let mut chunk = Chunk::new(ChunkPosition::Floating {
        id,
        transform: Some(transform),
    });
    chunk.set(Point3::new(0, 0, 0), BlockType::WHITE.id());
    world.register(chunk);
}

#[test]
fn ray_hits_the_near_face_of_a_grid_block() {
    let world = single_block_world();
    let hit = world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .expect("block in front of the ray");
    assert_eq!(hit.block, Point3::new(0, 0, 0));
    assert!(hit.position.z.abs() < EPSILON, "{:?}", hit.position);
    assert_eq!(hit.normal, Vector3::new(0, 0, -1));
    assert!((hit.distance - 5.0).abs() < EPSILON);
    assert_eq!(hit.floating_id, None);
    assert_eq!(hit.transform, None);
}

#[test]
fn empty_world_has_no_hit() {
    let world = World::default();
    assert!(world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .is_none());

    let mut loaded = World::default();
    loaded.ensure(ChunkPosition::Grid(Point3::new(0, 0, 0)));
    assert!(loaded
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .is_none());
}

#[test]
fn max_distance_limits_reach() {
    let world = single_block_world();
    assert!(world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), 3.0)
        .is_none());
}

#[test]
fn ray_against_negative_coordinates() {
    let mut world = World::default();
    world.ensure(ChunkPosition::Grid(Point3::new(-1, 0, 0)));
    world.set_block(Point3::new(-3, 2, 7), BlockType::GLASS.id(), None);
    let hit = world
        .raycast(
            Point3::new(5.5, 2.5, 7.5),
            Vector3::new(-1.0, 0.0, 0.0),
            DEFAULT_MAX_DISTANCE,
        )
        .unwrap();
    assert_eq!(hit.block, Point3::new(-3, 2, 7));
    assert_eq!(hit.normal, Vector3::new(1, 0, 0));
    assert!((hit.distance - 7.5).abs() < EPSILON);
}

#[test]
fn floating_chunk_is_traced_in_its_local_space() {
    let mut world = World::default();
    floating_block(&mut world, 3, Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)));

    let hit = world
        .raycast(Point3::new(10.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .unwrap();
    assert_eq!(hit.floating_id, Some(3));
    assert_eq!(hit.block, Point3::new(0, 0, 0));
    assert!((hit.position.x - 10.5).abs() < EPSILON);
    assert!(hit.position.z.abs() < EPSILON);
    assert!((hit.distance - 5.0).abs() < EPSILON);
    assert!(hit.transform.is_some());
}

#[test]
fn rotated_floating_chunk_reports_world_position() {
    let mut world = World::default();
    floating_block(&mut world, 4, Matrix4::from_angle_y(Deg(90.0)));

    let hit = world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .unwrap();
    assert_eq!(hit.floating_id, Some(4));
    assert_eq!(hit.block, Point3::new(0, 0, 0));
    assert!((hit.position.z + 1.0).abs() < EPSILON, "{:?}", hit.position);
    assert!((hit.distance - 4.0).abs() < EPSILON);
}

#[test]
fn closest_hit_wins() {
    let mut world = single_block_world();
    floating_block(&mut world, 1, Matrix4::from_translation(Vector3::new(0.0, 0.0, -3.0)));
    let hit = world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .unwrap();
    assert_eq!(hit.floating_id, Some(1));
    assert!((hit.distance - 2.0).abs() < EPSILON);

    let mut world = single_block_world();
    floating_block(&mut world, 1, Matrix4::from_translation(Vector3::new(0.0, 0.0, 3.0)));
    let hit = world
        .raycast(Point3::new(0.5, 0.5, -5.0), forward(), DEFAULT_MAX_DISTANCE)
        .unwrap();
    assert_eq!(hit.floating_id, None);
    assert_eq!(hit.block, Point3::new(0, 0, 0));
}

#[test]
fn traversal_is_lazy_and_ordered() {
    let mut tested = Vec::new();
    let hits: Vec<_> = raycast(
        |cell: Point3<i32>| {
            tested.push(cell);
            cell.z % 2 == 0
        },
        Point3::new(0.5, 0.5, 0.5),
        forward(),
        6.0,
    )
    .take(2)
    .collect();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].block, Point3::new(0, 0, 0));
    assert_eq!(hits[1].block, Point3::new(0, 0, 2));
    assert_eq!(tested.len(), 3);
}
