//! # Raycast Module
//!
//! Voxel traversal along a ray using 3D-DDA ("A Fast Voxel Traversal
//! Algorithm for Ray Tracing", Amanatides & Woo). The traversal visits every
//! cell the ray passes through, in order, and tests each against a
//! caller-supplied solidity predicate, so it works on the global chunk grid
//! and on a single floating chunk's local grid alike.

use std::iter::FusedIterator;

use cgmath::{Point3, Vector3};

/// Default reach of a raycast, in blocks.
pub const DEFAULT_MAX_DISTANCE: f32 = 64.0;

/// A solid cell hit by a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastHit {
    /// Block position in realm coordinates.
    pub block: Point3<i32>,
    /// Intersection point on the block face in realm coordinates.
    pub position: Point3<f32>,
    /// The face of the block that was hit. `(0, 0, 0)` if the ray started
    /// inside the block.
    pub normal: Vector3<i32>,
    /// Distance travelled along the ray to `position`.
    pub distance: f32,
}

/// Lazy traversal of the cells along a ray. Yields a hit for every solid cell
/// until `max_distance` is exceeded. Callers usually only take the first.
pub struct Raycast<F> {
    is_solid: F,
    origin: [f32; 3],
    direction: [f32; 3],
    cell: [i32; 3],
    step: [i32; 3],
    t_delta: [f32; 3],
    t_max: [f32; 3],
    t: f32,
    max_distance: f32,
    stepped_axis: Option<usize>,
}

/// Starts a raycast.
///
/// # Arguments
/// * `is_solid` - Solidity predicate over cells of the realm being traversed
/// * `origin` - Starting point in realm coordinates
/// * `direction` - Unit direction vector; must not be zero
/// * `max_distance` - Traversal stops once the ray is longer than this
pub fn raycast<F>(
    is_solid: F,
    origin: Point3<f32>,
    direction: Vector3<f32>,
    max_distance: f32,
) -> Raycast<F>
where
    F: FnMut(Point3<i32>) -> bool,
{
    let origin: [f32; 3] = origin.into();
    let direction: [f32; 3] = direction.into();
    let cell = origin.map(|p| p.floor() as i32);
    let step = direction.map(|d| {
        if d > 0.0 {
            1
        } else if d < 0.0 {
            -1
        } else {
            0
        }
    });
    // An axis the ray runs parallel to never crosses a boundary.
    let t_delta = direction.map(|d| if d == 0.0 { f32::INFINITY } else { (1.0 / d).abs() });
    let mut t_max = [f32::INFINITY; 3];
    for axis in 0..3 {
        if t_delta[axis].is_finite() {
            let boundary = if step[axis] > 0 {
                cell[axis] as f32 + 1.0 - origin[axis]
            } else {
                origin[axis] - cell[axis] as f32
            };
            t_max[axis] = t_delta[axis] * boundary;
        }
    }

    Raycast {
        is_solid,
        origin,
        direction,
        cell,
        step,
        t_delta,
        t_max,
        t: 0.0,
        max_distance,
        stepped_axis: None,
    }
}

impl<F> Raycast<F> {
    fn advance(&mut self) {
        let mut axis = 0;
        for candidate in 1..3 {
            if self.t_max[candidate] < self.t_max[axis] {
                axis = candidate;
            }
        }
        self.cell[axis] += self.step[axis];
        self.t = self.t_max[axis];
        self.t_max[axis] += self.t_delta[axis];
        self.stepped_axis = Some(axis);
    }

    fn current_hit(&self) -> RaycastHit {
        let mut normal = [0; 3];
        if let Some(axis) = self.stepped_axis {
            normal[axis] = -self.step[axis];
        }
        let t = self.t;
        RaycastHit {
            block: self.cell.into(),
            position: Point3::new(
                self.origin[0] + t * self.direction[0],
                self.origin[1] + t * self.direction[1],
                self.origin[2] + t * self.direction[2],
            ),
            normal: normal.into(),
            distance: t,
        }
    }
}

impl<F> Iterator for Raycast<F>
where
    F: FnMut(Point3<i32>) -> bool,
{
    type Item = RaycastHit;

    fn next(&mut self) -> Option<RaycastHit> {
        while self.t <= self.max_distance {
            let hit = (self.is_solid)(self.cell.into()).then(|| self.current_hit());
            self.advance();
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

impl<F> FusedIterator for Raycast<F> where F: FnMut(Point3<i32>) -> bool {}
