//! Procedural unit shapes the scene is assembled from.
//!
//! Conventions, before any model transform:
//! - box, prism and pyramid: 1 × 1 × 1, centered on the origin;
//! - plane: spans ±1 on X and Z at y = 0, facing +Y;
//! - cylinder, cone and tapered cylinder: base disk of radius 1 at y = 0,
//!   top at y = 1 (tapered top radius 0.5, cone apex);
//! - sphere: radius 1 at the origin; the half sphere is its y ≥ 0 dome;
//! - torus: in the XY plane, main radius 1, tube radius 0.2.

use crate::scene::mesh::{Mesh, MeshSlice};
use log::debug;
use nalgebra::{Point3, Vector2, Vector3};
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};
use std::ops::Range;

const ROUND_SEGMENTS: u32 = 36;
const SPHERE_LONGITUDE: u32 = 36;
/// Must be even so the half sphere ends exactly at the equator.
const SPHERE_LATITUDE: u32 = 18;
const TORUS_MAIN_SEGMENTS: u32 = 48;
const TORUS_TUBE_SEGMENTS: u32 = 16;
pub const TORUS_MAIN_RADIUS: f32 = 1.0;
pub const TORUS_TUBE_RADIUS: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Box,
    Plane,
    Cylinder,
    Cone,
    Prism,
    Pyramid4,
    Sphere,
    TaperedCylinder,
    Torus,
}

impl Shape {
    pub const ALL: [Shape; 9] = [
        Shape::Box,
        Shape::Plane,
        Shape::Cylinder,
        Shape::Cone,
        Shape::Prism,
        Shape::Pyramid4,
        Shape::Sphere,
        Shape::TaperedCylinder,
        Shape::Torus,
    ];

    pub fn build(self) -> Mesh {
        match self {
            Shape::Box => build_box(),
            Shape::Plane => build_plane(),
            Shape::Cylinder => build_lathe(&[(1.0, 0.0), (1.0, 1.0)], true, true),
            Shape::Cone => build_lathe(&[(1.0, 0.0), (0.0, 1.0)], true, false),
            Shape::Prism => build_prism(),
            Shape::Pyramid4 => build_pyramid4(),
            Shape::Sphere => build_sphere(),
            Shape::TaperedCylinder => build_lathe(&[(1.0, 0.0), (0.5, 1.0)], true, true),
            Shape::Torus => build_torus(),
        }
    }
}

/// Faces of the box, in index-buffer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxSide {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl BoxSide {
    pub const ALL: [BoxSide; 6] = [
        BoxSide::Front,
        BoxSide::Back,
        BoxSide::Left,
        BoxSide::Right,
        BoxSide::Top,
        BoxSide::Bottom,
    ];

    fn index_range(self) -> Range<usize> {
        let start = self as usize * 6;
        start..start + 6
    }
}

/// What a single draw call renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshPart {
    Whole(Shape),
    BoxSide(BoxSide),
    /// Upper half of the sphere mesh.
    HalfSphere,
}

impl MeshPart {
    pub fn shape(self) -> Shape {
        match self {
            MeshPart::Whole(shape) => shape,
            MeshPart::BoxSide(_) => Shape::Box,
            MeshPart::HalfSphere => Shape::Sphere,
        }
    }
}

/// Shapes loaded once and drawn any number of times.
#[derive(Debug, Default)]
pub struct ShapeMeshes {
    meshes: HashMap<Shape, Mesh>,
}

impl ShapeMeshes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `shape` unless it is already loaded.
    pub fn load(&mut self, shape: Shape) {
        self.meshes.entry(shape).or_insert_with(|| {
            let mesh = shape.build();
            debug!(
                "Loaded {:?} mesh: {} vertices, {} triangles",
                shape,
                mesh.vertices.len(),
                mesh.triangle_count()
            );
            mesh
        });
    }

    pub fn is_loaded(&self, shape: Shape) -> bool {
        self.meshes.contains_key(&shape)
    }

    pub fn mesh(&self, shape: Shape) -> Option<&Mesh> {
        self.meshes.get(&shape)
    }

    /// Geometry for `part`, or `None` when its shape was never loaded.
    pub fn slice(&self, part: MeshPart) -> Option<MeshSlice<'_>> {
        let mesh = self.meshes.get(&part.shape())?;
        match part {
            MeshPart::Whole(_) => Some(mesh.as_slice()),
            MeshPart::BoxSide(side) => mesh.slice(side.index_range()),
            MeshPart::HalfSphere => {
                let dome = (SPHERE_LATITUDE / 2 * SPHERE_LONGITUDE * 6) as usize;
                mesh.slice(0..dome)
            }
        }
    }
}

fn build_box() -> Mesh {
    let mut mesh = Mesh::default();
    let h = 0.5;
    // (outward axis, u axis, v axis) with u × v = outward; order matches BoxSide.
    let faces = [
        (Vector3::z(), Vector3::x(), Vector3::y()),
        (-Vector3::z(), -Vector3::x(), Vector3::y()),
        (-Vector3::x(), Vector3::z(), Vector3::y()),
        (Vector3::x(), -Vector3::z(), Vector3::y()),
        (Vector3::y(), Vector3::x(), -Vector3::z()),
        (-Vector3::y(), Vector3::x(), Vector3::z()),
    ];
    for (normal, u, v) in faces {
        mesh.push_quad(Point3::from(normal * h), u * h, v * h);
    }
    mesh
}

fn build_plane() -> Mesh {
    let mut mesh = Mesh::default();
    mesh.push_quad(Point3::origin(), Vector3::x(), -Vector3::z());
    mesh
}

/// Surface of revolution around +Y. `profile` lists (radius, height) pairs
/// from bottom to top; caps close the first and last rings.
fn build_lathe(profile: &[(f32, f32)], bottom_cap: bool, top_cap: bool) -> Mesh {
    let mut mesh = Mesh::default();
    let segments = ROUND_SEGMENTS;

    // Angle runs from +X towards -Z so that u × v faces outward.
    let ring = |i: u32| {
        let angle = i as f32 / segments as f32 * TAU;
        (angle.cos(), -angle.sin())
    };

    for pair in profile.windows(2) {
        let (r0, y0) = pair[0];
        let (r1, y1) = pair[1];
        // Outward normal of the slanted edge in the (radial, y) plane.
        let slope = Vector2::new(y1 - y0, r0 - r1).normalize();

        let base = mesh.vertices.len() as u32;
        for i in 0..=segments {
            let (c, s) = ring(i);
            let u = i as f32 / segments as f32;
            let normal = Vector3::new(c * slope.x, slope.y, s * slope.x);
            mesh.push_vertex(Point3::new(c * r0, y0, s * r0), normal, Vector2::new(u, 0.0));
            mesh.push_vertex(Point3::new(c * r1, y1, s * r1), normal, Vector2::new(u, 1.0));
        }
        for i in 0..segments {
            let b0 = base + i * 2;
            let t0 = b0 + 1;
            let b1 = b0 + 2;
            let t1 = b0 + 3;
            mesh.indices.extend_from_slice(&[b0, b1, t1, t1, t0, b0]);
        }
    }

    let mut cap = |radius: f32, y: f32, up: bool| {
        let normal = if up { Vector3::y() } else { -Vector3::y() };
        let center = mesh.push_vertex(Point3::new(0.0, y, 0.0), normal, Vector2::new(0.5, 0.5));
        for i in 0..=segments {
            let (c, s) = ring(i);
            mesh.push_vertex(
                Point3::new(c * radius, y, s * radius),
                normal,
                Vector2::new(0.5 + 0.5 * c, 0.5 + 0.5 * s),
            );
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = a + 1;
            if up {
                mesh.indices.extend_from_slice(&[center, a, b]);
            } else {
                mesh.indices.extend_from_slice(&[center, b, a]);
            }
        }
    };

    if let (true, Some(&(r, y))) = (bottom_cap, profile.first()) {
        cap(r, y, false);
    }
    if let (true, Some(&(r, y))) = (top_cap, profile.last()) {
        cap(r, y, true);
    }

    mesh
}

fn build_sphere() -> Mesh {
    let mut mesh = Mesh::default();
    let (long_segs, lat_segs) = (SPHERE_LONGITUDE, SPHERE_LATITUDE);

    // Row 0 is the north pole, so the first half of the index buffer is the dome.
    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for long in 0..=long_segs {
            let phi = long as f32 * TAU / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let n = Vector3::new(sin_theta * cos_phi, cos_theta, -sin_theta * sin_phi);
            mesh.push_vertex(
                Point3::from(n),
                n,
                Vector2::new(long as f32 / long_segs as f32, 1.0 - lat as f32 / lat_segs as f32),
            );
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;
            mesh.indices
                .extend_from_slice(&[first, second, first + 1, second, second + 1, first + 1]);
        }
    }

    mesh
}

fn build_torus() -> Mesh {
    let mut mesh = Mesh::default();
    let (main, tube) = (TORUS_MAIN_SEGMENTS, TORUS_TUBE_SEGMENTS);

    for i in 0..=main {
        let alpha = i as f32 / main as f32 * TAU;
        let (sin_a, cos_a) = alpha.sin_cos();
        for j in 0..=tube {
            let beta = j as f32 / tube as f32 * TAU;
            let (sin_b, cos_b) = beta.sin_cos();
            let ring = TORUS_MAIN_RADIUS + TORUS_TUBE_RADIUS * cos_b;
            mesh.push_vertex(
                Point3::new(ring * cos_a, ring * sin_a, TORUS_TUBE_RADIUS * sin_b),
                Vector3::new(cos_b * cos_a, cos_b * sin_a, sin_b),
                Vector2::new(i as f32 / main as f32, j as f32 / tube as f32),
            );
        }
    }

    let stride = tube + 1;
    for i in 0..main {
        for j in 0..tube {
            let a = i * stride + j;
            let b = a + stride;
            mesh.indices
                .extend_from_slice(&[a, b, b + 1, b + 1, a + 1, a]);
        }
    }

    mesh
}

fn build_pyramid4() -> Mesh {
    let mut mesh = Mesh::default();
    let apex = Point3::new(0.0, 0.5, 0.0);
    let uvs = [
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.5, 1.0),
    ];

    // Front face, then the same face turned about +Y.
    let corners = [(-0.5, 0.5), (0.5, 0.5), (0.5, -0.5), (-0.5, -0.5)];
    for k in 0..4 {
        let (x0, z0) = corners[k];
        let (x1, z1) = corners[(k + 1) % 4];
        mesh.push_triangle(
            [Point3::new(x0, -0.5, z0), Point3::new(x1, -0.5, z1), apex],
            uvs,
        );
    }

    mesh.push_quad(Point3::new(0.0, -0.5, 0.0), Vector3::x() * 0.5, Vector3::z() * 0.5);
    mesh
}

fn build_prism() -> Mesh {
    let mut mesh = Mesh::default();
    let left = Point3::new(-0.5, -0.5, 0.0);
    let right = Point3::new(0.5, -0.5, 0.0);
    let top = Point3::new(0.0, 0.5, 0.0);
    let depth = Vector3::new(0.0, 0.0, 0.5);
    let uvs = [
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.5, 1.0),
    ];

    mesh.push_triangle([left + depth, right + depth, top + depth], uvs);
    mesh.push_triangle([right - depth, left - depth, top - depth], uvs);

    // Bottom, right slope, left slope; edges walk the front face counter-clockwise.
    for (a, b) in [(left, right), (right, top), (top, left)] {
        let center = nalgebra::center(&a, &b);
        mesh.push_quad(center, (b - a) * 0.5, depth);
    }

    mesh
}
