use crate::core::geometry::Vertex;
use nalgebra::{Point3, Vector2, Vector3};
use std::ops::Range;

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Three indices per triangle, counter-clockwise seen from outside.
    pub indices: Vec<u32>,
}

/// A mesh together with the subset of its index buffer to draw.
#[derive(Debug, Clone, Copy)]
pub struct MeshSlice<'a> {
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn as_slice(&self) -> MeshSlice<'_> {
        MeshSlice {
            vertices: &self.vertices,
            indices: &self.indices,
        }
    }

    /// A view over `range` of the index buffer, `None` if out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Option<MeshSlice<'_>> {
        self.indices.get(range).map(|indices| MeshSlice {
            vertices: &self.vertices,
            indices,
        })
    }

    /// Axis-aligned bounds of the referenced vertices.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), v| {
            (lo.inf(&v.position), hi.sup(&v.position))
        }))
    }

    pub(crate) fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> u32 {
        self.vertices.push(Vertex::new(position, normal, uv));
        (self.vertices.len() - 1) as u32
    }

    /// Appends a flat quad spanning `center ± half_u ± half_v`. The face
    /// normal is `half_u × half_v`.
    pub(crate) fn push_quad(&mut self, center: Point3<f32>, half_u: Vector3<f32>, half_v: Vector3<f32>) {
        let normal = half_u.cross(&half_v).normalize();
        let base = self.push_vertex(center - half_u - half_v, normal, Vector2::new(0.0, 0.0));
        self.push_vertex(center + half_u - half_v, normal, Vector2::new(1.0, 0.0));
        self.push_vertex(center + half_u + half_v, normal, Vector2::new(1.0, 1.0));
        self.push_vertex(center - half_u + half_v, normal, Vector2::new(0.0, 1.0));
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    /// Appends a flat triangle with its geometric normal.
    pub(crate) fn push_triangle(&mut self, corners: [Point3<f32>; 3], uvs: [Vector2<f32>; 3]) {
        let normal = (corners[1] - corners[0])
            .cross(&(corners[2] - corners[0]))
            .normalize();
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.push_vertex(corner, normal, uv);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_normal_follows_axes() {
        let mut mesh = Mesh::default();
        mesh.push_quad(Point3::origin(), Vector3::x() * 0.5, Vector3::y() * 0.5);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices[0].normal, Vector3::z());
    }

    #[test]
    fn test_slice_bounds_checked() {
        let mut mesh = Mesh::default();
        mesh.push_quad(Point3::origin(), Vector3::x(), Vector3::z());
        assert_eq!(mesh.slice(0..3).unwrap().indices.len(), 3);
        assert!(mesh.slice(3..12).is_none());
    }

    #[test]
    fn test_bounds() {
        let mut mesh = Mesh::default();
        assert!(mesh.bounds().is_none());
        mesh.push_quad(Point3::new(1.0, 0.0, 0.0), Vector3::x(), Vector3::y());
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(hi, Point3::new(2.0, 1.0, 0.0));
    }
}
