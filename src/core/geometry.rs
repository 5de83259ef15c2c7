use nalgebra::{Point3, Vector2, Vector3};

/// A single mesh vertex in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    /// Texture coordinates, (0, 0) at the bottom-left of the image.
    pub texcoord: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }

    /// Convenience constructor from plain arrays.
    pub fn from_arrays(position: [f32; 3], normal: [f32; 3], texcoord: [f32; 2]) -> Self {
        Self::new(
            Point3::from(position),
            Vector3::from(normal),
            Vector2::from(texcoord),
        )
    }
}
