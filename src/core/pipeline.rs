use crate::core::geometry::Vertex;
use nalgebra::Vector4;
use std::ops::{Add, Mul};

/// Per-vertex data that can be blended linearly across a triangle.
///
/// Send + Sync because fragments of one triangle are shaded on several
/// rayon workers at once.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

impl<T> Interpolatable for T where
    T: Copy + Clone + Add<Output = T> + Mul<f32, Output = T> + Send + Sync
{
}

/// The programmable stages of the pipeline.
pub trait Shader: Send + Sync {
    /// Vertex outputs interpolated for each fragment.
    type Varying: Interpolatable;

    /// Transforms `vertex` to homogeneous clip space and emits its varying.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Returns the fragment color as linear RGBA. Alpha is only honoured when
    /// the draw has blending enabled.
    fn fragment(&self, varying: Self::Varying) -> Vector4<f32>;
}
