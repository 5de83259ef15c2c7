use crate::scene::material::ObjectMaterial;
use crate::scene::shapes::MeshPart;
use nalgebra::{Matrix4, Vector2, Vector4};

/// Uniform values the shader sees. They persist between draws until a
/// setter changes them.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderUniforms {
    pub model: Matrix4<f32>,
    pub object_color: Vector4<f32>,
    pub use_texture: bool,
    /// Registry slot to sample; `None` when the last tag was unknown.
    pub texture_slot: Option<usize>,
    pub uv_scale: Vector2<f32>,
    pub material: ObjectMaterial,
    /// SRC_ALPHA / ONE_MINUS_SRC_ALPHA blending.
    pub blend: bool,
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self {
            model: Matrix4::identity(),
            object_color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            use_texture: false,
            texture_slot: None,
            uv_scale: Vector2::new(1.0, 1.0),
            material: ObjectMaterial::default(),
            blend: false,
        }
    }
}

/// One recorded draw: what to render and the uniforms at the time.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub part: MeshPart,
    pub uniforms: ShaderUniforms,
}

impl DrawCall {
    /// True when the fragment should sample a texture.
    pub fn samples_texture(&self) -> bool {
        self.uniforms.use_texture && self.uniforms.texture_slot.is_some()
    }
}
