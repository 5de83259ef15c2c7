use crate::core::framebuffer::FrameBuffer;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use crate::scene::mesh::MeshSlice;
use log::warn;
use nalgebra::Vector3;

/// Runs meshes through the vertex stage and rasterizer into its framebuffer.
pub struct Renderer {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    /// `sample_count`: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
        }
    }

    pub fn clear(&mut self, color: Vector3<f32>) {
        self.framebuffer.clear(color);
    }

    pub fn clear_gradient(&mut self, top: Vector3<f32>, bottom: Vector3<f32>) {
        self.framebuffer.clear_gradient(top, bottom);
    }

    /// Draws the triangles of `mesh` in index order.
    pub fn draw_mesh<S: Shader>(&mut self, mesh: MeshSlice<'_>, shader: &S, blend: bool) {
        for chunk in mesh.indices.chunks_exact(3) {
            let fetched = [chunk[0], chunk[1], chunk[2]].map(|i| mesh.vertices.get(i as usize));
            let [Some(v0), Some(v1), Some(v2)] = fetched else {
                warn!("Skipping triangle with out-of-range index {:?}", chunk);
                continue;
            };

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            self.rasterizer.rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
                blend,
            );
        }
    }
}
