use crate::core::color::{aces_tone_mapping, linear_to_srgb, pack_argb};
use crate::core::framebuffer::FrameBuffer;
use crate::io::config::Config;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::context::RenderContext;
use log::{debug, warn};
use nalgebra::Vector3;
use rayon::prelude::*;

/// Clears to the configured background and replays the recorded draw calls
/// in order. Returns how many draws reached the rasterizer.
pub fn render_main_pass(config: &Config, context: &RenderContext, renderer: &mut Renderer) -> usize {
    match (
        config.render.background_gradient_top,
        config.render.background_gradient_bottom,
    ) {
        (Some(top), Some(bottom)) => {
            renderer.clear_gradient(Vector3::from(top), Vector3::from(bottom))
        }
        _ => renderer.clear(Vector3::from(config.render.background_color)),
    }

    let scene = &context.scene;
    let mut drawn = 0;
    for draw in scene.draws() {
        let Some(mesh) = scene.meshes().slice(draw.part) else {
            warn!("Mesh for {:?} is not loaded, skipping draw", draw.part);
            continue;
        };

        let shader = PhongShader::new(draw, scene.lights(), &context.camera, scene.textures());
        renderer.draw_mesh(mesh, &shader, draw.uniforms.blend);
        drawn += 1;
    }

    debug!("Main pass drew {}/{} calls", drawn, scene.draws().len());
    drawn
}

/// Exposure -> optional ACES -> optional gamma -> packed 0xAARRGGBB buffer.
pub fn post_process_to_buffer(framebuffer: &FrameBuffer, buffer: &mut [u32], config: &Config) {
    buffer
        .par_chunks_mut(framebuffer.width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = match framebuffer.get_pixel(x, y) {
                    Some(color) => {
                        let exposed = color * config.render.exposure;
                        let mapped = if config.render.tone_mapping {
                            aces_tone_mapping(exposed)
                        } else {
                            exposed
                        };
                        let encoded = if config.render.gamma_correction {
                            linear_to_srgb(mapped)
                        } else {
                            mapped
                        };
                        pack_argb(encoded)
                    }
                    None => 0,
                };
            }
        });
}
