use crate::core::rasterizer::CullMode;
use crate::io::config::Config;
use crate::io::image::save_buffer_to_image;
use crate::pipeline::passes::{post_process_to_buffer, render_main_pass};
use crate::pipeline::renderer::Renderer;
use crate::scene::context::RenderContext;
use crate::scene::loader::init_scene_resources;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn build_renderer(config: &Config) -> Renderer {
    let mut renderer = Renderer::new(
        config.render.width,
        config.render.height,
        config.render.samples,
    );
    renderer
        .rasterizer
        .set_cull_mode(CullMode::from_name(&config.render.cull_mode));
    renderer.rasterizer.wireframe = config.render.wireframe;
    renderer
}

/// Renders the recorded frame and writes it to `path`.
fn render_to_file(
    config: &Config,
    context: &RenderContext,
    renderer: &mut Renderer,
    buffer: &mut [u32],
    path: &Path,
) -> Result<(), String> {
    let start_time = Instant::now();
    let drawn = render_main_pass(config, context, renderer);
    debug!("{} draws rendered in {:.2?}", drawn, start_time.elapsed());

    post_process_to_buffer(&renderer.framebuffer, buffer, config);
    save_buffer_to_image(buffer, config.render.width, config.render.height, path)
}

/// Renders a single still at `config.scene.time`.
pub fn run_cli(config: &Config) -> Result<(), String> {
    info!("Starting CLI mode...");
    let mut context = init_scene_resources(config);
    let mut renderer = build_renderer(config);
    let mut buffer = vec![0u32; config.render.width * config.render.height];

    let start_time = Instant::now();
    context.scene.render_scene(config.scene.time);
    render_to_file(
        config,
        &context,
        &mut renderer,
        &mut buffer,
        Path::new(&config.render.output),
    )?;
    info!(
        "Saved '{}' in {:.2?}",
        config.render.output,
        start_time.elapsed()
    );
    Ok(())
}

/// Directory for a frame sequence: the configured one, or a fresh
/// `frames_<unix millis>` directory.
pub fn sequence_dir(config: &Config) -> PathBuf {
    match &config.animation.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(format!(
            "frames_{}",
            chrono::Utc::now().timestamp_millis()
        )),
    }
}

/// Renders `animation.frames` frames starting at `scene.time`, advancing the
/// flame flicker each frame. Returns the directory the frames went to.
pub fn run_sequence(config: &Config) -> Result<PathBuf, String> {
    let frames = config.animation.frames.max(1);
    let fps = if config.animation.fps > 0.0 {
        config.animation.fps
    } else {
        24.0
    };
    let dir = sequence_dir(config);
    fs::create_dir_all(&dir)
        .map_err(|e| format!("Failed to create frame directory '{}': {}", dir.display(), e))?;

    info!(
        "Rendering {} frames at {} fps into '{}'...",
        frames,
        fps,
        dir.display()
    );

    let mut context = init_scene_resources(config);
    let mut renderer = build_renderer(config);
    let mut buffer = vec![0u32; config.render.width * config.render.height];
    let start_time = Instant::now();

    for frame in 0..frames {
        let time = config.scene.time + frame as f32 / fps;
        if frame == 0 {
            context.scene.render_scene(time);
        } else {
            context.record_frame(time);
        }

        let path = dir.join(format!("frame_{:04}.png", frame));
        render_to_file(config, &context, &mut renderer, &mut buffer, &path)?;
        debug!("Frame {}/{} written to '{}'", frame + 1, frames, path.display());
    }

    info!(
        "Rendered {} frames in {:.2?}",
        frames,
        start_time.elapsed()
    );
    Ok(dir)
}
