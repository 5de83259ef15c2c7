use crate::io::config::Config;
use crate::scene::camera::Camera;
use crate::scene::context::RenderContext;
use crate::scene::manager::SceneManager;
use log::info;
use nalgebra::{Point3, Vector3};

/// Camera described by the `[camera]` section.
pub fn build_camera(config: &Config) -> Camera {
    let cam_pos = Point3::from(config.camera.position);
    let cam_target = Point3::from(config.camera.target);
    let cam_up = Vector3::from(config.camera.up);
    let aspect_ratio = config.aspect_ratio();

    if config.camera.projection == "orthographic" {
        Camera::new_orthographic(
            cam_pos,
            cam_target,
            cam_up,
            config.camera.ortho_height,
            aspect_ratio,
            config.camera.near,
            config.camera.far,
        )
    } else {
        Camera::new_perspective(
            cam_pos,
            cam_target,
            cam_up,
            config.camera.fov.to_radians(),
            aspect_ratio,
            config.camera.near,
            config.camera.far,
        )
    }
}

/// Loads textures, materials, lights and meshes, and mounts the spotlight
/// on the camera. Missing texture files are logged, not fatal.
pub fn init_scene_resources(config: &Config) -> RenderContext {
    let camera = build_camera(config);

    let mut scene = SceneManager::new(config.scene.seed);
    scene.prepare_scene(&config.scene.texture_dir, config.scene.time);
    scene.attach_spotlight(&camera);
    scene.lights_mut().enabled = config.render.use_lighting;

    info!(
        "Scene initialized: {} textures, {} materials, {} lights.",
        scene.textures().len(),
        scene.materials().len(),
        scene.lights().active_point_lights().count()
            + usize::from(scene.lights().directional.is_some())
            + usize::from(scene.lights().spot.is_some())
    );

    RenderContext { camera, scene }
}
