use crate::scene::camera::Camera;
use crate::scene::manager::SceneManager;

/// Everything a frame needs: the viewpoint and the prepared scene.
pub struct RenderContext {
    pub camera: Camera,
    pub scene: SceneManager,
}

impl RenderContext {
    /// Advances the flame to `time` and records the frame's draw calls.
    pub fn record_frame(&mut self, time: f32) -> usize {
        self.scene.update_flicker(time);
        self.scene.render_scene(time).len()
    }
}
