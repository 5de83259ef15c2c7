use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Top-level render configuration, read from TOML. Every section and field
/// has a default, so an empty file reproduces the stock scene.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    // --- Output & Quality ---
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_samples")]
    pub samples: usize,

    // --- Background ---
    #[serde(default = "default_background")]
    pub background_color: [f32; 3],
    pub background_gradient_top: Option<[f32; 3]>,
    pub background_gradient_bottom: Option<[f32; 3]>,

    // --- Post Processing ---
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(default)]
    pub tone_mapping: bool,
    #[serde(default)]
    pub gamma_correction: bool,

    // --- Pipeline & Debug ---
    #[serde(default = "default_cull_mode")]
    pub cull_mode: String, // "back", "front", "none"
    #[serde(default)]
    pub wireframe: bool,
    #[serde(default = "default_true")]
    pub use_lighting: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            output: default_output(),
            samples: default_samples(),
            background_color: default_background(),
            background_gradient_top: None,
            background_gradient_bottom: None,
            exposure: default_exposure(),
            tone_mapping: false,
            gamma_correction: false,
            cull_mode: default_cull_mode(),
            wireframe: false,
            use_lighting: true,
        }
    }
}

fn default_width() -> usize {
    1000
}
fn default_height() -> usize {
    800
}
fn default_output() -> String {
    "potion_scene.png".to_string()
}
fn default_samples() -> usize {
    2
}
fn default_background() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}
fn default_exposure() -> f32 {
    1.0
}
fn default_cull_mode() -> String {
    "none".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    #[serde(default = "default_camera_target")]
    pub target: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_projection")]
    pub projection: String,
    #[serde(default = "default_ortho_height")]
    pub ortho_height: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: default_camera_target(),
            up: default_up(),
            fov: default_fov(),
            projection: default_projection(),
            ortho_height: default_ortho_height(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 7.0, 18.0]
}
fn default_camera_target() -> [f32; 3] {
    [0.0, 4.0, -1.0]
}
fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}
fn default_fov() -> f32 {
    45.0
}
fn default_projection() -> String {
    "perspective".to_string()
}
fn default_ortho_height() -> f32 {
    14.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    100.0
}

#[derive(Debug, Deserialize)]
pub struct SceneConfig {
    /// Directory holding the scene's texture images.
    #[serde(default = "default_texture_dir")]
    pub texture_dir: String,
    /// Scene clock in seconds; drives the candle flicker.
    #[serde(default)]
    pub time: f32,
    /// Seed for the flame color jitter.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            texture_dir: default_texture_dir(),
            time: 0.0,
            seed: 0,
        }
    }
}

fn default_texture_dir() -> String {
    "textures".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_frames")]
    pub frames: usize,
    #[serde(default = "default_fps")]
    pub fps: f32,
    pub output_dir: Option<String>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frames: default_frames(),
            fps: default_fps(),
            output_dir: None,
        }
    }
}

fn default_frames() -> usize {
    1
}
fn default_fps() -> f32 {
    24.0
}

/// Commented configuration printed by `--print-example-config`.
pub const EXAMPLE_CONFIG: &str = r#"# potion-scene configuration

[render]
width = 1000
height = 800
samples = 2                     # SSAA factor per axis
output = "potion_scene.png"
background_color = [0.0, 0.0, 0.0]
# background_gradient_top = [0.05, 0.05, 0.12]
# background_gradient_bottom = [0.0, 0.0, 0.0]
exposure = 1.0
tone_mapping = false
gamma_correction = false
cull_mode = "none"              # "back", "front", "none"
wireframe = false
use_lighting = true

[camera]
position = [0.0, 7.0, 18.0]
target = [0.0, 4.0, -1.0]
up = [0.0, 1.0, 0.0]
fov = 45.0
projection = "perspective"      # or "orthographic"
ortho_height = 14.0
near = 0.1
far = 100.0

[scene]
texture_dir = "textures"
time = 0.0
seed = 0

[animation]
frames = 1
fps = 24.0
# output_dir = "frames"
"#;

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(content).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if self.render.width == 0 || self.render.height == 0 {
            return Err(format!(
                "Image size must be non-zero, got {}x{}",
                self.render.width, self.render.height
            ));
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.render.width as f32 / self.render.height.max(1) as f32
    }
}
