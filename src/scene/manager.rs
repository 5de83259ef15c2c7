use crate::core::math::transform::compose_model_matrix;
use crate::scene::camera::Camera;
use crate::scene::draw::{DrawCall, ShaderUniforms};
use crate::scene::light::{FLAME_LIGHT_SLOT, FlameFlicker, LightRig, flame_light, scene_lights};
use crate::scene::material::{MaterialLibrary, scene_materials};
use crate::scene::shapes::{MeshPart, Shape, ShapeMeshes};
use crate::scene::texture::TextureRegistry;
use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3, Vector4};
use std::path::Path;

/// Texture files of the scene and the tags props refer to them by.
pub const SCENE_TEXTURES: [(&str, &str); 9] = [
    ("fabric", "knit.jpg"),
    ("glass", "glass.jpg"),
    ("rubber", "rubber.jpg"),
    ("candle", "candle.jpg"),
    ("stainless", "stainless.jpg"),
    ("metal", "metal.jpg"),
    ("pages", "pages.jpg"),
    ("leather", "leather.png"),
    ("wood", "wood.jpg"),
];

/// Owns the scene's resources and records draw calls.
///
/// Setters behave like shader uniforms: a value stays in effect for every
/// following `draw` until it is set again.
#[derive(Debug)]
pub struct SceneManager {
    textures: TextureRegistry,
    materials: MaterialLibrary,
    lights: LightRig,
    meshes: ShapeMeshes,
    flicker: FlameFlicker,
    flame_color: Vector3<f32>,
    uniforms: ShaderUniforms,
    draws: Vec<DrawCall>,
}

impl SceneManager {
    pub fn new(seed: u64) -> Self {
        Self {
            textures: TextureRegistry::new(),
            materials: MaterialLibrary::new(),
            lights: LightRig::default(),
            meshes: ShapeMeshes::new(),
            flicker: FlameFlicker::new(seed),
            flame_color: Vector3::new(1.0, 0.3, 0.1),
            uniforms: ShaderUniforms::default(),
            draws: Vec::new(),
        }
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut LightRig {
        &mut self.lights
    }

    pub fn meshes(&self) -> &ShapeMeshes {
        &self.meshes
    }

    pub fn uniforms(&self) -> &ShaderUniforms {
        &self.uniforms
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Current color of the candle flame.
    pub fn flame_color(&self) -> Vector3<f32> {
        self.flame_color
    }

    // ---- uniforms ----

    /// Model matrix from scale, X/Y/Z rotations in degrees, then translation.
    pub fn set_transformations(
        &mut self,
        scale: Vector3<f32>,
        x_rotation_degrees: f32,
        y_rotation_degrees: f32,
        z_rotation_degrees: f32,
        position: Vector3<f32>,
    ) {
        self.uniforms.model = compose_model_matrix(
            &scale,
            x_rotation_degrees,
            y_rotation_degrees,
            z_rotation_degrees,
            &position,
        );
    }

    /// Sets the object color and turns texturing off.
    pub fn set_shader_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.uniforms.use_texture = false;
        self.uniforms.object_color = Vector4::new(red, green, blue, alpha);
    }

    /// Turns texturing on and selects the slot registered under `tag`.
    pub fn set_shader_texture(&mut self, tag: &str) {
        self.uniforms.use_texture = true;
        self.uniforms.texture_slot = self.textures.find_texture_slot(tag);
        if self.uniforms.texture_slot.is_none() {
            debug!("No texture tagged '{}', drawing with the object color", tag);
        }
    }

    pub fn set_texture_uv_scale(&mut self, u: f32, v: f32) {
        self.uniforms.uv_scale = Vector2::new(u, v);
    }

    /// Copies the material tagged `tag`; an unknown tag keeps the current one.
    pub fn set_shader_material(&mut self, tag: &str) {
        match self.materials.find_material(tag) {
            Some(material) => self.uniforms.material = material.clone(),
            None => warn!("Material '{}' is not defined", tag),
        }
    }

    pub fn set_blending(&mut self, enabled: bool) {
        self.uniforms.blend = enabled;
    }

    /// Records `part` with the current uniforms.
    pub fn draw(&mut self, part: MeshPart) {
        self.draws.push(DrawCall {
            part,
            uniforms: self.uniforms.clone(),
        });
    }

    // ---- preparation ----

    /// Loads the scene's textures from `dir`. Files that fail to load are
    /// reported and skipped. Returns how many were registered.
    pub fn load_scene_textures<P: AsRef<Path>>(&mut self, dir: P) -> usize {
        let dir = dir.as_ref();
        let mut loaded = 0;
        for (tag, file) in SCENE_TEXTURES {
            match self.textures.create_texture(dir.join(file), tag) {
                Ok(_) => loaded += 1,
                Err(e) => warn!("{}", e),
            }
        }
        self.textures.bind_textures();
        loaded
    }

    /// Rebuilds the material library; the flame's glow depends on `time`.
    pub fn define_object_materials(&mut self, time: f32) {
        self.materials.clear();
        for material in scene_materials(time) {
            self.materials.define(material);
        }
    }

    /// Installs the scene's lights with a fresh flame color.
    pub fn setup_scene_lights(&mut self, time: f32) {
        self.flame_color = self.flicker.flame_color(time);
        self.lights = scene_lights(self.flame_color);
    }

    pub fn load_scene_shapes(&mut self) {
        for shape in Shape::ALL {
            self.meshes.load(shape);
        }
    }

    /// Loads textures, materials, lights and meshes.
    pub fn prepare_scene<P: AsRef<Path>>(&mut self, texture_dir: P, time: f32) {
        let loaded = self.load_scene_textures(texture_dir);
        info!("Loaded {}/{} scene textures", loaded, SCENE_TEXTURES.len());
        self.define_object_materials(time);
        self.setup_scene_lights(time);
        self.load_scene_shapes();
    }

    /// Points the spotlight along the camera's line of sight.
    pub fn attach_spotlight(&mut self, camera: &Camera) {
        if let Some(spot) = self.lights.spot.as_mut() {
            spot.follow_camera(camera);
        }
    }

    /// Advances the candle's flicker to `time` without touching other lights.
    pub fn update_flicker(&mut self, time: f32) {
        self.flame_color = self.flicker.flame_color(time);
        if let Err(e) = self
            .lights
            .set_point_light(FLAME_LIGHT_SLOT, flame_light(self.flame_color))
        {
            warn!("{}", e);
        }
        self.define_object_materials(time);
    }

    // ---- rendering ----

    /// Records every prop of the scene for `time` and returns the draw list.
    pub fn render_scene(&mut self, time: f32) -> &[DrawCall] {
        self.draws.clear();
        self.render_table();
        self.render_backdrop();
        self.render_potion_bottle();
        self.render_candle(time);
        self.render_bottom_book();
        self.render_top_book();
        self.render_cauldron();
        debug!("Recorded {} draw calls", self.draws.len());
        &self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::shapes::BoxSide;
    use crate::scene::texture::Texture;
    use image::{DynamicImage, Rgb, RgbImage};

    fn prepared() -> SceneManager {
        let mut scene = SceneManager::new(7);
        scene.define_object_materials(0.0);
        scene.setup_scene_lights(0.0);
        scene.load_scene_shapes();
        scene
    }

    fn tiny_texture() -> Texture {
        let img = RgbImage::from_pixel(1, 1, Rgb([10, 20, 30]));
        Texture::from_image(DynamicImage::ImageRgb8(img)).unwrap()
    }

    #[test]
    fn test_uniforms_persist_between_draws() {
        let mut scene = prepared();
        scene.textures_mut().register("wood", tiny_texture()).unwrap();

        scene.set_shader_texture("wood");
        scene.set_texture_uv_scale(2.0, 0.5);
        scene.set_shader_material("metal");
        scene.draw(MeshPart::Whole(Shape::Box));
        scene.set_transformations(Vector3::new(2.0, 2.0, 2.0), 0.0, 0.0, 0.0, Vector3::zeros());
        scene.draw(MeshPart::Whole(Shape::Cone));

        let second = &scene.draws()[1].uniforms;
        assert!(second.use_texture);
        assert_eq!(second.texture_slot, Some(0));
        assert_eq!(second.uv_scale, Vector2::new(2.0, 0.5));
        assert_eq!(second.material.tag, "metal");
        assert_eq!(second.model[(0, 0)], 2.0);
        assert_eq!(scene.draws()[0].uniforms.model, nalgebra::Matrix4::identity());
    }

    #[test]
    fn test_color_turns_texturing_off() {
        let mut scene = prepared();
        scene.set_shader_texture("fabric");
        assert!(scene.uniforms().use_texture);
        scene.set_shader_color(0.1, 0.2, 0.3, 0.4);
        assert!(!scene.uniforms().use_texture);
        assert_eq!(scene.uniforms().object_color, Vector4::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_unknown_tags() {
        let mut scene = prepared();
        scene.set_shader_material("glass");
        scene.set_shader_material("obsidian");
        assert_eq!(scene.uniforms().material.tag, "glass");

        scene.set_shader_texture("obsidian");
        assert!(scene.uniforms().use_texture);
        assert_eq!(scene.uniforms().texture_slot, None);
    }

    #[test]
    fn test_missing_texture_files_are_skipped() {
        let mut scene = SceneManager::new(0);
        let dir = std::env::temp_dir().join("potion_scene_no_textures_here");
        assert_eq!(scene.load_scene_textures(&dir), 0);
        assert!(scene.textures().is_empty());
    }

    #[test]
    fn test_scene_draw_list() {
        let mut scene = prepared();
        let draws = scene.render_scene(0.0);
        assert_eq!(draws.len(), 42);

        let blended = draws.iter().filter(|d| d.uniforms.blend).count();
        // Ten bottle parts, the flame and the cauldron liquid.
        assert_eq!(blended, 12);

        let half_spheres = draws.iter().filter(|d| d.part == MeshPart::HalfSphere).count();
        assert_eq!(half_spheres, 1);

        let sides = draws
            .iter()
            .filter(|d| matches!(d.part, MeshPart::BoxSide(_)))
            .count();
        assert_eq!(sides, 13);
        assert!(
            !draws
                .iter()
                .any(|d| d.part == MeshPart::BoxSide(BoxSide::Top))
        );
    }

    #[test]
    fn test_render_scene_replaces_previous_frame() {
        let mut scene = prepared();
        scene.render_scene(0.0);
        let count = scene.render_scene(1.0).len();
        assert_eq!(count, 42);
    }

    #[test]
    fn test_update_flicker_changes_only_the_flame() {
        let mut scene = prepared();
        let before = scene.lights().clone();
        scene.update_flicker(3.0);
        let after = scene.lights();
        assert_eq!(before.point_lights[1], after.point_lights[1]);
        assert_eq!(before.directional, after.directional);
        assert_ne!(
            before.point_lights[FLAME_LIGHT_SLOT],
            after.point_lights[FLAME_LIGHT_SLOT]
        );
        let flame = after.point_lights[FLAME_LIGHT_SLOT].as_ref().unwrap();
        assert_eq!(flame.diffuse, scene.flame_color());
    }

    #[test]
    fn test_spotlight_follows_camera() {
        let mut scene = prepared();
        let camera = Camera::new_perspective(
            nalgebra::Point3::new(0.0, 7.0, 18.0),
            nalgebra::Point3::new(0.0, 4.0, -1.0),
            Vector3::y(),
            45f32.to_radians(),
            1.25,
            0.1,
            100.0,
        );
        scene.attach_spotlight(&camera);
        let spot = scene.lights().spot.as_ref().unwrap();
        assert_eq!(spot.position, camera.position);
        assert!((spot.direction - camera.front()).norm() < 1e-6);
    }
}
