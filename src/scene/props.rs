//! The props on the table, each built from basic shapes.

use crate::scene::light::flame_alpha;
use crate::scene::manager::SceneManager;
use crate::scene::shapes::{BoxSide, MeshPart, Shape};
use nalgebra::Vector3;

const GLASS_COLOR: [f32; 4] = [0.196, 0.294, 0.796, 0.65];
const IRON_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];
const HOLDER_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];
const LEATHER_COLOR: [f32; 4] = [0.36, 0.25, 0.20, 1.0];

/// The four walls of a box, leaving top and bottom open.
const PAGE_SIDES: [BoxSide; 4] = [BoxSide::Front, BoxSide::Back, BoxSide::Left, BoxSide::Right];

impl SceneManager {
    fn set_color(&mut self, [r, g, b, a]: [f32; 4]) {
        self.set_shader_color(r, g, b, a);
    }

    fn place(&mut self, scale: [f32; 3], rotation: [f32; 3], position: [f32; 3]) {
        self.set_transformations(
            Vector3::from(scale),
            rotation[0],
            rotation[1],
            rotation[2],
            Vector3::from(position),
        );
    }

    /// Fabric runner on top of a long wooden table.
    pub fn render_table(&mut self) {
        self.place([20.0, 0.2, 15.0], [0.0; 3], [0.0, -0.2, -0.9]);
        self.set_shader_color(1.0, 1.0, 1.0, 1.0);
        self.set_shader_texture("fabric");
        self.set_texture_uv_scale(1.0, 1.0);
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::Box));

        self.place([50.0, 1.5, 15.0], [0.0; 3], [0.0, -1.2, -0.9]);
        self.set_shader_color(0.39, 0.24, 0.12, 1.0);
        self.set_shader_texture("wood");
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::Box));
    }

    /// Fabric wall standing behind the table.
    pub fn render_backdrop(&mut self) {
        self.place([20.0, 1.0, 20.0], [90.0, 0.0, 0.0], [0.0, 15.0, -9.0]);
        self.set_shader_texture("fabric");
        self.set_texture_uv_scale(10.0, 10.0);
        self.set_shader_material("backdrop");
        self.draw(MeshPart::Whole(Shape::Plane));
    }

    /// Translucent glass bottle with liquid inside and a rubber stopper.
    pub fn render_potion_bottle(&mut self) {
        self.set_blending(true);
        let scale_factor = 0.9;

        let liquid_scale = 0.8;
        self.place(
            [2.0 * liquid_scale, 2.8 * liquid_scale, 2.0 * liquid_scale],
            [0.0, 15.0, 0.0],
            [4.0, 5.5 * liquid_scale, -1.0],
        );
        self.set_shader_color(0.396, 0.694, 0.996, 0.7);
        self.set_shader_material("liquid");
        self.draw(MeshPart::Whole(Shape::Box));

        // Body, open at the top where the shoulders sit.
        self.place(
            [2.0 * scale_factor, 3.5 * scale_factor, 2.0 * scale_factor],
            [0.0, 15.0, 0.0],
            [4.0, 4.75 * scale_factor, -1.0],
        );
        self.set_color(GLASS_COLOR);
        self.set_shader_material("glass");
        for side in PAGE_SIDES.into_iter().chain([BoxSide::Bottom]) {
            self.draw(MeshPart::BoxSide(side));
        }

        // Shoulders.
        self.place(
            [2.0 * scale_factor, 1.5 * scale_factor, 2.0 * scale_factor],
            [0.0, 15.0, 0.0],
            [4.0, 7.25 * scale_factor, -1.0],
        );
        self.set_color(GLASS_COLOR);
        self.set_shader_material("glass");
        self.draw(MeshPart::Whole(Shape::Pyramid4));

        // Neck.
        self.place(
            [0.35 * scale_factor, 2.2 * scale_factor, 0.35 * scale_factor],
            [0.0, 15.0, 0.0],
            [4.0, 7.0 * scale_factor, -1.0],
        );
        self.set_color(GLASS_COLOR);
        self.set_shader_material("glass");
        self.draw(MeshPart::Whole(Shape::Cylinder));

        // Lip.
        self.place(
            [0.42 * scale_factor, 0.42 * scale_factor, 0.65 * scale_factor],
            [90.0, 0.0, 0.0],
            [4.0, 9.2 * scale_factor, -1.0],
        );
        self.set_color(GLASS_COLOR);
        self.set_shader_material("glass");
        self.draw(MeshPart::Whole(Shape::Torus));

        // Stopper, upside down so the narrow end goes into the neck.
        self.place(
            [0.45 * scale_factor, 0.69 * scale_factor, 0.45 * scale_factor],
            [180.0, 0.0, 0.0],
            [4.0, 9.92 * scale_factor, -1.0],
        );
        self.set_shader_texture("rubber");
        self.set_texture_uv_scale(2.0, 2.0);
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::TaperedCylinder));

        self.set_blending(false);
    }

    /// Metal candle holder, wax candle, wick and a flickering flame.
    pub fn render_candle(&mut self, time: f32) {
        let holder: [(Shape, [f32; 3], [f32; 3], [f32; 3]); 6] = [
            // Foot ring.
            (Shape::Torus, [1.5, 1.7, 1.5], [90.0, 0.0, 0.0], [-5.0, 0.25, 0.9]),
            // Bell-shaped base.
            (Shape::TaperedCylinder, [1.5, 2.2, 1.5], [0.0; 3], [-5.0, 0.3, 0.9]),
            (Shape::Cylinder, [0.5, 0.5, 0.5], [0.0; 3], [-5.0, 2.5, 0.9]),
            (Shape::TaperedCylinder, [0.58, 1.4, 0.58], [0.0, 90.0, 0.0], [-5.0, 3.0, 0.9]),
            // Cup, flipped to open upwards.
            (Shape::TaperedCylinder, [0.62, 1.9, 0.62], [0.0, 0.0, 180.0], [-5.0, 5.8, 0.9]),
            (Shape::Torus, [0.7, 0.7, 0.45], [90.0, 0.0, 0.0], [-5.0, 5.85, 0.9]),
        ];
        for (shape, scale, rotation, position) in holder {
            self.place(scale, rotation, position);
            self.set_color(HOLDER_COLOR);
            self.set_shader_texture("metal");
            self.set_shader_material("metal");
            self.draw(MeshPart::Whole(shape));
        }

        self.place([0.35, 2.4, 0.35], [0.0; 3], [-5.0, 5.8, 0.9]);
        self.set_shader_color(1.0, 1.0, 1.0, 1.0);
        self.set_shader_texture("candle");
        self.set_texture_uv_scale(2.0, 1.0);
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::Cylinder));

        // Wick.
        self.place([0.04, 0.6, 0.04], [0.0; 3], [-5.0, 8.0, 0.9]);
        self.set_shader_color(0.1, 0.1, 0.1, 1.0);
        self.set_shader_texture("rubber");
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::Cone));

        self.place([0.2, 0.8, 0.2], [0.0; 3], [-5.0, 8.0, 0.9]);
        let flame = self.flame_color();
        self.set_shader_color(flame.x, flame.y, flame.z, flame_alpha(time));
        self.set_shader_material("flame");
        self.set_blending(true);
        self.draw(MeshPart::Whole(Shape::Cone));
        self.set_blending(false);
    }

    /// Lower book of the pile: a block of pages between two leather covers.
    pub fn render_bottom_book(&mut self) {
        self.place([4.0, 1.4, 4.5], [0.0, 30.0, 0.0], [4.0, 0.75, -1.0]);
        self.set_shader_color(0.659, 0.576, 0.439, 1.0);
        self.set_shader_texture("pages");
        self.set_texture_uv_scale(2.0, 0.5);
        self.set_shader_material("wood");
        for side in PAGE_SIDES {
            self.draw(MeshPart::BoxSide(side));
        }

        let covers = [
            ([4.2, 0.2, 4.7], [0.0, 30.0, 0.0], [4.0, 0.1, -1.0]),
            ([4.2, 0.2, 4.7], [0.0, 30.0, 0.0], [4.0, 1.5, -1.0]),
            // Spine.
            ([1.6, 0.2, 4.7], [30.0, 0.0, 90.0], [5.8, 0.8, -2.05]),
        ];
        for (scale, rotation, position) in covers {
            self.place(scale, rotation, position);
            self.set_color(LEATHER_COLOR);
            self.set_shader_texture("leather");
            self.set_texture_uv_scale(0.5, 6.0);
            self.set_shader_material("wood");
            self.draw(MeshPart::Whole(Shape::Box));
        }
    }

    /// Upper book, turned further round than the one below it.
    pub fn render_top_book(&mut self) {
        self.place([4.0, 1.5, 4.5], [0.0, 60.0, 0.0], [4.0, 2.35, -1.0]);
        self.set_shader_texture("pages");
        self.set_texture_uv_scale(1.0, 1.0);
        self.set_shader_material("wood");
        for side in PAGE_SIDES {
            self.draw(MeshPart::BoxSide(side));
        }

        // The covers keep the UV scale of the pages.
        for position in [[4.0, 1.7, -1.0], [4.0, 3.1, -1.0]] {
            self.place([4.2, 0.2, 4.7], [0.0, 60.0, 0.0], position);
            self.set_color(LEATHER_COLOR);
            self.set_shader_texture("leather");
            self.set_shader_material("wood");
            self.draw(MeshPart::Whole(Shape::Box));
        }

        // Spine.
        self.place([1.6, 0.2, 4.7], [60.0, 0.0, 90.0], [5.0, 2.4, -2.735]);
        self.set_color(LEATHER_COLOR);
        self.set_shader_texture("leather");
        self.set_texture_uv_scale(0.5, 6.0);
        self.set_shader_material("wood");
        self.draw(MeshPart::Whole(Shape::Box));
    }

    /// Iron cauldron on three legs, filled with glowing blue liquid.
    pub fn render_cauldron(&mut self) {
        // Bowl, the dome flipped over.
        self.place([3.2, 4.2, 3.2], [180.0, 0.0, 0.0], [-1.5, 4.6, -2.5]);
        self.set_iron();
        self.draw(MeshPart::HalfSphere);

        // Rim laid flat on top of the bowl.
        self.place([3.0, 3.0, 0.6], [90.0, 0.0, 0.0], [-1.5, 4.5, -2.5]);
        self.set_iron();
        self.draw(MeshPart::Whole(Shape::Torus));

        let legs = [[-2.8, 2.0, -3.0], [-0.2, 2.0, -3.0], [-1.25, 2.0, -1.0]];
        for position in legs {
            self.place([0.6, 1.9, 0.3], [0.0, 0.0, 180.0], position);
            self.set_iron();
            self.draw(MeshPart::Whole(Shape::TaperedCylinder));
        }

        self.set_blending(true);
        self.place([2.8, 1.5, 2.8], [0.0; 3], [-1.5, 2.75, -2.5]);
        self.set_shader_color(0.3, 0.8, 1.0, 0.65);
        self.set_shader_material("liquid");
        self.draw(MeshPart::Whole(Shape::Cylinder));
        self.set_blending(false);
    }

    fn set_iron(&mut self) {
        self.set_color(IRON_COLOR);
        self.set_shader_texture("metal");
        self.set_texture_uv_scale(1.0, 1.0);
        self.set_shader_material("metal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> SceneManager {
        let mut scene = SceneManager::new(1);
        scene.define_object_materials(0.0);
        scene.setup_scene_lights(0.0);
        scene
    }

    fn draws_of(render: impl FnOnce(&mut SceneManager)) -> usize {
        let mut scene = scene();
        render(&mut scene);
        scene.draws().len()
    }

    #[test]
    fn test_draw_counts_per_prop() {
        assert_eq!(draws_of(|s| s.render_table()), 2);
        assert_eq!(draws_of(|s| s.render_backdrop()), 1);
        assert_eq!(draws_of(|s| s.render_potion_bottle()), 10);
        assert_eq!(draws_of(|s| s.render_candle(0.0)), 9);
        assert_eq!(draws_of(|s| s.render_bottom_book()), 7);
        assert_eq!(draws_of(|s| s.render_top_book()), 7);
        assert_eq!(draws_of(|s| s.render_cauldron()), 6);
    }

    #[test]
    fn test_backdrop_keeps_table_uv_scale_until_changed() {
        let mut scene = scene();
        scene.render_table();
        scene.render_backdrop();
        let backdrop = &scene.draws()[2];
        assert_eq!(backdrop.part, MeshPart::Whole(Shape::Plane));
        assert_eq!(backdrop.uniforms.uv_scale, nalgebra::Vector2::new(10.0, 10.0));
        assert_eq!(backdrop.uniforms.material.tag, "backdrop");
        assert!(backdrop.uniforms.use_texture);
    }

    #[test]
    fn test_bottle_is_blended_then_blending_stops() {
        let mut scene = scene();
        scene.render_potion_bottle();
        assert!(scene.draws().iter().all(|d| d.uniforms.blend));
        assert!(!scene.uniforms().blend);

        let liquid = &scene.draws()[0].uniforms;
        assert!(!liquid.use_texture);
        assert_eq!(liquid.object_color.w, 0.7);
        assert_eq!(liquid.material.tag, "liquid");

        let stopper = &scene.draws()[9];
        assert_eq!(stopper.part, MeshPart::Whole(Shape::TaperedCylinder));
        assert!(stopper.uniforms.use_texture);
    }

    #[test]
    fn test_flame_uses_flicker_color_and_alpha() {
        let mut scene = scene();
        scene.render_candle(0.0);
        let flame = scene.draws().last().unwrap();
        let color = scene.flame_color();
        assert_eq!(flame.part, MeshPart::Whole(Shape::Cone));
        assert!(flame.uniforms.blend);
        assert!(!flame.uniforms.use_texture);
        assert_eq!(flame.uniforms.object_color.xyz(), color);
        assert!((flame.uniforms.object_color.w - 0.6).abs() < 1e-6);
        assert!(flame.uniforms.material.emissive_color.norm() > 0.0);

        let candle = &scene.draws()[6].uniforms;
        assert_eq!(candle.uv_scale, nalgebra::Vector2::new(2.0, 1.0));
        assert_eq!(candle.material.emissive_color, Vector3::zeros());
    }

    #[test]
    fn test_top_book_covers_inherit_page_uv_scale() {
        let mut scene = scene();
        scene.render_bottom_book();
        scene.render_top_book();
        let draws = scene.draws();
        assert_eq!(draws[6].uniforms.uv_scale, nalgebra::Vector2::new(0.5, 6.0));
        assert_eq!(draws[11].uniforms.uv_scale, nalgebra::Vector2::new(1.0, 1.0));
        assert_eq!(draws[13].uniforms.uv_scale, nalgebra::Vector2::new(0.5, 6.0));
    }

    #[test]
    fn test_cauldron_bowl_hangs_below_its_rim() {
        let mut scene = scene();
        scene.render_cauldron();
        let bowl = &scene.draws()[0].uniforms.model;
        // The dome's apex (0, 1, 0) is flipped down below the rim height.
        let apex = bowl.transform_point(&nalgebra::Point3::new(0.0, 1.0, 0.0));
        assert!((apex.y - 0.4).abs() < 1e-4);
        assert!(scene.draws()[5].uniforms.blend);
    }
}
