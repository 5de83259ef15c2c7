use nalgebra::Vector3;

/// Surface response for the Phong shader, looked up by tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMaterial {
    pub tag: String,
    pub diffuse_color: Vector3<f32>,
    pub specular_color: Vector3<f32>,
    /// Specular exponent.
    pub shininess: f32,
    /// Light emitted by the surface itself, added after lighting.
    pub emissive_color: Vector3<f32>,
}

impl ObjectMaterial {
    pub fn new(tag: &str, diffuse: [f32; 3], specular: [f32; 3], shininess: f32) -> Self {
        Self {
            tag: tag.to_string(),
            diffuse_color: Vector3::from(diffuse),
            specular_color: Vector3::from(specular),
            shininess,
            emissive_color: Vector3::zeros(),
        }
    }

    pub fn with_emissive(mut self, emissive: Vector3<f32>) -> Self {
        self.emissive_color = emissive;
        self
    }
}

impl Default for ObjectMaterial {
    /// Neutral grey, as if no material had been set.
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8], [0.0, 0.0, 0.0], 1.0)
    }
}

/// Ordered list of materials; the first material with a matching tag wins.
#[derive(Debug, Default, Clone)]
pub struct MaterialLibrary {
    materials: Vec<ObjectMaterial>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, material: ObjectMaterial) {
        self.materials.push(material);
    }

    pub fn find_material(&self, tag: &str) -> Option<&ObjectMaterial> {
        self.materials.iter().find(|m| m.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn clear(&mut self) {
        self.materials.clear();
    }
}

/// Brightness multiplier of the flame's glow at `time` seconds, in [0.6, 1.0].
pub fn flame_glow_factor(time: f32) -> f32 {
    (time * 10.0).sin() * 0.2 + 0.8
}

/// The materials used by the scene's props.
pub fn scene_materials(time: f32) -> Vec<ObjectMaterial> {
    vec![
        ObjectMaterial::new("backdrop", [0.258824, 0.258824, 0.435294], [0.0, 0.0, 0.0], 0.3),
        ObjectMaterial::new("glass", [0.3, 0.3, 0.3], [0.7, 0.6, 0.9], 95.0),
        ObjectMaterial::new("metal", [0.4, 0.4, 0.4], [0.7, 0.7, 0.6], 52.0),
        ObjectMaterial::new("wood", [0.2, 0.2, 0.3], [0.0, 0.0, 0.0], 0.1),
        ObjectMaterial::new("flame", [1.0, 0.5, 0.0], [1.0, 0.6, 0.3], 32.0)
            .with_emissive(Vector3::new(1.0, 0.4, 0.0) * flame_glow_factor(time)),
        ObjectMaterial::new("liquid", [0.396, 0.694, 0.996], [0.3, 0.5, 0.7], 50.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(time: f32) -> MaterialLibrary {
        let mut lib = MaterialLibrary::new();
        for m in scene_materials(time) {
            lib.define(m);
        }
        lib
    }

    #[test]
    fn test_scene_defines_six_materials() {
        let lib = library(0.0);
        assert_eq!(lib.len(), 6);
        for tag in ["backdrop", "glass", "metal", "wood", "flame", "liquid"] {
            assert!(lib.find_material(tag).is_some(), "missing {tag}");
        }
        assert!(lib.find_material("stone").is_none());
    }

    #[test]
    fn test_metal_constants() {
        let lib = library(0.0);
        let metal = lib.find_material("metal").unwrap();
        assert_eq!(metal.diffuse_color, Vector3::new(0.4, 0.4, 0.4));
        assert_eq!(metal.specular_color, Vector3::new(0.7, 0.7, 0.6));
        assert_eq!(metal.shininess, 52.0);
        assert_eq!(metal.emissive_color, Vector3::zeros());
    }

    #[test]
    fn test_only_flame_glows_and_glow_flickers() {
        let at_rest = library(0.0);
        let flame = at_rest.find_material("flame").unwrap();
        assert!((flame.emissive_color - Vector3::new(0.8, 0.32, 0.0)).norm() < 1e-6);

        let peak_time = std::f32::consts::FRAC_PI_2 / 10.0;
        let peak = library(peak_time);
        let bright = peak.find_material("flame").unwrap();
        assert!((bright.emissive_color.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_glow_factor_bounds() {
        for i in 0..200 {
            let f = flame_glow_factor(i as f32 * 0.037);
            assert!((0.6 - 1e-6..=1.0 + 1e-6).contains(&f));
        }
    }

    #[test]
    fn test_first_definition_wins() {
        let mut lib = MaterialLibrary::new();
        lib.define(ObjectMaterial::new("wood", [1.0, 0.0, 0.0], [0.0; 3], 1.0));
        lib.define(ObjectMaterial::new("wood", [0.0, 1.0, 0.0], [0.0; 3], 1.0));
        assert_eq!(lib.find_material("wood").unwrap().diffuse_color.x, 1.0);
    }
}
