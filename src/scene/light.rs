use crate::scene::camera::Camera;
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of point light slots the shader exposes.
pub const MAX_POINT_LIGHTS: usize = 5;

/// Slot used by the candle flame.
pub const FLAME_LIGHT_SLOT: usize = 3;

/// Parallel light. `direction` is the direction the light travels.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

/// Omni light without distance falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

/// Cone light with attenuation and a soft edge between `cut_off` and
/// `outer_cut_off` (both stored as cosines).
#[derive(Debug, Clone, PartialEq)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl SpotLight {
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    /// 1 inside the inner cone, 0 outside the outer cone, linear in between.
    pub fn cone_intensity(&self, light_dir: &Vector3<f32>) -> f32 {
        let theta = light_dir.dot(&(-self.direction).normalize());
        let epsilon = self.cut_off - self.outer_cut_off;
        if epsilon.abs() < f32::EPSILON {
            return if theta >= self.cut_off { 1.0 } else { 0.0 };
        }
        ((theta - self.outer_cut_off) / epsilon).clamp(0.0, 1.0)
    }

    /// Moves the light onto the camera, pointing where it looks.
    pub fn follow_camera(&mut self, camera: &Camera) {
        self.position = camera.position;
        self.direction = camera.front();
    }
}

/// Every light the shader can see for one frame.
#[derive(Debug, Clone)]
pub struct LightRig {
    /// When false the shader outputs unlit texture/object color.
    pub enabled: bool,
    pub directional: Option<DirectionalLight>,
    pub point_lights: [Option<PointLight>; MAX_POINT_LIGHTS],
    pub spot: Option<SpotLight>,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            enabled: false,
            directional: None,
            point_lights: Default::default(),
            spot: None,
        }
    }
}

impl LightRig {
    pub fn active_point_lights(&self) -> impl Iterator<Item = &PointLight> {
        self.point_lights.iter().flatten()
    }

    pub fn set_point_light(&mut self, slot: usize, light: PointLight) -> Result<(), String> {
        let entry = self
            .point_lights
            .get_mut(slot)
            .ok_or_else(|| format!("Point light slot {} out of range", slot))?;
        *entry = Some(light);
        Ok(())
    }
}

/// Source of the candle's color jitter. Keeps its RNG across frames so an
/// animation sequence sees a continuous random stream.
#[derive(Debug, Clone)]
pub struct FlameFlicker {
    rng: StdRng,
}

impl FlameFlicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Flame light color at `time`: a slow green pulse plus small random noise.
    pub fn flame_color(&mut self, time: f32) -> Vector3<f32> {
        let flicker = (time * 3.0).sin() * 0.3 + 0.5;

        let red = 1.0 + self.jitter();
        let green = 0.2 + flicker * 0.2 + self.jitter();
        let blue = 0.1 + self.jitter() * 0.1;

        Vector3::new(red, green, blue).map(|c| c.clamp(0.0, 1.0))
    }

    fn jitter(&mut self) -> f32 {
        self.rng.random_range(-0.03..0.03)
    }
}

/// Opacity of the flame mesh at `time`.
pub fn flame_alpha(time: f32) -> f32 {
    ((time * 2.5).sin() * 0.2 + 0.6).clamp(0.5, 0.8)
}

/// Point light sitting just above the candle wick.
pub fn flame_light(flame_color: Vector3<f32>) -> PointLight {
    PointLight {
        position: Point3::new(-5.0, 8.8, 0.9),
        ambient: flame_color * 0.1,
        diffuse: flame_color,
        specular: flame_color * 0.8,
    }
}

/// Moonlight, candle, two accent lights and a camera-mounted spotlight.
pub fn scene_lights(flame_color: Vector3<f32>) -> LightRig {
    let mut rig = LightRig {
        enabled: true,
        directional: Some(DirectionalLight {
            direction: Vector3::new(-0.05, -0.3, -0.1),
            ambient: Vector3::new(0.08, 0.08, 0.1),
            diffuse: Vector3::new(0.3, 0.3, 0.5),
            specular: Vector3::new(0.6, 0.6, 0.7),
        }),
        point_lights: Default::default(),
        spot: Some(SpotLight {
            position: Point3::origin(),
            direction: Vector3::new(0.0, 0.0, -1.0),
            ambient: Vector3::new(0.1, 0.1, 0.15),
            diffuse: Vector3::new(0.6, 0.6, 0.9),
            specular: Vector3::new(0.9, 0.9, 1.2),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            cut_off: 35.0_f32.to_radians().cos(),
            outer_cut_off: 45.0_f32.to_radians().cos(),
        }),
    };

    rig.point_lights[FLAME_LIGHT_SLOT] = Some(flame_light(flame_color));
    // Warm fill above the candle.
    rig.point_lights[1] = Some(PointLight {
        position: Point3::new(-4.0, 8.0, 0.0),
        ambient: Vector3::new(0.05, 0.04, 0.03),
        diffuse: Vector3::new(0.4, 0.3, 0.2),
        specular: Vector3::new(0.5, 0.4, 0.3),
    });
    // Cool pink-purple from the front right.
    rig.point_lights[2] = Some(PointLight {
        position: Point3::new(3.8, 5.5, 4.0),
        ambient: Vector3::new(0.08, 0.06, 0.1),
        diffuse: Vector3::new(0.2, 0.2, 0.5),
        specular: Vector3::new(0.3, 0.3, 0.6),
    });

    rig
}
