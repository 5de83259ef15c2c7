use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::scene::camera::Camera;
use crate::scene::draw::DrawCall;
use crate::scene::light::LightRig;
use crate::scene::material::ObjectMaterial;
use crate::scene::texture::{Texture, TextureRegistry};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Interpolated from vertex to fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// World-space normal.
    pub normal: Vector3<f32>,
    pub world_pos: Point3<f32>,
    pub uv: Vector2<f32>,
}

// Point3 has no Point + Point, so go through the coordinates.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

/// Multi-light Phong shader for one recorded draw call.
pub struct PhongShader<'a> {
    pub model_matrix: Matrix4<f32>,
    /// Inverse-transpose of the model's upper 3x3.
    pub normal_matrix: Matrix3<f32>,
    pub view_projection: Matrix4<f32>,
    pub camera_pos: Point3<f32>,

    pub lights: &'a LightRig,
    pub material: &'a ObjectMaterial,
    pub object_color: Vector4<f32>,
    /// `None` draws with `object_color`.
    pub texture: Option<&'a Texture>,
    pub uv_scale: Vector2<f32>,
}

impl<'a> PhongShader<'a> {
    pub fn new(
        draw: &'a DrawCall,
        lights: &'a LightRig,
        camera: &Camera,
        textures: &'a TextureRegistry,
    ) -> Self {
        let uniforms = &draw.uniforms;
        let texture = if draw.samples_texture() {
            uniforms
                .texture_slot
                .and_then(|slot| textures.texture_in_slot(slot))
                .map(|texture| texture.as_ref())
        } else {
            None
        };

        Self {
            model_matrix: uniforms.model,
            normal_matrix: normal_matrix(&uniforms.model),
            view_projection: camera.view_projection(),
            camera_pos: camera.position,
            lights,
            material: &uniforms.material,
            object_color: uniforms.object_color,
            texture,
            uv_scale: uniforms.uv_scale,
        }
    }

    /// Texture sample or object color, before lighting.
    fn base_color(&self, uv: Vector2<f32>) -> Vector4<f32> {
        match self.texture {
            Some(texture) => texture.sample(uv.x * self.uv_scale.x, uv.y * self.uv_scale.y),
            None => self.object_color,
        }
    }

    /// Ambient, diffuse and specular contribution of one light.
    fn light_terms(
        &self,
        normal: &Vector3<f32>,
        view_dir: &Vector3<f32>,
        light_dir: &Vector3<f32>,
        ambient: &Vector3<f32>,
        diffuse: &Vector3<f32>,
        specular: &Vector3<f32>,
    ) -> Vector3<f32> {
        let kd = &self.material.diffuse_color;
        let ks = &self.material.specular_color;

        let diff = normal.dot(light_dir).max(0.0);
        let reflect_dir = normal * (2.0 * normal.dot(light_dir)) - light_dir;
        let spec = view_dir
            .dot(&reflect_dir)
            .max(0.0)
            .powf(self.material.shininess);

        ambient.component_mul(kd) + diffuse.component_mul(kd) * diff + specular.component_mul(ks) * spec
    }

    fn lighting(&self, normal: &Vector3<f32>, world_pos: &Point3<f32>) -> Vector3<f32> {
        let view_dir = (self.camera_pos - world_pos).normalize();
        let mut color = Vector3::zeros();

        if let Some(light) = &self.lights.directional {
            let light_dir = (-light.direction).normalize();
            color += self.light_terms(
                normal,
                &view_dir,
                &light_dir,
                &light.ambient,
                &light.diffuse,
                &light.specular,
            );
        }

        for light in self.lights.active_point_lights() {
            let light_dir = (light.position - world_pos).normalize();
            color += self.light_terms(
                normal,
                &view_dir,
                &light_dir,
                &light.ambient,
                &light.diffuse,
                &light.specular,
            );
        }

        if let Some(spot) = &self.lights.spot {
            let to_light = spot.position - world_pos;
            let distance = to_light.norm();
            if distance > f32::EPSILON {
                let light_dir = to_light / distance;
                let scale = spot.attenuation(distance) * spot.cone_intensity(&light_dir);
                color += self.light_terms(
                    normal,
                    &view_dir,
                    &light_dir,
                    &spot.ambient,
                    &spot.diffuse,
                    &spot.specular,
                ) * scale;
            }
        }

        color
    }
}

/// Falls back to the plain 3x3 when the model matrix is singular.
fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

impl Shader for PhongShader<'_> {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world = self.model_matrix * vertex.position.to_homogeneous();
        let clip_pos = self.view_projection * world;

        let varying = PhongVarying {
            normal: (self.normal_matrix * vertex.normal).normalize(),
            world_pos: Point3::from(world.xyz()),
            uv: vertex.texcoord,
        };

        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying) -> Vector4<f32> {
        let base = self.base_color(varying.uv);
        if !self.lights.enabled {
            return base;
        }

        let normal = varying.normal.normalize();
        let lit = self.lighting(&normal, &varying.world_pos);
        let rgb = lit.component_mul(&base.xyz()) + self.material.emissive_color;

        let rgb = rgb.map(|c| c.clamp(0.0, 1.0));
        Vector4::new(rgb.x, rgb.y, rgb.z, base.w)
    }
}
