use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{
    barycentric_coordinates, is_inside_triangle, perspective_correct_barycentric,
};
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::Shader;
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// Draws clip-space triangles onto a `FrameBuffer`.
pub struct Rasterizer {
    pub cull_mode: CullMode,
    pub wireframe: bool,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum CullMode {
    Back,
    Front,
    None,
}

impl CullMode {
    /// Parses "back" | "front" | "none"; anything else is `None` culling.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "back" => CullMode::Back,
            "front" => CullMode::Front,
            _ => CullMode::None,
        }
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Clip planes as (axis, sign): sign * P[axis] <= P.w
const CLIP_PLANES: [(usize, f32); 6] = [
    (0, 1.0),
    (0, -1.0),
    (1, 1.0),
    (1, -1.0),
    (2, 1.0),
    (2, -1.0),
];

impl Rasterizer {
    /// Face culling is off by default; the scene relies on seeing the inside
    /// of open meshes such as the cauldron bowl.
    pub fn new() -> Self {
        Self {
            cull_mode: CullMode::None,
            wireframe: false,
        }
    }

    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }

    /// Clips the triangle against the view frustum in homogeneous space
    /// (Sutherland–Hodgman), then fans the resulting convex polygon into
    /// triangles and rasterizes each one.
    ///
    /// With `blend` set the fragment alpha mixes with the stored color;
    /// depth is written either way.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        blend: bool,
    ) {
        let mut current_poly: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);
        let mut clip_buffer: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);

        for i in 0..3 {
            current_poly.push((clip_coords[i], varyings[i]));
        }

        for &(axis, sign) in &CLIP_PLANES {
            if current_poly.is_empty() {
                return;
            }
            Self::clip_polygon_against_plane::<S>(&current_poly, &mut clip_buffer, axis, sign);
            std::mem::swap(&mut current_poly, &mut clip_buffer);
        }

        if current_poly.len() < 3 {
            return;
        }

        let v0 = current_poly[0];
        for pair in current_poly[1..].windows(2) {
            let (v1, v2) = (pair[0], pair[1]);
            self.rasterize_triangle_clipped(
                framebuffer,
                shader,
                &[v0.0, v1.0, v2.0],
                &[v0.1, v1.1, v2.1],
                blend,
            );
        }
    }

    /// Clips `input` against one plane into `output` (cleared first).
    fn clip_polygon_against_plane<S: Shader>(
        input: &[(Vector4<f32>, S::Varying)],
        output: &mut Vec<(Vector4<f32>, S::Varying)>,
        axis: usize,
        sign: f32,
    ) {
        output.clear();

        let Some(&last) = input.last() else {
            return;
        };

        let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

        let mut prev = last;
        let mut prev_inside = is_inside(&prev.0);

        for curr in input {
            let curr_inside = is_inside(&curr.0);

            if curr_inside != prev_inside {
                if let Some(inter) = Self::intersect_edge_plane::<S>(prev, *curr, axis, sign) {
                    output.push(inter);
                }
            }
            if curr_inside {
                output.push(*curr);
            }

            prev = *curr;
            prev_inside = curr_inside;
        }
    }

    /// Intersection of segment a→b with the plane `sign * P[axis] = P.w`,
    /// interpolating position and varying.
    #[inline(always)]
    fn intersect_edge_plane<S: Shader>(
        a: (Vector4<f32>, S::Varying),
        b: (Vector4<f32>, S::Varying),
        axis: usize,
        sign: f32,
    ) -> Option<(Vector4<f32>, S::Varying)> {
        let ac = a.0[axis];
        let bc = b.0[axis];
        let aw = a.0.w;
        let bw = b.0.w;

        let denom = sign * (bc - ac) - (bw - aw);
        if denom.abs() < 1e-9 {
            return None;
        }

        let t = (aw - sign * ac) / denom;
        if !t.is_finite() {
            return None;
        }

        let pos = a.0 + (b.0 - a.0) * t;
        let vary = a.1 * (1.0 - t) + b.1 * t;

        Some((pos, vary))
    }

    /// Rasterizes a triangle already inside the frustum: perspective divide,
    /// viewport transform, culling, then per-pixel depth test and shading.
    fn rasterize_triangle_clipped<S: Shader>(
        &self,
        framebuffer: &FrameBuffer,
        shader: &S,
        clip_coords: &[Vector4<f32>; 3],
        varyings: &[S::Varying; 3],
        blend: bool,
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen_coords = [Point2::origin(); 3];
        let mut w_values = [0.0; 3];

        for i in 0..3 {
            if clip_coords[i].w.abs() < 1e-6 {
                return;
            }
            let ndc = apply_perspective_division(&clip_coords[i]);
            w_values[i] = clip_coords[i].w;
            screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
        }

        // Screen Y points down, so counter-clockwise triangles have negative area.
        let [v0, v1, v2] = screen_coords;
        let edge1 = v1 - v0;
        let edge2 = v2 - v1;
        let signed_area = edge1.x * edge2.y - edge1.y * edge2.x;

        match self.cull_mode {
            CullMode::Back if signed_area >= 0.0 => return,
            CullMode::Front if signed_area <= 0.0 => return,
            _ => {}
        }

        let (min_x, min_y, max_x, max_y) = Self::compute_bounding_box(&screen_coords);

        if max_x < 0
            || max_y < 0
            || min_x >= framebuffer.buffer_width as i32
            || min_y >= framebuffer.buffer_height as i32
        {
            return;
        }

        let start_x = min_x.max(0) as usize;
        let end_x = max_x.min(framebuffer.buffer_width as i32 - 1) as usize;
        let start_y = min_y.max(0) as usize;
        let end_y = max_y.min(framebuffer.buffer_height as i32 - 1) as usize;

        // Rows of one triangle never overlap, so they can be shaded in parallel
        // without changing blend order.
        (start_y..=end_y).into_par_iter().for_each(|y| {
            for x in start_x..=end_x {
                let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

                let Some(bary) = barycentric_coordinates(pixel_center, v0, v1, v2) else {
                    continue;
                };
                if !is_inside_triangle(bary) {
                    continue;
                }

                if self.wireframe {
                    let threshold = 0.02;
                    if bary.x > threshold && bary.y > threshold && bary.z > threshold {
                        continue;
                    }
                }

                let Some(corrected) =
                    perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
                else {
                    continue;
                };

                let z_clip = corrected.x * clip_coords[0].z
                    + corrected.y * clip_coords[1].z
                    + corrected.z * clip_coords[2].z;
                let w_clip = corrected.x * w_values[0]
                    + corrected.y * w_values[1]
                    + corrected.z * w_values[2];
                let depth = (z_clip / w_clip) * 0.5 + 0.5;

                if framebuffer.depth_test_and_update(x, y, depth) {
                    let varying = varyings[0] * corrected.x
                        + varyings[1] * corrected.y
                        + varyings[2] * corrected.z;

                    let color = shader.fragment(varying);

                    if blend {
                        framebuffer.blend_pixel_safe(x, y, color);
                    } else {
                        framebuffer.set_pixel_safe(x, y, color.xyz());
                    }
                }
            }
        });
    }

    fn compute_bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
        let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
        let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
        let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
        let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use nalgebra::Vector3;

    /// Passes positions through untouched and paints a flat RGBA.
    struct FlatShader {
        color: Vector4<f32>,
    }

    impl Shader for FlatShader {
        type Varying = f32;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, f32) {
            (vertex.position.to_homogeneous(), 0.0)
        }

        fn fragment(&self, _varying: f32) -> Vector4<f32> {
            self.color
        }
    }

    fn full_screen_triangle(z: f32) -> [Vector4<f32>; 3] {
        [
            Vector4::new(-3.0, -1.0, z, 1.0),
            Vector4::new(3.0, -1.0, z, 1.0),
            Vector4::new(0.0, 3.0, z, 1.0),
        ]
    }

    #[test]
    fn test_triangle_covers_center_pixel() {
        let fb = FrameBuffer::new(8, 8, 1);
        let shader = FlatShader {
            color: Vector4::new(1.0, 0.0, 0.0, 1.0),
        };
        Rasterizer::new().rasterize_triangle(&fb, &shader, &full_screen_triangle(0.0), &[0.0; 3], false);
        assert_eq!(fb.get_pixel(4, 4).unwrap(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_nearer_triangle_wins_regardless_of_order() {
        let fb = FrameBuffer::new(4, 4, 1);
        let raster = Rasterizer::new();
        let near = FlatShader {
            color: Vector4::new(0.0, 1.0, 0.0, 1.0),
        };
        let far = FlatShader {
            color: Vector4::new(0.0, 0.0, 1.0, 1.0),
        };
        raster.rasterize_triangle(&fb, &near, &full_screen_triangle(-0.5), &[0.0; 3], false);
        raster.rasterize_triangle(&fb, &far, &full_screen_triangle(0.5), &[0.0; 3], false);
        assert_eq!(fb.get_pixel(2, 2).unwrap(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_blended_triangle_mixes_with_background() {
        let mut fb = FrameBuffer::new(4, 4, 1);
        fb.clear(Vector3::new(0.0, 0.0, 1.0));
        let shader = FlatShader {
            color: Vector4::new(1.0, 0.0, 0.0, 0.5),
        };
        Rasterizer::new().rasterize_triangle(&fb, &shader, &full_screen_triangle(0.0), &[0.0; 3], true);
        let c = fb.get_pixel(2, 2).unwrap();
        assert!((c - Vector3::new(0.5, 0.0, 0.5)).norm() < 1e-5);
    }

    #[test]
    fn test_back_face_culling_drops_clockwise_triangle() {
        let fb = FrameBuffer::new(4, 4, 1);
        let mut raster = Rasterizer::new();
        raster.set_cull_mode(CullMode::Back);
        let shader = FlatShader {
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
        };
        let mut clockwise = full_screen_triangle(0.0);
        clockwise.swap(1, 2);
        raster.rasterize_triangle(&fb, &shader, &clockwise, &[0.0; 3], false);
        assert_eq!(fb.get_pixel(2, 2).unwrap(), Vector3::zeros());

        raster.rasterize_triangle(&fb, &shader, &full_screen_triangle(0.0), &[0.0; 3], false);
        assert_eq!(fb.get_pixel(2, 2).unwrap(), Vector3::repeat(1.0));
    }

    #[test]
    fn test_triangle_behind_far_plane_is_clipped() {
        let fb = FrameBuffer::new(4, 4, 1);
        let shader = FlatShader {
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
        };
        Rasterizer::new().rasterize_triangle(&fb, &shader, &full_screen_triangle(2.0), &[0.0; 3], false);
        assert_eq!(fb.get_pixel(2, 2).unwrap(), Vector3::zeros());
    }

    #[test]
    fn test_cull_mode_names() {
        assert_eq!(CullMode::from_name("BACK"), CullMode::Back);
        assert_eq!(CullMode::from_name("front"), CullMode::Front);
        assert_eq!(CullMode::from_name("none"), CullMode::None);
    }
}
