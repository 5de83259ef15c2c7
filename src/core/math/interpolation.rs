use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights (alpha, beta, gamma) of `p` relative to the screen-space
/// triangle (v1, v2, v3). `None` for degenerate triangles.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;
    if total_area_x2.abs() < EPSILON {
        return None;
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;
    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

#[inline(always)]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Reweights screen-space barycentrics by 1/w so attributes interpolate
/// linearly in view space. `None` when the weights collapse.
pub fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv = |w: f32| if w.abs() > EPSILON { 1.0 / w } else { 1.0 };

    let wa = bary.x * inv(w1);
    let wb = bary.y * inv(w2);
    let wc = bary.z * inv(w3);

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    let inv_sum = 1.0 / sum;
    Some(Vector3::new(wa * inv_sum, wb * inv_sum, wc * inv_sum))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barycentric_at_vertices_and_centroid() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);

        let at_b = barycentric_coordinates(b, a, b, c).unwrap();
        assert!((at_b - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-5);

        let centroid = Point2::new(4.0 / 3.0, 4.0 / 3.0);
        let bary = barycentric_coordinates(centroid, a, b, c).unwrap();
        assert!(is_inside_triangle(bary));
        assert!((bary.x - 1.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_triangle_has_no_coordinates() {
        let p = Point2::new(1.0, 1.0);
        let a = Point2::new(0.0, 0.0);
        assert!(barycentric_coordinates(p, a, Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn test_perspective_correction_favours_near_vertex() {
        let bary = Vector3::new(0.5, 0.5, 0.0);
        let corrected = perspective_correct_barycentric(bary, 1.0, 4.0, 1.0).unwrap();
        assert!(corrected.x > corrected.y);
        assert!((corrected.sum() - 1.0).abs() < 1e-5);
    }
}
