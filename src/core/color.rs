use nalgebra::Vector3;

/// ACES filmic curve (Narkowicz fit), output clamped to [0, 1].
pub fn aces_tone_mapping(color: Vector3<f32>) -> Vector3<f32> {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;

    color.map(|x| ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(0.0, 1.0))
}

/// Gamma 2.2 encode.
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    color.map(|x| x.max(0.0).powf(1.0 / 2.2))
}

/// Packs a [0, 1] color into 0xAARRGGBB with opaque alpha.
pub fn pack_argb(color: Vector3<f32>) -> u32 {
    let to_byte = |x: f32| (x.clamp(0.0, 1.0) * 255.0).round() as u32;
    (255 << 24) | (to_byte(color.x) << 16) | (to_byte(color.y) << 8) | to_byte(color.z)
}
