use nalgebra::{Vector3, Vector4};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

const LOCK_STRIPES: usize = 1024;

/// Supersampled color + depth target.
/// Depth is an atomic f32 bit pattern; color writes go through striped locks
/// so a triangle's rows can be shaded in parallel.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,

    /// Guarded by `locks`; see `set_pixel_safe`.
    pub color_buffer: UnsafeCell<Vec<Vector3<f32>>>,
    pub depth_buffer: Vec<AtomicU32>,

    locks: Vec<Mutex<()>>,
}

// Color access is serialized per stripe and depth is atomic.
unsafe impl Sync for FrameBuffer {}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        let inf_bits = f32::INFINITY.to_bits();
        let depth_buffer = (0..size).map(|_| AtomicU32::new(inf_bits)).collect();
        let locks = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color_buffer: UnsafeCell::new(vec![Vector3::zeros(); size]),
            depth_buffer,
            locks,
        }
    }

    /// Resets every sample to `color` and depth to +inf.
    pub fn clear(&mut self, color: Vector3<f32>) {
        self.color_buffer.get_mut().fill(color);
        let inf_bits = f32::INFINITY.to_bits();
        for depth in &self.depth_buffer {
            depth.store(inf_bits, Ordering::Relaxed);
        }
    }

    /// Fills rows with a vertical gradient, `top` at row 0.
    pub fn clear_gradient(&mut self, top: Vector3<f32>, bottom: Vector3<f32>) {
        self.clear(top);
        let rows = self.buffer_height.max(2) - 1;
        let width = self.buffer_width;
        let buffer = self.color_buffer.get_mut();
        for (y, row) in buffer.chunks_mut(width).enumerate() {
            let t = y as f32 / rows as f32;
            row.fill(top * (1.0 - t) + bottom * t);
        }
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.buffer_width && y < self.buffer_height
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.buffer_width + x
    }

    #[inline]
    fn stripe(&self, idx: usize) -> MutexGuard<'_, ()> {
        self.locks[idx % self.locks.len()]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically replaces the stored depth when `new_depth` is closer.
    #[inline]
    pub fn depth_test_and_update(&self, x: usize, y: usize, new_depth: f32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let depth_atomic = &self.depth_buffer[self.index(x, y)];
        let new_bits = new_depth.to_bits();

        let mut current_bits = depth_atomic.load(Ordering::Relaxed);
        loop {
            if new_depth >= f32::from_bits(current_bits) {
                return false;
            }
            match depth_atomic.compare_exchange_weak(
                current_bits,
                new_bits,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated_bits) => current_bits = updated_bits,
            }
        }
    }

    /// Overwrites a sample. Call only after `depth_test_and_update` passed.
    #[inline]
    pub fn set_pixel_safe(&self, x: usize, y: usize, color: Vector3<f32>) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            let _guard = self.stripe(idx);
            // SAFETY: the stripe lock for `idx` is held.
            unsafe {
                let buffer = &mut *self.color_buffer.get();
                buffer[idx] = color;
            }
        }
    }

    /// `src.rgb * src.a + dst * (1 - src.a)`.
    #[inline]
    pub fn blend_pixel_safe(&self, x: usize, y: usize, color: Vector4<f32>) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            let alpha = color.w.clamp(0.0, 1.0);
            let _guard = self.stripe(idx);
            // SAFETY: the stripe lock for `idx` is held.
            unsafe {
                let buffer = &mut *self.color_buffer.get();
                buffer[idx] = color.xyz() * alpha + buffer[idx] * (1.0 - alpha);
            }
        }
    }

    /// Resolved pixel: the average of its samples. Read after rendering.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let buffer = unsafe { &*self.color_buffer.get() };

        if self.sample_count == 1 {
            return Some(buffer[self.index(x, y)]);
        }

        let start_x = x * self.sample_count;
        let start_y = y * self.sample_count;
        let mut sum_color = Vector3::zeros();
        for dy in 0..self.sample_count {
            for dx in 0..self.sample_count {
                sum_color += buffer[self.index(start_x + dx, start_y + dy)];
            }
        }

        Some(sum_color / (self.sample_count * self.sample_count) as f32)
    }

    /// Depth of a single sample (buffer coordinates).
    #[cfg(test)]
    pub fn sample_depth(&self, x: usize, y: usize) -> Option<f32> {
        self.in_bounds(x, y)
            .then(|| f32::from_bits(self.depth_buffer[self.index(x, y)].load(Ordering::Relaxed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_test_keeps_nearest() {
        let fb = FrameBuffer::new(2, 2, 1);
        assert!(fb.depth_test_and_update(0, 0, 0.5));
        assert!(!fb.depth_test_and_update(0, 0, 0.7));
        assert!(fb.depth_test_and_update(0, 0, 0.2));
        assert_eq!(fb.sample_depth(0, 0), Some(0.2));
        assert!(!fb.depth_test_and_update(5, 0, 0.1));
    }

    #[test]
    fn test_blend_mixes_with_destination() {
        let mut fb = FrameBuffer::new(1, 1, 1);
        fb.clear(Vector3::new(0.0, 0.0, 1.0));
        fb.blend_pixel_safe(0, 0, Vector4::new(1.0, 0.0, 0.0, 0.25));
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c - Vector3::new(0.25, 0.0, 0.75)).norm() < 1e-6);
    }

    #[test]
    fn test_supersampled_pixel_is_averaged() {
        let fb = FrameBuffer::new(1, 1, 2);
        fb.set_pixel_safe(0, 0, Vector3::new(1.0, 1.0, 1.0));
        let c = fb.get_pixel(0, 0).unwrap();
        assert!((c.x - 0.25).abs() < 1e-6);
        assert!(fb.get_pixel(1, 0).is_none());
    }

    #[test]
    fn test_set_pixel_overwrites_only_its_sample() {
        let mut fb = FrameBuffer::new(2, 1, 1);
        fb.clear(Vector3::new(0.0, 0.0, 1.0));
        fb.set_pixel_safe(1, 0, Vector3::new(1.0, 0.5, 0.0));
        fb.set_pixel_safe(2, 0, Vector3::repeat(1.0));
        assert_eq!(fb.get_pixel(0, 0).unwrap(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(fb.get_pixel(1, 0).unwrap(), Vector3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_clear_resets_depth() {
        let mut fb = FrameBuffer::new(1, 1, 1);
        fb.depth_test_and_update(0, 0, 0.3);
        fb.clear(Vector3::zeros());
        assert_eq!(fb.sample_depth(0, 0), Some(f32::INFINITY));
    }

    #[test]
    fn test_gradient_runs_top_to_bottom() {
        let mut fb = FrameBuffer::new(1, 3, 1);
        fb.clear_gradient(Vector3::repeat(1.0), Vector3::zeros());
        assert_eq!(fb.get_pixel(0, 0).unwrap(), Vector3::repeat(1.0));
        assert_eq!(fb.get_pixel(0, 2).unwrap(), Vector3::zeros());
    }
}
