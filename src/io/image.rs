use image::{ImageBuffer, Rgb};
use std::fs;
use std::path::Path;

/// Saves a 0RGB `u32` buffer as an image; the format follows the extension.
pub fn save_buffer_to_image<P: AsRef<Path>>(
    buffer: &[u32],
    width: usize,
    height: usize,
    path: P,
) -> Result<(), String> {
    let path = path.as_ref();
    if buffer.len() != width * height {
        return Err(format!(
            "Buffer holds {} pixels, expected {}x{}",
            buffer.len(),
            width,
            height
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }

    let img_buf = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        let color = buffer[y as usize * width + x as usize];
        Rgb([(color >> 16) as u8, (color >> 8) as u8, color as u8])
    });

    img_buf
        .save(path)
        .map_err(|e| format!("Failed to save image to '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_pixel_channels() {
        let path = std::env::temp_dir().join(format!("potion_scene_io_{}.png", std::process::id()));
        save_buffer_to_image(&[0xFF102030, 0xFFFFFFFF], 2, 1, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [0x10, 0x20, 0x30]);
        assert_eq!(img.get_pixel(1, 0).0, [0xFF, 0xFF, 0xFF]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_mismatched_dimensions() {
        assert!(save_buffer_to_image(&[0; 3], 2, 2, "unused.png").is_err());
    }
}
