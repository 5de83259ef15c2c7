use image::{DynamicImage, RgbaImage};
use log::{debug, info};
use nalgebra::Vector4;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Number of texture units the scene can bind at once.
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// A decoded 2D texture, stored bottom row first so that v = 0 samples the
/// bottom of the source image.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (3 or 4).
    pub channels: u8,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref)
            .map_err(|e| format!("Could not load image '{}': {}", path_ref.display(), e))?;
        Self::from_image(img)
    }

    /// Accepts RGB and RGBA images only.
    pub fn from_image(img: DynamicImage) -> Result<Self, String> {
        let channels = img.color().channel_count();
        if channels != 3 && channels != 4 {
            return Err(format!(
                "Not implemented to handle image with {} channels",
                channels
            ));
        }

        let image = img.flipv().to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err("Image has no pixels".to_string());
        }

        Ok(Self {
            width,
            height,
            channels,
            image,
        })
    }

    /// Bilinear sample with repeat wrapping. Returns RGBA in [0, 1].
    pub fn sample(&self, u: f32, v: f32) -> Vector4<f32> {
        let u = u - u.floor();
        let v = v - v.floor();

        // Texel centers sit at +0.5.
        let x = u * self.width as f32 - 0.5;
        let y = v * self.height as f32 - 0.5;

        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.texel_wrapped(x0, y0);
        let c10 = self.texel_wrapped(x0 + 1, y0);
        let c01 = self.texel_wrapped(x0, y0 + 1);
        let c11 = self.texel_wrapped(x0 + 1, y0 + 1);

        let near_row = c00 * (1.0 - wx) + c10 * wx;
        let far_row = c01 * (1.0 - wx) + c11 * wx;
        near_row * (1.0 - wy) + far_row * wy
    }

    fn texel_wrapped(&self, x: i32, y: i32) -> Vector4<f32> {
        let x = x.rem_euclid(self.width as i32) as u32;
        let y = y.rem_euclid(self.height as i32) as u32;
        let p = self.image.get_pixel(x, y).0;
        Vector4::new(p[0], p[1], p[2], p[3]).map(|c| c as f32 / 255.0)
    }
}

/// Opaque handle handed out by the registry. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct TextureSlot {
    pub tag: String,
    pub id: TextureId,
    pub texture: Arc<Texture>,
}

/// Fixed-capacity table of tagged textures. Slot order is load order, and
/// lookups scan linearly so the first texture registered under a tag wins.
#[derive(Debug)]
pub struct TextureRegistry {
    slots: Vec<TextureSlot>,
    next_id: u32,
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(MAX_TEXTURE_SLOTS),
            next_id: 1,
        }
    }

    /// Loads an image file and registers it under `tag` in the next free slot.
    pub fn create_texture<P: AsRef<Path>>(&mut self, path: P, tag: &str) -> Result<TextureId, String> {
        let path = path.as_ref();
        if self.is_full() {
            return Err(format!(
                "Cannot load '{}': all {} texture slots are in use",
                path.display(),
                MAX_TEXTURE_SLOTS
            ));
        }

        let texture = Texture::load(path)?;
        info!(
            "Successfully loaded image: {}, width: {}, height: {}, channels: {}",
            path.display(),
            texture.width,
            texture.height,
            texture.channels
        );
        self.register(tag, texture)
    }

    /// Registers an already decoded texture.
    pub fn register(&mut self, tag: &str, texture: Texture) -> Result<TextureId, String> {
        if self.is_full() {
            return Err(format!(
                "Cannot register '{}': all {} texture slots are in use",
                tag, MAX_TEXTURE_SLOTS
            ));
        }

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.slots.push(TextureSlot {
            tag: tag.to_string(),
            id,
            texture: Arc::new(texture),
        });
        Ok(id)
    }

    pub fn find_texture_id(&self, tag: &str) -> Option<TextureId> {
        self.slots.iter().find(|slot| slot.tag == tag).map(|slot| slot.id)
    }

    pub fn find_texture_slot(&self, tag: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.tag == tag)
    }

    pub fn texture_in_slot(&self, slot: usize) -> Option<&Arc<Texture>> {
        self.slots.get(slot).map(|s| &s.texture)
    }

    /// Slot → id pairs for every loaded texture, in unit order.
    pub fn bind_textures(&self) -> Vec<(usize, TextureId)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(unit, slot)| {
                debug!("Texture unit {} <- '{}' ({})", unit, slot.tag, slot.id);
                (unit, slot.id)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_TEXTURE_SLOTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba};

    fn checker() -> Texture {
        // Source row 0 (top) is red, row 1 (bottom) is blue.
        let img = RgbImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        Texture::from_image(DynamicImage::ImageRgb8(img)).unwrap()
    }

    fn solid(color: [u8; 4]) -> Texture {
        Texture::from_image(DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba(color))))
            .unwrap()
    }

    #[test]
    fn test_v_zero_samples_bottom_of_image() {
        let tex = checker();
        let bottom = tex.sample(0.25, 0.25);
        let top = tex.sample(0.25, 0.75);
        assert!((bottom - Vector4::new(0.0, 0.0, 1.0, 1.0)).norm() < 1e-5);
        assert!((top - Vector4::new(1.0, 0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_sampling_repeats_outside_unit_range() {
        let tex = checker();
        let inside = tex.sample(0.25, 0.25);
        assert!((tex.sample(1.25, 2.25) - inside).norm() < 1e-5);
        assert!((tex.sample(-0.75, -0.75) - inside).norm() < 1e-5);
    }

    #[test]
    fn test_rgba_alpha_is_preserved() {
        let tex = solid([255, 255, 255, 128]);
        assert_eq!(tex.channels, 4);
        assert!((tex.sample(0.5, 0.5).w - 128.0 / 255.0).abs() < 1e-5);
    }

    #[test]
    fn test_two_channel_images_are_rejected() {
        let img = GrayAlphaImage::from_pixel(2, 2, LumaA([10, 255]));
        let err = Texture::from_image(DynamicImage::ImageLumaA8(img)).unwrap_err();
        assert!(err.contains("2 channels"));
    }

    #[test]
    fn test_registry_lookup_by_tag() {
        let mut registry = TextureRegistry::new();
        let wood = registry.register("wood", solid([1, 2, 3, 255])).unwrap();
        let metal = registry.register("metal", solid([4, 5, 6, 255])).unwrap();

        assert_ne!(wood, metal);
        assert_eq!(registry.find_texture_id("metal"), Some(metal));
        assert_eq!(registry.find_texture_slot("wood"), Some(0));
        assert_eq!(registry.find_texture_slot("metal"), Some(1));
        assert_eq!(registry.find_texture_slot("glass"), None);
        assert_eq!(registry.find_texture_id("glass"), None);
    }

    #[test]
    fn test_duplicate_tag_resolves_to_first_slot() {
        let mut registry = TextureRegistry::new();
        let first = registry.register("pages", solid([0, 0, 0, 255])).unwrap();
        registry.register("pages", solid([255, 255, 255, 255])).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_texture_id("pages"), Some(first));
        assert_eq!(registry.find_texture_slot("pages"), Some(0));
    }

    #[test]
    fn test_registry_refuses_a_seventeenth_texture() {
        let mut registry = TextureRegistry::new();
        for i in 0..MAX_TEXTURE_SLOTS {
            registry.register(&format!("t{i}"), solid([0, 0, 0, 255])).unwrap();
        }
        assert!(registry.is_full());
        assert!(registry.register("overflow", solid([0, 0, 0, 255])).is_err());
        assert_eq!(registry.len(), MAX_TEXTURE_SLOTS);
    }

    #[test]
    fn test_create_texture_reports_missing_file() {
        let mut registry = TextureRegistry::new();
        let err = registry.create_texture("no/such/knit.jpg", "fabric").unwrap_err();
        assert!(err.contains("knit.jpg"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_texture_from_disk() {
        let path = std::env::temp_dir().join(format!("potion_scene_tex_{}.png", std::process::id()));
        RgbImage::from_pixel(4, 2, Rgb([10, 20, 30])).save(&path).unwrap();

        let mut registry = TextureRegistry::new();
        let id = registry.create_texture(&path, "wood").unwrap();
        let tex = registry.texture_in_slot(0).unwrap();
        assert_eq!((tex.width, tex.height, tex.channels), (4, 2, 3));
        assert_eq!(registry.bind_textures(), vec![(0, id)]);
        let _ = std::fs::remove_file(&path);
    }
}
