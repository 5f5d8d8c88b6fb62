//! Texture image handles.

use crate::error::Result;
use std::path::Path;

/// Raw texture data decoded from a pack image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create an opaque mid-gray placeholder of `size` x `size` pixels.
    pub fn placeholder(size: u32) -> Self {
        let pixels = [128u8, 128, 128, 255].repeat((size * size) as usize);
        Self::new(size, size, pixels)
    }

    /// Decode an image file into RGBA8.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        load_texture_from_bytes(&data)
    }
}

/// Decode a texture from PNG bytes.
pub fn load_texture_from_bytes(data: &[u8]) -> Result<TextureData> {
    let rgba = image::load_from_memory(data)?.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(TextureData::new(width, height, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        use image::ImageEncoder;

        let mut bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
            .unwrap();
        bytes
    }

    #[test]
    fn test_placeholder_texture() {
        let tex = TextureData::placeholder(16);
        assert_eq!(tex.width, 16);
        assert_eq!(tex.height, 16);
        assert_eq!(tex.pixels.len(), 16 * 16 * 4);
        assert!(tex.pixels.chunks(4).all(|p| p == [128, 128, 128, 255]));
    }

    #[test]
    fn test_decode_png() {
        let rgba = [255, 0, 0, 255, 0, 0, 255, 128];
        let tex = load_texture_from_bytes(&encode_png(1, 2, &rgba)).unwrap();
        assert_eq!(tex, TextureData::new(1, 2, rgba.to_vec()));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(load_texture_from_bytes(b"not a png").is_err());
    }
}
