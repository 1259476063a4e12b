//! Texture pixel decoding.
//!
//! Images are decoded to tightly packed RGBA8 on the CPU; the GPU upload
//! (staging copy, layout transitions, mipmap blits) lives in the rhi crate.

use std::path::Path;

use tracing::debug;

use crate::{ResourceError, ResourceResult};

/// Decoded RGBA8 pixel data ready for GPU upload.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Loads an image file and converts it to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be decoded.
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();

        debug!("Decoded texture {}: {}x{}", path.display(), width, height);

        Ok(Self {
            width,
            height,
            pixels: img.into_raw(),
        })
    }

    /// Creates texture data from raw RGBA8 pixels.
    ///
    /// Panics in debug builds if the pixel length does not match the
    /// dimensions; release builds truncate nothing and trust the caller.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Size of the pixel data in bytes.
    #[inline]
    pub fn byte_size(&self) -> u64 {
        self.pixels.len() as u64
    }

    /// Number of mip levels a full chain for these dimensions would have.
    pub fn max_mip_levels(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reports_not_found() {
        let err = TextureData::load(Path::new("/nonexistent/tex.png")).unwrap_err();
        assert!(matches!(err, ResourceError::FileNotFound(_)));
    }

    #[test]
    fn test_from_rgba8() {
        let data = TextureData::from_rgba8(2, 2, vec![255u8; 16]);
        assert_eq!(data.byte_size(), 16);
    }

    #[test]
    fn test_max_mip_levels() {
        assert_eq!(TextureData::from_rgba8(1, 1, vec![0; 4]).max_mip_levels(), 1);
        assert_eq!(
            TextureData::from_rgba8(256, 256, vec![0; 256 * 256 * 4]).max_mip_levels(),
            9
        );
        // Non-square: the larger axis decides.
        assert_eq!(
            TextureData::from_rgba8(512, 64, vec![0; 512 * 64 * 4]).max_mip_levels(),
            10
        );
    }
}
