//! Depth/stencil buffer for the forward pass.
//!
//! A single depth buffer is shared by every framebuffer; the render pass
//! clears it at the start of each frame, so per-image copies are not
//! needed. It is recreated together with the swapchain whenever the
//! surface extent changes.

use std::sync::Arc;

use tracing::debug;

use vkr_rhi::device::Device;
use vkr_rhi::image::Image;
use vkr_rhi::{RhiError, RhiResult, vk};

/// Default depth/stencil format (32-bit float depth + 8-bit stencil).
pub const DEFAULT_DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT_S8_UINT;

/// GPU-only depth/stencil attachment sized to the swapchain extent.
pub struct DepthBuffer {
    image: Image,
}

impl DepthBuffer {
    /// Creates a depth buffer with the given dimensions and format.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are zero or if image creation,
    /// memory allocation, or view creation fails.
    pub fn new(
        device: Arc<Device>,
        width: u32,
        height: u32,
        format: vk::Format,
    ) -> RhiResult<Self> {
        if width == 0 || height == 0 {
            return Err(RhiError::InvalidHandle(
                "depth buffer dimensions must be greater than 0".to_string(),
            ));
        }

        let image = Image::new(
            device,
            width,
            height,
            1,
            format,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL,
        )?;

        debug!("Created depth buffer: {}x{} ({:?})", width, height, format);

        Ok(Self { image })
    }

    /// Creates a depth buffer with [`DEFAULT_DEPTH_FORMAT`].
    pub fn with_default_format(device: Arc<Device>, width: u32, height: u32) -> RhiResult<Self> {
        Self::new(device, width, height, DEFAULT_DEPTH_FORMAT)
    }

    /// Returns the image view used as the framebuffer depth attachment.
    #[inline]
    pub fn image_view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the depth format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.image.format()
    }

    /// Returns the depth buffer extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.image.extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_has_stencil() {
        assert_eq!(DEFAULT_DEPTH_FORMAT, vk::Format::D32_SFLOAT_S8_UINT);
    }

    #[test]
    fn test_default_format_is_depth_stencil() {
        assert!(matches!(
            DEFAULT_DEPTH_FORMAT,
            vk::Format::D32_SFLOAT_S8_UINT | vk::Format::D24_UNORM_S8_UINT
        ));
    }
}
