//! GPU image management.
//!
//! This module wraps VkImage creation with gpu-allocator managed memory and
//! an image view. Swapchain images are not created here; they belong to the
//! swapchain and only get views.

use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::debug;

use crate::device::Device;
use crate::error::RhiResult;

/// GPU image with managed memory and a default view.
///
/// The image lives in device-local memory. The view covers all mip levels
/// with the aspect given at creation.
pub struct Image {
    /// Reference to the logical device.
    device: Arc<Device>,
    /// Vulkan image handle.
    image: vk::Image,
    /// GPU memory allocation.
    allocation: Option<Allocation>,
    /// Image view covering the whole image.
    view: vk::ImageView,
    /// Image format.
    format: vk::Format,
    /// Image extent.
    extent: vk::Extent2D,
    /// Number of mip levels.
    mip_levels: u32,
}

impl Image {
    /// Creates a 2D device-local image with an image view.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `mip_levels` - Number of mip levels to allocate
    /// * `format` - Image format
    /// * `usage` - Image usage flags
    /// * `aspect` - Aspect covered by the view (color or depth)
    ///
    /// # Errors
    ///
    /// Returns an error if image, memory, or view creation fails.
    pub fn new(
        device: Arc<Device>,
        width: u32,
        height: u32,
        mip_levels: u32,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
        aspect: vk::ImageAspectFlags,
    ) -> RhiResult<Self> {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(mip_levels)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let image = unsafe { device.handle().create_image(&image_info, None)? };

        let requirements = unsafe { device.handle().get_image_memory_requirements(image) };

        let allocation = {
            let mut allocator = device.allocator().lock().unwrap();
            allocator.allocate(&AllocationCreateDesc {
                name: "image",
                requirements,
                location: MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })?
        };

        unsafe {
            device
                .handle()
                .bind_image_memory(image, allocation.memory(), allocation.offset())?;
        }

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(
                vk::ImageSubresourceRange::default()
                    .aspect_mask(aspect)
                    .base_mip_level(0)
                    .level_count(mip_levels)
                    .base_array_layer(0)
                    .layer_count(1),
            );

        let view = unsafe { device.handle().create_image_view(&view_info, None)? };

        debug!(
            "Created image: {}x{}, format {:?}, {} mip level(s)",
            width, height, format, mip_levels
        );

        Ok(Self {
            device,
            image,
            allocation: Some(allocation),
            view,
            format,
            extent: vk::Extent2D { width, height },
            mip_levels,
        })
    }

    /// Returns the Vulkan image handle.
    #[inline]
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Returns the image view handle.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Returns the image format.
    #[inline]
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Returns the image extent.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Returns the number of mip levels.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_image_view(self.view, None);
            self.device.handle().destroy_image(self.image, None);
        }

        if let Some(allocation) = self.allocation.take() {
            let mut allocator = self.device.allocator().lock().unwrap();
            if let Err(e) = allocator.free(allocation) {
                tracing::error!("Failed to free image allocation: {:?}", e);
            }
        }

        debug!("Destroyed image");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Image>();
    }
}
