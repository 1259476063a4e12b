//! Sampled texture management.
//!
//! A [`Texture`] owns a device-local image, its view, and a sampler.
//! Pixel data is uploaded through a staging buffer; when mipmaps are
//! requested the chain is generated on the GPU with linear blits.

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use crate::buffer::{Buffer, BufferUsage};
use crate::command::CommandPool;
use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::image::Image;
use crate::sampler::Sampler;

/// Layout the texture image is in after upload.
const SAMPLED_LAYOUT: vk::ImageLayout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;

/// A sampled 2D texture: image, view, and sampler.
pub struct Texture {
    image: Image,
    sampler: Sampler,
}

impl Texture {
    /// Creates a texture from tightly-packed RGBA8 pixels.
    ///
    /// Uploads the pixels through a staging buffer using one-time commands
    /// from `transfer_pool`, then either generates a full mip chain with
    /// GPU blits or transitions the single level for sampling. The call
    /// blocks until the upload completes.
    ///
    /// # Arguments
    ///
    /// * `device` - The logical device
    /// * `transfer_pool` - Command pool for upload submissions
    /// * `pixels` - RGBA8 pixel data, `width * height * 4` bytes
    /// * `width` - Texture width in pixels
    /// * `height` - Texture height in pixels
    /// * `generate_mipmaps` - Whether to build the full mip chain
    ///
    /// # Errors
    ///
    /// Returns an error if the pixel slice does not match the dimensions,
    /// or if any Vulkan object creation or submission fails.
    pub fn from_rgba8(
        device: Arc<Device>,
        transfer_pool: &CommandPool,
        pixels: &[u8],
        width: u32,
        height: u32,
        generate_mipmaps: bool,
    ) -> RhiResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RhiError::InvalidHandle(format!(
                "Texture data size mismatch: expected {} bytes for {}x{} RGBA8, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        let mip_levels = if generate_mipmaps {
            32 - width.max(height).leading_zeros()
        } else {
            1
        };

        let staging = Buffer::new_with_data(device.clone(), BufferUsage::Staging, pixels)?;

        let mut usage = vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED;
        if mip_levels > 1 {
            // Each mip level is blitted from the previous one
            usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        }

        let image = Image::new(
            device.clone(),
            width,
            height,
            mip_levels,
            vk::Format::R8G8B8A8_SRGB,
            usage,
            vk::ImageAspectFlags::COLOR,
        )?;

        transfer_pool.submit_one_time(|cmd| {
            // All levels to TRANSFER_DST before the copy
            let to_transfer = barrier(
                image.handle(),
                0,
                mip_levels,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::AccessFlags::empty(),
                vk::AccessFlags::TRANSFER_WRITE,
            );
            cmd.pipeline_barrier(
                vk::PipelineStageFlags::TOP_OF_PIPE,
                vk::PipelineStageFlags::TRANSFER,
                &[to_transfer],
            );

            let region = vk::BufferImageCopy::default()
                .image_subresource(
                    vk::ImageSubresourceLayers::default()
                        .aspect_mask(vk::ImageAspectFlags::COLOR)
                        .mip_level(0)
                        .base_array_layer(0)
                        .layer_count(1),
                )
                .image_extent(vk::Extent3D {
                    width,
                    height,
                    depth: 1,
                });
            cmd.copy_buffer_to_image(
                staging.handle(),
                image.handle(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            if mip_levels > 1 {
                generate_mip_chain(cmd, image.handle(), width, height, mip_levels);
            } else {
                let to_sampled = barrier(
                    image.handle(),
                    0,
                    1,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    SAMPLED_LAYOUT,
                    vk::AccessFlags::TRANSFER_WRITE,
                    vk::AccessFlags::SHADER_READ,
                );
                cmd.pipeline_barrier(
                    vk::PipelineStageFlags::TRANSFER,
                    vk::PipelineStageFlags::FRAGMENT_SHADER,
                    &[to_sampled],
                );
            }
        })?;

        let sampler = Sampler::linear_repeat(device, mip_levels)?;

        info!(
            "Created texture: {}x{}, {} mip level(s)",
            width, height, mip_levels
        );

        Ok(Self { image, sampler })
    }

    /// Returns the image view handle.
    #[inline]
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Returns the sampler handle.
    #[inline]
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler.handle()
    }

    /// Returns the number of mip levels.
    #[inline]
    pub fn mip_levels(&self) -> u32 {
        self.image.mip_levels()
    }

    /// Returns a descriptor image info for a combined image sampler binding.
    pub fn descriptor_info(&self) -> vk::DescriptorImageInfo {
        vk::DescriptorImageInfo::default()
            .sampler(self.sampler.handle())
            .image_view(self.image.view())
            .image_layout(SAMPLED_LAYOUT)
    }
}

/// Builds a single-level image memory barrier.
#[allow(clippy::too_many_arguments)]
fn barrier(
    image: vk::Image,
    base_mip: u32,
    level_count: u32,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    src_access: vk::AccessFlags,
    dst_access: vk::AccessFlags,
) -> vk::ImageMemoryBarrier<'static> {
    vk::ImageMemoryBarrier::default()
        .image(image)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_access_mask(src_access)
        .dst_access_mask(dst_access)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .subresource_range(
            vk::ImageSubresourceRange::default()
                .aspect_mask(vk::ImageAspectFlags::COLOR)
                .base_mip_level(base_mip)
                .level_count(level_count)
                .base_array_layer(0)
                .layer_count(1),
        )
}

/// Records blits that fill levels 1..mip_levels from level 0.
///
/// Every level ends in SHADER_READ_ONLY_OPTIMAL. Level 0 must be in
/// TRANSFER_DST_OPTIMAL when this is recorded.
fn generate_mip_chain(
    cmd: &crate::command::CommandBuffer,
    image: vk::Image,
    width: u32,
    height: u32,
    mip_levels: u32,
) {
    let mut mip_width = width as i32;
    let mut mip_height = height as i32;

    for level in 1..mip_levels {
        // Previous level becomes the blit source
        let src_to_read = barrier(
            image,
            level - 1,
            1,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::TRANSFER_READ,
        );
        cmd.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::TRANSFER,
            &[src_to_read],
        );

        let next_width = (mip_width / 2).max(1);
        let next_height = (mip_height / 2).max(1);

        let blit = vk::ImageBlit::default()
            .src_subresource(
                vk::ImageSubresourceLayers::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(level - 1)
                    .base_array_layer(0)
                    .layer_count(1),
            )
            .src_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: mip_width,
                    y: mip_height,
                    z: 1,
                },
            ])
            .dst_subresource(
                vk::ImageSubresourceLayers::default()
                    .aspect_mask(vk::ImageAspectFlags::COLOR)
                    .mip_level(level)
                    .base_array_layer(0)
                    .layer_count(1),
            )
            .dst_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: next_width,
                    y: next_height,
                    z: 1,
                },
            ]);

        cmd.blit_image(
            image,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            &[blit],
            vk::Filter::LINEAR,
        );

        // Source level is final, hand it to the fragment shader
        let src_to_sampled = barrier(
            image,
            level - 1,
            1,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            SAMPLED_LAYOUT,
            vk::AccessFlags::TRANSFER_READ,
            vk::AccessFlags::SHADER_READ,
        );
        cmd.pipeline_barrier(
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            &[src_to_sampled],
        );

        mip_width = next_width;
        mip_height = next_height;
    }

    // Last level was only written, never blitted from
    let last_to_sampled = barrier(
        image,
        mip_levels - 1,
        1,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        SAMPLED_LAYOUT,
        vk::AccessFlags::TRANSFER_WRITE,
        vk::AccessFlags::SHADER_READ,
    );
    cmd.pipeline_barrier(
        vk::PipelineStageFlags::TRANSFER,
        vk::PipelineStageFlags::FRAGMENT_SHADER,
        &[last_to_sampled],
    );

    debug!("Recorded mip chain generation for {} levels", mip_levels);
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_mip_level_count_formula() {
        // Matches the calculation in from_rgba8
        let levels = |w: u32, h: u32| 32 - w.max(h).leading_zeros();

        assert_eq!(levels(1, 1), 1);
        assert_eq!(levels(2, 2), 2);
        assert_eq!(levels(256, 256), 9);
        assert_eq!(levels(512, 256), 10);
        assert_eq!(levels(1000, 600), 10);
    }
}
