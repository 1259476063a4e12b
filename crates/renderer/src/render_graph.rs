//! Render targets for the forward pass.
//!
//! The graph ties the swapchain to the render pass: one framebuffer per
//! swapchain image view, each pairing that view with the shared depth
//! buffer. It is rebuilt from scratch whenever the swapchain is.

use std::sync::Arc;

use tracing::debug;

use vkr_rhi::device::Device;
use vkr_rhi::render_pass::{Framebuffer, RenderPass};
use vkr_rhi::swapchain::Swapchain;
use vkr_rhi::{RhiResult, vk};

use crate::depth_buffer::{DEFAULT_DEPTH_FORMAT, DepthBuffer};

/// Render pass, depth buffer, and per-image framebuffers.
pub struct RenderGraph {
    // Field order is drop order: framebuffers reference the pass and the
    // depth view, so they go first.
    framebuffers: Vec<Framebuffer>,
    render_pass: RenderPass,
    depth_buffer: DepthBuffer,
}

impl RenderGraph {
    /// Builds depth buffer, render pass, and one framebuffer per
    /// swapchain image at the swapchain's current extent.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three build steps fails; nothing
    /// partially built is retained.
    pub fn new(device: Arc<Device>, swapchain: &Swapchain) -> RhiResult<Self> {
        let extent = swapchain.extent();

        let depth_buffer =
            DepthBuffer::with_default_format(device.clone(), extent.width, extent.height)?;

        let render_pass = RenderPass::new(device.clone(), swapchain.format(), DEFAULT_DEPTH_FORMAT)?;

        let mut framebuffers = Vec::with_capacity(swapchain.image_count() as usize);
        for view in swapchain.image_views() {
            let attachments = [*view, depth_buffer.image_view()];
            framebuffers.push(Framebuffer::new(
                device.clone(),
                &render_pass,
                &attachments,
                extent,
            )?);
        }

        debug!(
            "Render graph built: {} framebuffers at {}x{}",
            framebuffers.len(),
            extent.width,
            extent.height
        );

        Ok(Self {
            framebuffers,
            render_pass,
            depth_buffer,
        })
    }

    /// Returns the render pass.
    #[inline]
    pub fn render_pass(&self) -> &RenderPass {
        &self.render_pass
    }

    /// Returns the framebuffer for the given swapchain image index.
    #[inline]
    pub fn framebuffer(&self, index: usize) -> &Framebuffer {
        &self.framebuffers[index]
    }

    /// Returns the number of framebuffers (one per swapchain image).
    #[inline]
    pub fn framebuffer_count(&self) -> usize {
        self.framebuffers.len()
    }

    /// Returns the shared depth buffer.
    #[inline]
    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth_buffer
    }

    /// Returns the extent the framebuffers were built at.
    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.depth_buffer.extent()
    }
}
