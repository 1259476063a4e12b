//! Frame synchronization primitives.
//!
//! The renderer uses exactly one semaphore pair for the whole frame loop:
//! `image_available` links acquire to submit, `render_finished` links
//! submit to present. The pair is shared across all frames and all
//! swapchain images rather than replicated per image, and there is no CPU
//! fence in the frame path.
//!
//! # Hazard
//!
//! With a single shared pair, submitting frame N+1 while frame N is still
//! in flight reuses a semaphore that may not have been waited on yet.
//! The renderer relies on the device-level waits performed on resize and
//! destroy, and on the present engine throttling acquisition, to keep the
//! pair from being re-signaled while pending. Validation layers flag this
//! under heavy pipelining; it is a known limitation of the design.
//!
//! A specific case to be aware of: when acquire succeeds but the frame is
//! then abandoned (a suboptimal swapchain is reported as a failed frame),
//! `image_available` has already been signaled and no submit ever waits on
//! it. The device-idle wait in the resize path does not unsignal an
//! unwaited binary semaphore, so the next acquire hands the driver a
//! semaphore that is still signaled. The swapchain rebuild on resize
//! recreates command state but deliberately keeps the semaphore pair, so
//! this leftover signal survives until the next frame consumes it.

use std::sync::Arc;

use tracing::debug;

use vkr_rhi::device::Device;
use vkr_rhi::sync::Semaphore;
use vkr_rhi::{RhiResult, vk};

/// The semaphore pair driving the frame loop.
pub struct RenderSync {
    image_available: Semaphore,
    render_finished: Semaphore,
}

impl RenderSync {
    /// Creates both semaphores.
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let image_available = Semaphore::new(device.clone())?;
        let render_finished = Semaphore::new(device)?;

        debug!("Created frame synchronization semaphores");

        Ok(Self {
            image_available,
            render_finished,
        })
    }

    /// Semaphore signaled when a swapchain image becomes available.
    #[inline]
    pub fn image_available(&self) -> vk::Semaphore {
        self.image_available.handle()
    }

    /// Semaphore signaled when rendering of the current frame completes.
    #[inline]
    pub fn render_finished(&self) -> vk::Semaphore {
        self.render_finished.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_sync_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<RenderSync>();
    }
}
