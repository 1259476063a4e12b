//! Command buffer recording for the forward pass.
//!
//! One primary command buffer is recorded per swapchain image with
//! SIMULTANEOUS_USE, so the same buffer can be resubmitted while a prior
//! submission is still in flight. Buffers are re-recorded only when the
//! drawables, pipeline, or swapchain change, never per frame.

use tracing::debug;

use vkr_rhi::command::CommandBuffer;
use vkr_rhi::pipeline::{Pipeline, PipelineLayout};
use vkr_rhi::vk;

use crate::drawable::DrawableGpu;
use crate::error::{RenderError, RenderResult};
use crate::render_graph::RenderGraph;

/// Clear color for the color attachment (dark gray).
pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// Clear value for the depth attachment (far plane).
pub const CLEAR_DEPTH: f32 = 1.0;

/// Clear value for the stencil attachment.
pub const CLEAR_STENCIL: u32 = 0;

/// Static draw parameters applied to every drawable.
#[derive(Clone, Copy, Debug)]
pub struct DrawConfig {
    /// Value of `firstInstance` passed to every indexed draw. The vertex
    /// shader sees it as `gl_InstanceIndex`.
    pub first_instance: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self { first_instance: 0 }
    }
}

/// Records the forward pass into every command buffer.
///
/// `buffers[i]` targets framebuffer i; the caller must supply exactly one
/// buffer per swapchain image.
///
/// # Errors
///
/// Returns [`RenderError::InvalidState`] when the buffer count does not
/// match the framebuffer count, and [`RenderError::Runtime`] when
/// recording itself fails.
pub fn record_commands(
    buffers: &[CommandBuffer],
    graph: &RenderGraph,
    pipeline: &Pipeline,
    pipeline_layout: &PipelineLayout,
    drawables: &[DrawableGpu],
    config: &DrawConfig,
) -> RenderResult<()> {
    if buffers.len() != graph.framebuffer_count() {
        return Err(RenderError::InvalidState(format!(
            "{} command buffers for {} framebuffers",
            buffers.len(),
            graph.framebuffer_count()
        )));
    }

    let extent = graph.extent();

    let clear_values = [
        vk::ClearValue {
            color: vk::ClearColorValue {
                float32: CLEAR_COLOR,
            },
        },
        vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: CLEAR_DEPTH,
                stencil: CLEAR_STENCIL,
            },
        },
    ];

    let render_area = vk::Rect2D {
        offset: vk::Offset2D { x: 0, y: 0 },
        extent,
    };

    let viewport = vk::Viewport {
        x: 0.0,
        y: 0.0,
        width: extent.width as f32,
        height: extent.height as f32,
        min_depth: 0.0,
        max_depth: 1.0,
    };

    for (i, cmd) in buffers.iter().enumerate() {
        cmd.begin_simultaneous().map_err(RenderError::Runtime)?;

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(graph.render_pass().handle())
            .framebuffer(graph.framebuffer(i).handle())
            .render_area(render_area)
            .clear_values(&clear_values);

        cmd.begin_render_pass(&begin_info);
        cmd.set_viewport(&viewport);
        cmd.set_scissor(&render_area);

        for drawable in drawables {
            cmd.bind_descriptor_sets(
                vk::PipelineBindPoint::GRAPHICS,
                pipeline_layout.handle(),
                0,
                &[drawable.descriptor_set()],
                &[],
            );
            cmd.bind_pipeline(vk::PipelineBindPoint::GRAPHICS, pipeline.handle());
            cmd.bind_vertex_buffers(0, &[drawable.vertex_buffer()], &[0]);
            cmd.bind_index_buffer(drawable.index_buffer(), 0, vk::IndexType::UINT32);
            cmd.draw_indexed(drawable.index_count(), 1, 0, 0, config.first_instance);
        }

        cmd.end_render_pass();
        cmd.end().map_err(RenderError::Runtime)?;
    }

    debug!(
        "Recorded {} command buffer(s), {} drawable(s) each",
        buffers.len(),
        drawables.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_config_default_first_instance_is_zero() {
        assert_eq!(DrawConfig::default().first_instance, 0);
    }

    #[test]
    fn test_clear_values() {
        assert_eq!(CLEAR_COLOR, [0.1, 0.1, 0.1, 1.0]);
        assert_eq!(CLEAR_DEPTH, 1.0);
        assert_eq!(CLEAR_STENCIL, 0);
    }
}
