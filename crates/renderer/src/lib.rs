//! Scene renderer built on the rhi crate.
//!
//! The renderer owns the full GPU lifecycle for a fixed scene: swapchain
//! and render targets, per-drawable resources, a single forward pipeline,
//! pre-recorded command buffers, and the frame loop. State is rebuilt,
//! never patched, on resize.

pub mod depth_buffer;
pub mod drawable;
pub mod error;
pub mod recorder;
pub mod render_graph;
pub mod renderer;
pub mod sync;

pub use error::{RenderError, RenderResult};
pub use recorder::DrawConfig;
pub use renderer::{Renderer, RendererConfig};
