//! Platform layer: window creation via winit and Vulkan surface setup.

mod window;

pub use window::{Surface, Window};
