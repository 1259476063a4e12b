//! CPU-side assets consumed by the renderer:
//! - Mesh data (vertices and indices)
//! - Texture pixel decoding
//! - Uniform buffer structures

mod error;
pub mod mesh;
pub mod texture_data;
pub mod ubo;

pub use error::{ResourceError, ResourceResult};
pub use mesh::Mesh;
pub use texture_data::TextureData;
pub use ubo::Matrices;
