//! Scene description consumed by the renderer.
//!
//! The renderer never mutates a scene; it reads the drawable list once at
//! setup to build GPU resources and reads the camera and world transforms
//! every frame to refresh uniforms.

pub mod camera;
pub mod light;

use std::path::PathBuf;

use glam::Mat4;

pub use camera::{Camera, Projection};
pub use light::DirectionalLight;
use vkr_resources::Mesh;

/// One renderable object: mesh data, the texture to sample, and a fixed
/// world transform.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub mesh: Mesh,
    pub texture_path: PathBuf,
    pub world_transform: Mat4,
}

/// A scene to render: an ordered list of drawables, a camera, and a light.
///
/// The drawable order is significant — GPU resources and draw commands are
/// built in this order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub name: String,
    pub drawables: Vec<Drawable>,
    pub camera: Camera,
    pub light: DirectionalLight,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn drawable_count(&self) -> usize {
        self.drawables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_preserves_drawable_order() {
        let mut scene = Scene::new("test");
        for i in 0..3 {
            scene.drawables.push(Drawable {
                mesh: Mesh::quad(),
                texture_path: PathBuf::from(format!("tex_{i}.png")),
                world_transform: Mat4::from_translation(glam::Vec3::X * i as f32),
            });
        }
        assert_eq!(scene.drawable_count(), 3);
        for (i, d) in scene.drawables.iter().enumerate() {
            assert_eq!(d.texture_path, PathBuf::from(format!("tex_{i}.png")));
        }
    }
}
