//! Light definitions for the scene.
//!
//! The light is carried on the scene for forward compatibility; the current
//! shading path does not consume it.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// A directional light (sun-like).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLight {
    /// Light direction (normalized)
    pub direction: Vec3,
    /// Light intensity
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            intensity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_light_layout() {
        // vec3 + f32 packs to 16 bytes with no padding.
        assert_eq!(std::mem::size_of::<DirectionalLight>(), 16);
    }

    #[test]
    fn test_default_points_down() {
        let light = DirectionalLight::default();
        assert_eq!(light.direction, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(light.intensity, 1.0);
    }
}
