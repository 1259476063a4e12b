//! Mesh data consumed by the drawable factory.

use glam::{Vec2, Vec3};

use crate::{ResourceError, ResourceResult};

/// A triangle mesh: interleaved vertex attributes plus a u32 index list.
///
/// The vertex layout is fixed: position (vec3), normal (vec3),
/// texture coordinate (vec2) — 32 bytes per vertex.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Checks the mesh is renderable: non-empty, attribute counts agree,
    /// indices form whole triangles and stay in range.
    pub fn validate(&self) -> ResourceResult<()> {
        if self.positions.is_empty() {
            return Err(ResourceError::InvalidMesh("no vertices".to_string()));
        }
        if self.normals.len() != self.positions.len()
            || self.tex_coords.len() != self.positions.len()
        {
            return Err(ResourceError::InvalidMesh(format!(
                "attribute count mismatch: {} positions, {} normals, {} tex coords",
                self.positions.len(),
                self.normals.len(),
                self.tex_coords.len()
            )));
        }
        if self.indices.is_empty() || !self.indices.len().is_multiple_of(3) {
            return Err(ResourceError::InvalidMesh(format!(
                "index count {} is not a positive multiple of 3",
                self.indices.len()
            )));
        }
        let max = self.positions.len() as u32;
        if let Some(&bad) = self.indices.iter().find(|&&i| i >= max) {
            return Err(ResourceError::InvalidMesh(format!(
                "index {} out of range (vertex count {})",
                bad, max
            )));
        }
        Ok(())
    }

    /// Number of indices, i.e. the count passed to an indexed draw.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// A unit quad in the XY plane, facing +Z. Handy for tests and demos.
    pub fn quad() -> Self {
        Self {
            positions: vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            tex_coords: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_is_valid() {
        let quad = Mesh::quad();
        quad.validate().unwrap();
        assert_eq!(quad.index_count(), 6);
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let mesh = Mesh::default();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_attribute_mismatch_rejected() {
        let mut mesh = Mesh::quad();
        mesh.normals.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let mut mesh = Mesh::quad();
        mesh.indices[0] = 99;
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_partial_triangle_rejected() {
        let mut mesh = Mesh::quad();
        mesh.indices.pop();
        assert!(mesh.validate().is_err());
    }
}
