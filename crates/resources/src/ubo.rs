//! Uniform buffer structures for shader data.
//!
//! All structures use `#[repr(C)]` for a stable memory layout and implement
//! `bytemuck::Pod`/`Zeroable` so they can be written into mapped buffers as
//! raw bytes.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Per-drawable matrix block bound at descriptor binding 0 (vertex stage).
///
/// # Memory Layout (std140)
///
/// | Offset | Size | Field |
/// |--------|------|-------|
/// | 0      | 64   | model |
/// | 64     | 64   | view |
/// | 128    | 64   | projection |
///
/// Total size: 192 bytes. `Mat4` is naturally 16-byte aligned, so no
/// padding is required.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Matrices {
    /// Model matrix (object space to world space).
    pub model: Mat4,
    /// View matrix (world space to camera space).
    pub view: Mat4,
    /// Projection matrix (camera space to clip space).
    pub projection: Mat4,
}

impl Matrices {
    /// Size of the structure in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }

    /// Returns the structure as a byte slice for buffer upload.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_matrices_size() {
        assert_eq!(size_of::<Matrices>(), 192);
        assert_eq!(Matrices::SIZE, 192);
    }

    #[test]
    fn test_matrices_field_offsets() {
        assert_eq!(offset_of!(Matrices, model), 0);
        assert_eq!(offset_of!(Matrices, view), 64);
        assert_eq!(offset_of!(Matrices, projection), 128);
    }

    #[test]
    fn test_matrices_alignment() {
        assert_eq!(align_of::<Matrices>(), 16);
    }

    #[test]
    fn test_as_bytes_length() {
        let m = Matrices::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(m.as_bytes().len(), 192);
    }
}
