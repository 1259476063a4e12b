//! GPU resources for scene drawables.
//!
//! Each scene drawable becomes a [`DrawableGpu`]: device-local vertex and
//! index buffers (uploaded through a staging copy), a host-coherent
//! uniform buffer for its matrices, a sampled texture, and one descriptor
//! set binding the uniform buffer (binding 0, vertex stage) and the
//! combined image sampler (binding 1, fragment stage).
//!
//! Creation is all-or-nothing: the first failure aborts the whole scene
//! setup and already-built drawables are released through their `Drop`
//! impls. Drawables are independent of the swapchain and survive resizes.

use std::sync::Arc;

use glam::Mat4;
use tracing::{debug, info};

use vkr_resources::{Matrices, Mesh, TextureData};
use vkr_rhi::buffer::{Buffer, BufferUsage};
use vkr_rhi::command::CommandPool;
use vkr_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, buffer_info, update_descriptor_sets,
};
use vkr_rhi::device::Device;
use vkr_rhi::texture::Texture;
use vkr_rhi::vertex::MeshVertex;
use vkr_rhi::vk;
use vkr_scene::Scene;

use crate::error::{RenderError, RenderResult};

/// GPU-side resources for one drawable.
pub struct DrawableGpu {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    uniform_buffer: Buffer,
    texture: Texture,
    descriptor_set: vk::DescriptorSet,
    index_count: u32,
    world_transform: Mat4,
}

impl DrawableGpu {
    /// Returns the vertex buffer handle.
    #[inline]
    pub fn vertex_buffer(&self) -> vk::Buffer {
        self.vertex_buffer.handle()
    }

    /// Returns the index buffer handle.
    #[inline]
    pub fn index_buffer(&self) -> vk::Buffer {
        self.index_buffer.handle()
    }

    /// Returns the descriptor set for this drawable.
    #[inline]
    pub fn descriptor_set(&self) -> vk::DescriptorSet {
        self.descriptor_set
    }

    /// Returns the number of indices to draw.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Returns the fixed world transform of this drawable.
    #[inline]
    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    /// Returns the sampled texture.
    #[inline]
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Writes the per-frame matrices into the mapped uniform buffer.
    ///
    /// The buffer is host-coherent, so the write is visible to the GPU
    /// without an explicit flush.
    pub fn update_matrices(&self, matrices: &Matrices) -> RenderResult<()> {
        self.uniform_buffer
            .write_data(0, matrices.as_bytes())
            .map_err(RenderError::Runtime)
    }
}

/// All drawable GPU state for a scene, plus the descriptor machinery
/// shared by every drawable.
pub struct DrawableSet {
    // Declaration order doubles as drop order: sets (pool-owned) go with
    // the pool, the layout outlives nothing that references it at drop.
    drawables: Vec<DrawableGpu>,
    descriptor_pool: DescriptorPool,
    descriptor_layout: DescriptorSetLayout,
}

impl DrawableSet {
    /// Builds GPU resources for every drawable in the scene.
    ///
    /// Drawables are processed in scene order; the descriptor set at
    /// index i belongs to `scene.drawables[i]`.
    ///
    /// # Errors
    ///
    /// Returns an error on the first mesh validation, texture decoding,
    /// or Vulkan failure. Nothing partially built is retained.
    pub fn create_all(
        device: Arc<Device>,
        transfer_pool: &CommandPool,
        scene: &Scene,
        generate_mipmaps: bool,
    ) -> RenderResult<Self> {
        let count = scene.drawable_count() as u32;
        if count == 0 {
            return Err(RenderError::InvalidState(
                "scene contains no drawables".to_string(),
            ));
        }

        let descriptor_layout =
            DescriptorSetLayout::for_drawable(device.clone()).map_err(RenderError::Setup)?;
        let descriptor_pool =
            DescriptorPool::for_drawables(device.clone(), count).map_err(RenderError::Setup)?;

        let layouts: Vec<_> = (0..count).map(|_| descriptor_layout.handle()).collect();
        let descriptor_sets = descriptor_pool
            .allocate(&layouts)
            .map_err(RenderError::Setup)?;

        let mut drawables = Vec::with_capacity(scene.drawable_count());

        for (i, drawable) in scene.drawables.iter().enumerate() {
            drawable.mesh.validate()?;

            let vertices = interleave_vertices(&drawable.mesh);
            let vertex_buffer = Buffer::new_device_local_with_data(
                device.clone(),
                BufferUsage::Vertex,
                bytemuck::cast_slice(&vertices),
                transfer_pool,
            )
            .map_err(RenderError::Setup)?;

            let index_buffer = Buffer::new_device_local_with_data(
                device.clone(),
                BufferUsage::Index,
                bytemuck::cast_slice(&drawable.mesh.indices),
                transfer_pool,
            )
            .map_err(RenderError::Setup)?;

            let uniform_buffer = Buffer::new(device.clone(), BufferUsage::Uniform, Matrices::SIZE)
                .map_err(RenderError::Setup)?;

            let pixels = TextureData::load(&drawable.texture_path)?;
            let texture = Texture::from_rgba8(
                device.clone(),
                transfer_pool,
                &pixels.pixels,
                pixels.width,
                pixels.height,
                generate_mipmaps,
            )
            .map_err(RenderError::Setup)?;

            let descriptor_set = descriptor_sets[i];
            write_drawable_descriptors(&device, descriptor_set, &uniform_buffer, &texture);

            debug!(
                "Drawable {}: {} vertices, {} indices, texture {}x{} ({} mips)",
                i,
                vertices.len(),
                drawable.mesh.indices.len(),
                pixels.width,
                pixels.height,
                texture.mip_levels()
            );

            drawables.push(DrawableGpu {
                vertex_buffer,
                index_buffer,
                uniform_buffer,
                texture,
                descriptor_set,
                index_count: drawable.mesh.index_count(),
                world_transform: drawable.world_transform,
            });
        }

        info!("Created GPU resources for {} drawable(s)", drawables.len());

        Ok(Self {
            drawables,
            descriptor_pool,
            descriptor_layout,
        })
    }

    /// Returns the drawables in scene order.
    #[inline]
    pub fn drawables(&self) -> &[DrawableGpu] {
        &self.drawables
    }

    /// Returns the shared descriptor set layout.
    #[inline]
    pub fn descriptor_layout(&self) -> &DescriptorSetLayout {
        &self.descriptor_layout
    }

    /// Returns the descriptor pool backing the drawable sets.
    #[inline]
    pub fn descriptor_pool(&self) -> &DescriptorPool {
        &self.descriptor_pool
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }
}

/// Points a drawable's descriptor set at its uniform buffer and texture.
fn write_drawable_descriptors(
    device: &Device,
    set: vk::DescriptorSet,
    uniform_buffer: &Buffer,
    texture: &Texture,
) {
    let buffer_infos = [buffer_info(uniform_buffer.handle(), 0, Matrices::SIZE)];
    let image_infos = [texture.descriptor_info()];

    let writes = [
        vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(0)
            .dst_array_element(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .buffer_info(&buffer_infos),
        vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(1)
            .dst_array_element(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_infos),
    ];

    update_descriptor_sets(device, &writes);
}

/// Interleaves a mesh's attribute arrays into the GPU vertex layout.
///
/// The mesh must already be validated; attribute arrays are assumed to
/// have equal length.
pub(crate) fn interleave_vertices(mesh: &Mesh) -> Vec<MeshVertex> {
    (0..mesh.positions.len())
        .map(|i| MeshVertex {
            position: mesh.positions[i],
            normal: mesh.normals[i],
            tex_coord: mesh.tex_coords[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn test_interleave_preserves_order_and_attributes() {
        let mesh = Mesh {
            positions: vec![Vec3::X, Vec3::Y, Vec3::Z],
            normals: vec![Vec3::Z, Vec3::Z, Vec3::Z],
            tex_coords: vec![Vec2::ZERO, Vec2::X, Vec2::ONE],
            indices: vec![0, 1, 2],
        };

        let vertices = interleave_vertices(&mesh);

        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, Vec3::X);
        assert_eq!(vertices[1].position, Vec3::Y);
        assert_eq!(vertices[2].tex_coord, Vec2::ONE);
        assert_eq!(vertices[1].normal, Vec3::Z);
    }

    #[test]
    fn test_interleaved_quad_matches_vertex_stride() {
        let mesh = Mesh::quad();
        let vertices = interleave_vertices(&mesh);
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), vertices.len() * 32);
    }
}
