//! Renderer lifecycle and frame loop.
//!
//! [`Renderer::new`] creates the device-level objects (instance, surface,
//! logical device) and stores the scene; [`Renderer::create`] builds all
//! GPU state derived from them. `create`/`destroy` are idempotent, and
//! [`Renderer::resized`] tears down and rebuilds exactly the
//! swapchain-dependent subset. A failed rebuild leaves the renderer
//! invalid until the caller retries.

use std::mem::ManuallyDrop;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use vkr_platform::{Surface, Window};
use vkr_resources::Matrices;
use vkr_rhi::command::{CommandBuffer, CommandPool};
use vkr_rhi::descriptor::DescriptorSetLayout;
use vkr_rhi::device::Device;
use vkr_rhi::instance::Instance;
use vkr_rhi::physical_device::select_physical_device;
use vkr_rhi::pipeline::{CullMode, FrontFace, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use vkr_rhi::shader::{Shader, ShaderStage};
use vkr_rhi::swapchain::{Swapchain, SwapchainConfig};
use vkr_rhi::vertex::MeshVertex;
use vkr_rhi::{RhiError, vk};
use vkr_scene::Scene;

use crate::drawable::DrawableSet;
use crate::error::{RenderError, RenderResult};
use crate::recorder::{DrawConfig, record_commands};
use crate::render_graph::RenderGraph;
use crate::sync::RenderSync;

/// Caller-tunable renderer settings.
#[derive(Clone, Debug)]
pub struct RendererConfig {
    /// Path to the compiled vertex shader.
    pub vertex_shader: PathBuf,
    /// Path to the compiled fragment shader.
    pub fragment_shader: PathBuf,
    /// Swapchain format and present mode preferences.
    pub swapchain: SwapchainConfig,
    /// Static draw parameters.
    pub draw: DrawConfig,
    /// Whether textures get a full mip chain.
    pub generate_mipmaps: bool,
    /// Whether to request validation layers.
    pub enable_validation: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            vertex_shader: PathBuf::from("shaders/spirv/scene.vert.spv"),
            fragment_shader: PathBuf::from("shaders/spirv/scene.frag.spv"),
            swapchain: SwapchainConfig::default(),
            draw: DrawConfig::default(),
            generate_mipmaps: true,
            enable_validation: cfg!(debug_assertions),
        }
    }
}

/// Tracks whether GPU state is live.
///
/// The create/destroy idempotence rules live here, separate from the
/// Vulkan objects, so they can be exercised without a device.
struct Lifecycle<S> {
    state: Option<S>,
}

impl<S> Lifecycle<S> {
    fn new() -> Self {
        Self { state: None }
    }

    /// Reports whether state is live.
    fn is_valid(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the live state, if any.
    fn get(&self) -> Option<&S> {
        self.state.as_ref()
    }

    /// Installs freshly built state. When state is already live the new
    /// value is dropped and `false` is returned; the live state wins.
    fn install(&mut self, state: S) -> bool {
        if self.state.is_some() {
            return false;
        }
        self.state = Some(state);
        true
    }

    /// Takes the live state for teardown. Returns `None` once destroyed,
    /// so a second teardown is a no-op.
    fn take(&mut self) -> Option<S> {
        self.state.take()
    }
}

/// GPU state built by `create()` and torn down by `destroy()`.
///
/// Field order is drop order: everything referencing the swapchain drops
/// before it.
struct GpuState {
    sync: RenderSync,
    command_buffers: Vec<CommandBuffer>,
    command_pool: CommandPool,
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    drawables: DrawableSet,
    graph: RenderGraph,
    swapchain: Swapchain,
}

/// Renders a fixed scene to a window surface.
pub struct Renderer {
    // Manual drop order at the end of life: GPU state, surface, device,
    // instance.
    instance: ManuallyDrop<Instance>,
    device: ManuallyDrop<Arc<Device>>,
    surface: ManuallyDrop<Surface>,

    scene: Scene,
    config: RendererConfig,
    state: Lifecycle<GpuState>,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Creates the device-level objects for the given window and stores
    /// the scene. No swapchain or scene GPU state exists until
    /// [`Renderer::create`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Setup`] if instance, surface, or device
    /// creation fails, or no suitable GPU is found.
    pub fn new(window: &Window, scene: Scene, config: RendererConfig) -> RenderResult<Self> {
        let width = window.width();
        let height = window.height();

        info!(
            "Initializing renderer for scene '{}' ({}x{})",
            scene.name, width, height
        );

        let display_handle = window
            .display_handle()
            .map_err(|e| RenderError::Setup(RhiError::SurfaceError(e.to_string())))?;
        let instance = Instance::new(display_handle.as_raw(), config.enable_validation)
            .map_err(RenderError::Setup)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RenderError::Setup(RhiError::SurfaceError(e.to_string())))?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())
                .map_err(RenderError::Setup)?;

        let device =
            Device::new(&instance, &physical_device_info).map_err(RenderError::Setup)?;

        Ok(Self {
            instance: ManuallyDrop::new(instance),
            device: ManuallyDrop::new(device),
            surface: ManuallyDrop::new(surface),
            scene,
            config,
            state: Lifecycle::new(),
            width,
            height,
        })
    }

    /// Builds all GPU state: swapchain, command pool, drawables, render
    /// graph, pipeline, command buffers, and semaphores, in that order.
    ///
    /// A no-op when the renderer is already valid.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failing step; the renderer stays
    /// invalid and everything built before the failure is released.
    pub fn create(&mut self) -> RenderResult<()> {
        if self.state.is_valid() {
            debug!("create() called on a valid renderer; ignoring");
            return Ok(());
        }

        let device = Arc::clone(&self.device);

        let swapchain = Swapchain::new(
            &self.instance,
            device.clone(),
            self.surface.handle(),
            &self.config.swapchain,
            self.width,
            self.height,
        )
        .map_err(RenderError::Setup)?;

        let command_pool =
            CommandPool::new(device.clone(), self.graphics_family()?).map_err(RenderError::Setup)?;

        let drawables = DrawableSet::create_all(
            device.clone(),
            &command_pool,
            &self.scene,
            self.config.generate_mipmaps,
        )?;

        let graph = RenderGraph::new(device.clone(), &swapchain).map_err(RenderError::Setup)?;

        let (pipeline_layout, pipeline) =
            self.build_pipeline(&graph, drawables.descriptor_layout())?;

        let command_buffers =
            self.allocate_frame_buffers(&command_pool, swapchain.image_count())?;
        record_commands(
            &command_buffers,
            &graph,
            &pipeline,
            &pipeline_layout,
            drawables.drawables(),
            &self.config.draw,
        )?;

        let sync = RenderSync::new(device).map_err(RenderError::Setup)?;

        info!(
            "Renderer created: {} swapchain images, {} drawable(s)",
            swapchain.image_count(),
            drawables.len()
        );

        self.state.install(GpuState {
            sync,
            command_buffers,
            command_pool,
            pipeline,
            pipeline_layout,
            drawables,
            graph,
            swapchain,
        });

        Ok(())
    }

    /// Waits for the device to go idle, then drops all GPU state.
    ///
    /// A no-op when the renderer is already invalid.
    pub fn destroy(&mut self) {
        let Some(state) = self.state.take() else {
            debug!("destroy() called on an invalid renderer; ignoring");
            return;
        };

        if let Err(e) = self.device.wait_idle() {
            error!("Device wait failed during destroy: {e}");
        }
        drop(state);

        info!("Renderer GPU state destroyed");
    }

    /// Reports whether GPU state is live.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    /// Rebuilds the swapchain-dependent GPU state for a new surface
    /// extent. Drawables, descriptor sets, and semaphores are kept.
    ///
    /// Zero extents (minimized window) are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidState`] when called before
    /// `create()`, and [`RenderError::Setup`] when a rebuild step fails —
    /// in that case the renderer is left invalid.
    pub fn resized(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let Some(state) = self.state.take() else {
            return Err(RenderError::InvalidState(
                "resized() called on an invalid renderer".to_string(),
            ));
        };
        if width == 0 || height == 0 {
            debug!("Ignoring resize to zero extent");
            self.state.install(state);
            return Ok(());
        }

        debug!(
            "Resizing: {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        self.width = width;
        self.height = height;

        self.device.wait_idle().map_err(RenderError::Setup)?;

        // From here on the renderer is invalid until the rebuild succeeds.
        let GpuState {
            sync,
            command_buffers,
            command_pool,
            pipeline,
            pipeline_layout,
            drawables,
            graph,
            swapchain,
        } = state;

        drop(command_buffers);
        drop(command_pool);
        drop(pipeline);
        drop(pipeline_layout);
        drop(graph);
        drop(swapchain);

        let device = Arc::clone(&self.device);

        let swapchain = Swapchain::new(
            &self.instance,
            device.clone(),
            self.surface.handle(),
            &self.config.swapchain,
            width,
            height,
        )
        .map_err(RenderError::Setup)?;

        let graph = RenderGraph::new(device.clone(), &swapchain).map_err(RenderError::Setup)?;

        let command_pool =
            CommandPool::new(device, self.graphics_family()?).map_err(RenderError::Setup)?;

        let (pipeline_layout, pipeline) =
            self.build_pipeline(&graph, drawables.descriptor_layout())?;

        let command_buffers =
            self.allocate_frame_buffers(&command_pool, swapchain.image_count())?;
        record_commands(
            &command_buffers,
            &graph,
            &pipeline,
            &pipeline_layout,
            drawables.drawables(),
            &self.config.draw,
        )?;

        self.state.install(GpuState {
            sync,
            command_buffers,
            command_pool,
            pipeline,
            pipeline_layout,
            drawables,
            graph,
            swapchain,
        });

        debug!("Resize complete: {}x{}", width, height);
        Ok(())
    }

    /// Renders one frame: refresh uniforms, acquire, submit, present.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidState`] when called before
    /// `create()`, and [`RenderError::Runtime`] when acquire, submit, or
    /// present fails — including a suboptimal swapchain, which is treated
    /// as a failed frame rather than recovered from here. The caller is
    /// expected to react with [`Renderer::resized`].
    pub fn render_frame(&mut self) -> RenderResult<()> {
        let Self { scene, state, .. } = self;
        let Some(state) = state.get() else {
            return Err(RenderError::InvalidState(
                "render_frame() called on an invalid renderer".to_string(),
            ));
        };
        let extent = state.swapchain.extent();

        // Refresh per-drawable uniforms from the scene camera.
        scene
            .camera
            .set_aspect(extent.width as f32 / extent.height as f32);
        let view = scene.camera.view_matrix();
        let projection = scene.camera.projection_matrix();

        for drawable in state.drawables.drawables() {
            let matrices = Matrices::new(drawable.world_transform(), view, projection);
            drawable.update_matrices(&matrices)?;
        }

        let (image_index, suboptimal) = state
            .swapchain
            .acquire_next_image(state.sync.image_available())
            .map_err(|e| RenderError::Runtime(RhiError::VulkanError(e)))?;
        if suboptimal {
            return Err(RenderError::Runtime(RhiError::SwapchainError(
                "suboptimal swapchain on acquire".to_string(),
            )));
        }

        let wait_semaphores = [state.sync.image_available()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [state.sync.render_finished()];
        let command_buffers = [state.command_buffers[image_index as usize].handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        // No fence: frame pacing relies on the shared semaphore pair and
        // the present engine (see the sync module docs).
        unsafe { self.device.submit_graphics(&[submit_info], vk::Fence::null()) }
            .map_err(RenderError::Runtime)?;

        match state.swapchain.present(
            self.device.present_queue(),
            image_index,
            state.sync.render_finished(),
        ) {
            Ok(false) => Ok(()),
            Ok(true) => Err(RenderError::Runtime(RhiError::SwapchainError(
                "suboptimal swapchain on present".to_string(),
            ))),
            Err(e) => Err(RenderError::Runtime(RhiError::VulkanError(e))),
        }
    }

    /// Returns the current swapchain extent, if the renderer is valid.
    pub fn extent(&self) -> Option<vk::Extent2D> {
        self.state.get().map(|s| s.swapchain.extent())
    }

    fn graphics_family(&self) -> RenderResult<u32> {
        self.device
            .queue_families()
            .graphics_family
            .ok_or(RenderError::Setup(RhiError::NoSuitableGpu))
    }

    /// Loads the shaders and builds the pipeline layout + pipeline
    /// against the graph's render pass.
    fn build_pipeline(
        &self,
        graph: &RenderGraph,
        descriptor_layout: &DescriptorSetLayout,
    ) -> RenderResult<(PipelineLayout, Pipeline)> {
        let device = Arc::clone(&self.device);

        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            &self.config.vertex_shader,
            ShaderStage::Vertex,
            "main",
        )
        .map_err(RenderError::Setup)?;

        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            &self.config.fragment_shader,
            ShaderStage::Fragment,
            "main",
        )
        .map_err(RenderError::Setup)?;

        let pipeline_layout =
            PipelineLayout::new(device.clone(), &[descriptor_layout.handle()], &[])
                .map_err(RenderError::Setup)?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(MeshVertex::binding_description())
            .vertex_attributes(&MeshVertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .front_face(FrontFace::CounterClockwise)
            .render_pass(graph.render_pass().handle(), 0)
            .build(device, &pipeline_layout)
            .map_err(RenderError::Setup)?;

        Ok((pipeline_layout, pipeline))
    }

    /// Allocates one primary command buffer per swapchain image.
    fn allocate_frame_buffers(
        &self,
        pool: &CommandPool,
        image_count: u32,
    ) -> RenderResult<Vec<CommandBuffer>> {
        let handles = pool
            .allocate_command_buffers(image_count)
            .map_err(RenderError::Setup)?;
        Ok(handles
            .into_iter()
            .map(|h| CommandBuffer::from_handle(Arc::clone(&self.device), h))
            .collect())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();

        // The device must outlive the GPU state and the surface, and the
        // instance must outlive both.
        unsafe {
            ManuallyDrop::drop(&mut self.surface);
            ManuallyDrop::drop(&mut self.device);
            ManuallyDrop::drop(&mut self.instance);
        }

        info!("Renderer destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.draw.first_instance, 0);
        assert!(config.generate_mipmaps);
        assert_eq!(
            config.vertex_shader,
            PathBuf::from("shaders/spirv/scene.vert.spv")
        );
    }

    #[test]
    fn test_lifecycle_create_is_idempotent() {
        let mut lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_valid());

        assert!(lifecycle.install(1u32));
        assert!(lifecycle.is_valid());

        // A second install is rejected and the live state is kept.
        assert!(!lifecycle.install(2u32));
        assert_eq!(lifecycle.get(), Some(&1));
    }

    #[test]
    fn test_lifecycle_destroy_twice_is_noop() {
        let mut lifecycle = Lifecycle::new();
        lifecycle.install(7u32);

        assert_eq!(lifecycle.take(), Some(7));
        assert!(!lifecycle.is_valid());

        // Tearing down an already-destroyed lifecycle does nothing.
        assert_eq!(lifecycle.take(), None);
        assert!(!lifecycle.is_valid());
    }
}
