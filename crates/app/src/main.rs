//! Demo application: renders a small textured scene to a window.

use anyhow::Result;
use glam::{Mat4, Quat, Vec3};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use vkr_platform::Window;
use vkr_renderer::{Renderer, RendererConfig};
use vkr_resources::Mesh;
use vkr_scene::{Drawable, Scene};

/// Builds the demo scene: two textured quads at different depths.
fn demo_scene() -> Scene {
    let mut scene = Scene::new("demo");

    scene.drawables.push(Drawable {
        mesh: Mesh::quad(),
        texture_path: "assets/textures/checker.png".into(),
        world_transform: Mat4::IDENTITY,
    });
    scene.drawables.push(Drawable {
        mesh: Mesh::quad(),
        texture_path: "assets/textures/checker.png".into(),
        world_transform: Mat4::from_scale_rotation_translation(
            Vec3::splat(0.5),
            Quat::from_rotation_y(0.6),
            Vec3::new(0.8, 0.3, -1.0),
        ),
    });

    scene
}

struct App {
    window: Option<Window>,
    renderer: Option<Renderer>,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            renderer: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(event_loop, 1280, 720, "vkr") {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut renderer =
            match Renderer::new(&window, demo_scene(), RendererConfig::default()) {
                Ok(renderer) => renderer,
                Err(e) => {
                    error!("Failed to initialize renderer: {e}");
                    event_loop.exit();
                    return;
                }
            };

        if let Err(e) = renderer.create() {
            error!("Failed to create renderer GPU state: {e}");
            event_loop.exit();
            return;
        }

        info!("Initialization complete, entering main loop");
        self.renderer = Some(renderer);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut window) = self.window {
                    window.resize(size.width, size.height);
                }
                if let Some(ref mut renderer) = self.renderer {
                    if let Err(e) = renderer.resized(size.width, size.height) {
                        error!("Resize failed: {e}");
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
                    return;
                };

                if let Err(e) = renderer.render_frame() {
                    // Suboptimal or out-of-date swapchains surface here;
                    // rebuild at the current window size and carry on.
                    warn!("Frame failed: {e}; rebuilding swapchain");
                    if let Err(e) = renderer.resized(window.width(), window.height()) {
                        error!("Swapchain rebuild failed: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    vkr_core::init_logging();
    info!("Starting vkr");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
