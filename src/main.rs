//! Seaform - an animated water surface you can tune while it moves.
//!
//! Big product-of-sines swells, fbm ripples on top, colored by height.

use std::sync::Arc;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use seaform::camera::{OrbitCamera, OrbitControls};
use seaform::cli::Args;
use seaform::frame::{FrameTarget, RenderLoop, Scene, WallClock};
use seaform::panel::{ControlPanel, PanelFrame};
use seaform::params::{OrbitConfig, RenderConfig, WaterParams};
use seaform::preview::write_preview;
use seaform::rendering::{RenderSystem, WaterUniforms};
use seaform::viewport::Viewport;
use seaform::water::SurfaceGrid;

/// Frame target backed by the window surface
struct WindowFrame<'a> {
    renderer: &'a mut RenderSystem,
    window: &'a Window,
    panel: PanelFrame,
}

impl FrameTarget for WindowFrame<'_> {
    type Error = wgpu::SurfaceError;

    fn draw(&mut self, uniforms: &WaterUniforms) -> Result<(), Self::Error> {
        self.renderer.write_uniforms(uniforms);
        self.renderer.render(&self.panel)
    }

    fn schedule_next(&mut self) {
        self.window.request_redraw();
    }
}

/// Everything that exists only once the window does
struct Running {
    window: Arc<Window>,
    renderer: RenderSystem,
    panel: ControlPanel,
    render_loop: RenderLoop<WallClock>,
}

/// Main application state
struct App {
    // Configuration
    render_config: RenderConfig,
    orbit_config: OrbitConfig,

    // Parameter store, edited by the panel
    params: WaterParams,
    grid: SurfaceGrid,

    controls: OrbitControls,
    running: Option<Running>,
    startup_error: Option<String>,
}

impl App {
    fn new(render_config: RenderConfig, params: WaterParams) -> Self {
        let grid = SurfaceGrid::new(render_config.grid_segments, render_config.surface_extent);
        log::info!(
            "Water grid: {}x{} cells, {} vertices, {} triangles",
            grid.segments(),
            grid.segments(),
            grid.vertices.len(),
            grid.index_count() / 3
        );

        Self {
            render_config,
            orbit_config: OrbitConfig::default(),
            params,
            grid,
            controls: OrbitControls::default(),
            running: None,
            startup_error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, String> {
        let window_attributes = Window::default_attributes()
            .with_title("Seaform")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .map_err(|e| format!("Failed to create window: {}", e))?,
        );

        let size = window.inner_size();
        let viewport = Viewport::new(
            size.width,
            size.height,
            window.scale_factor(),
            self.render_config.max_pixel_ratio,
        );

        let renderer = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &self.grid,
            &self.render_config,
            viewport.render_size(),
        ))?;

        let panel = ControlPanel::new(&window);
        let camera = OrbitCamera::new(&self.orbit_config, &self.render_config);
        let render_loop = RenderLoop::new(WallClock::new(), Scene::new(camera, viewport));

        Ok(Running {
            window,
            renderer,
            panel,
            render_loop,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        let fps = running.render_loop.fps().current_fps();
        let panel = running
            .panel
            .run(&running.window, &mut self.params, fps);

        let result = {
            let mut target = WindowFrame {
                renderer: &mut running.renderer,
                window: &running.window,
                panel,
            };
            running.render_loop.tick(&self.params, &mut target)
        };

        match result {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                running.renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Dropped frame: {:?}", e),
        }
    }

    fn resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let scene = running.render_loop.scene_mut();
        if let Some(render_size) = scene.resize(width, height, scale_factor) {
            running
                .renderer
                .resize(scene.viewport.window_size(), render_size);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return; // Already initialized
        }

        match self.start(event_loop) {
            Ok(running) => {
                log::info!("Seaform is running. Drag to orbit, scroll to zoom, H toggles the panel, ESC quits");
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                log::error!("{}", e);
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match self.running.as_mut() {
            Some(running) => running.panel.on_window_event(&running.window, &event),
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::KeyH if !consumed => {
                    if let Some(running) = self.running.as_mut() {
                        running.panel.toggle();
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                let scale_factor = self
                    .running
                    .as_ref()
                    .map_or(1.0, |r| r.window.scale_factor());
                self.resize(size.width, size.height, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = self
                    .running
                    .as_ref()
                    .map(|r| r.window.inner_size())
                    .unwrap_or_default();
                self.resize(size.width, size.height, scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                if let Some(running) = self.running.as_mut() {
                    let scene = running.render_loop.scene_mut();
                    let (_, height) = scene.viewport.window_size();
                    self.controls
                        .handle_event(&other, consumed, &mut scene.camera, height as f32);
                }
            }
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let params = args.water_params()?;

    if let Some(preview) = args.preview_config() {
        return write_preview(&preview, &params);
    }

    let mut app = App::new(args.render_config(), params);
    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {}", e))?;
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {}", e))?;

    match app.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
