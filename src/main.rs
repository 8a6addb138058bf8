//! Interactive viewer.
//!
//! ```text
//! glimmer [config.json]
//! ```
//!
//! Starts with the snowflake preset unless a configuration file is given.
//!
//! | Key | Action |
//! |-----|--------|
//! | `1`-`5` | snowflake, smoke, firework, sphere, cube |
//! | `Space` | pause / resume |
//! | `E` | export the configuration to `particle-config-<type>.json` |

use std::sync::Arc;

use glimmer::gpu::{GpuState, PointRenderer};
use glimmer::prelude::*;
use glimmer::ViewerError;
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Redraws between window title refreshes.
const TITLE_REFRESH_TICKS: u64 = 30;

fn main() -> Result<(), ViewerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            tracing::info!(path = %path.to_string_lossy(), "loading configuration");
            Config::load(path)?
        }
        None => presets::snowflake(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(config);
    event_loop.run_app(&mut viewer)?;

    match viewer.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Viewer {
    window: Option<Arc<Window>>,
    bridge: Option<RenderBridge<PointRenderer>>,
    system: ParticleSystem,
    redraws: u64,
    error: Option<ViewerError>,
}

impl Viewer {
    fn new(config: Config) -> Self {
        Self {
            window: None,
            bridge: None,
            system: ParticleSystem::new(config),
            redraws: 0,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("glimmer")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuState::new(window.clone()))?;

        self.bridge = Some(RenderBridge::new(PointRenderer::new(gpu)));
        self.window = Some(window);
        Ok(())
    }

    fn switch_archetype(&mut self, archetype: Archetype) {
        let next = self.system.config().with_archetype(archetype);
        self.system.reconfigure(next);
    }

    fn export(&self) {
        let config = self.system.config();
        let file_name = config.export_file_name();
        match config.save(&file_name) {
            Ok(()) => tracing::info!(file = %file_name, "exported configuration"),
            Err(err) => tracing::warn!(file = %file_name, error = %err, "export failed"),
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };

        match code {
            KeyCode::Digit1 => self.switch_archetype(Archetype::Snowflake),
            KeyCode::Digit2 => self.switch_archetype(Archetype::Smoke),
            KeyCode::Digit3 => self.switch_archetype(Archetype::Firework),
            KeyCode::Digit4 => self.switch_archetype(Archetype::Sphere),
            KeyCode::Digit5 => self.switch_archetype(Archetype::Cube),
            KeyCode::Space => {
                self.system.time_mut().toggle_pause();
                tracing::info!(paused = self.system.time().is_paused(), "toggled pause");
            }
            KeyCode::KeyE => self.export(),
            _ => {}
        }
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            let config = self.system.config();
            let paused = if self.system.time().is_paused() { " [paused]" } else { "" };
            window.set_title(&format!(
                "glimmer - {} x{} - {:.0} fps{}",
                config.archetype.name(),
                config.count,
                self.system.time().fps(),
                paused
            ));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.system.tick();

        if let Some(bridge) = &mut self.bridge {
            match bridge.render(&self.system) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    bridge.target_mut().reconfigure_surface();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    tracing::error!("GPU out of memory");
                    event_loop.exit();
                }
                Err(err) => tracing::warn!(error = %err, "render error"),
            }
        }

        self.redraws += 1;
        if self.redraws % TITLE_REFRESH_TICKS == 0 {
            self.refresh_title();
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            tracing::error!(error = %err, "viewer initialization failed");
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(bridge) = &mut self.bridge {
                    bridge.target_mut().resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(&event);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}
