use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

// Import from the library crate
use water_demo::{
    logging, model, view, controller,
    DemoConfig, DemoError,
};

use controller::input::native::{self, VirtualCursor};
use controller::{FrameLoopContext, InputEvent};
use view::{GpuContext, RenderState, ShaderSources};

struct Demo {
    window: Arc<Window>,
    renderer: RenderState,
    frame_loop: FrameLoopContext,

    // Input handling
    cursor: VirtualCursor,
    pending: Vec<InputEvent>,
    focused: bool,
}

impl Demo {
    fn new(event_loop: &ActiveEventLoop, config: &DemoConfig) -> water_demo::Result<Self> {
        let window_attributes = Window::default_attributes()
            .with_title(config.window_title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height))
            .with_resizable(true);
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        capture_cursor(&window);

        let sources = ShaderSources::load(config)?;
        let gpu = pollster::block_on(GpuContext::new_native(window.clone()))?;

        let mesh = model::generate_flat_plane(config.plane_width, config.plane_depth, config.plane_divisions);
        info!(vertices = mesh.vertices.len(), triangles = mesh.triangle_count(), "generated water plane");

        let renderer = RenderState::new(gpu, &sources, &mesh);
        let (width, height) = renderer.size();
        let frame_loop = FrameLoopContext::new(config, width, height);

        Ok(Self {
            window,
            renderer,
            frame_loop,
            cursor: VirtualCursor::new(width as f64 / 2.0, height as f64 / 2.0),
            pending: Vec::new(),
            focused: true,
        })
    }

    fn redraw(&mut self) {
        let events = std::mem::take(&mut self.pending);
        match self.frame_loop.run_frame(events, &mut self.renderer) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, closing");
                self.frame_loop.request_close();
            }
            Err(e) => warn!("skipping frame: {e:?}"),
        }
    }
}

/// Hide the cursor and keep it inside the window
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        warn!("could not grab cursor: {e}");
    }
    window.set_cursor_visible(false);
}

#[derive(Default)]
struct App {
    config: DemoConfig,
    demo: Option<Demo>,
    startup_error: Option<DemoError>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.demo.is_some() {
            return;
        }

        match Demo::new(event_loop, &self.config) {
            Ok(demo) => {
                info!("demo ready");
                demo.window.request_redraw();
                self.demo = Some(demo);
            }
            Err(e) => {
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        if window_id != demo.window.id() {
            return;
        }

        match &event {
            WindowEvent::RedrawRequested => demo.redraw(),
            WindowEvent::Focused(focused) => {
                demo.focused = *focused;
                if *focused {
                    capture_cursor(&demo.window);
                }
            }
            _ => {}
        }

        match native::window_event_to_input(&event) {
            Some(InputEvent::CloseRequested) => demo.frame_loop.request_close(),
            Some(input) => demo.pending.push(input),
            None => {}
        }

        if demo.frame_loop.should_close() {
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if demo.focused {
                let moved = demo.cursor.motion(dx, dy);
                demo.pending.push(moved);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(demo) = self.demo.as_ref() else {
            return;
        };
        if demo.frame_loop.should_close() {
            event_loop.exit();
        } else {
            demo.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!("shutting down");
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();
    info!("Starting Water Demo");

    let event_loop = EventLoop::new().map_err(DemoError::from)?;
    let mut app = App::default();
    event_loop.run_app(&mut app).context("event loop terminated abnormally")?;

    if let Some(err) = app.startup_error.take() {
        error!("{err}");
        return Err(anyhow::Error::new(err).context("startup failed"));
    }
    Ok(())
}
