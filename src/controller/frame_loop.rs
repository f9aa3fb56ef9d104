use glam::Mat4;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{DemoConfig, DirectionalLight};
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputEvent, InputProcessor, InputState, KeyBindings, MouseLook};
use crate::model::Camera;

/// Per-frame transforms, `Frame` in the shaders (`model`, `view`, `proj`,
/// `viewPos`, `time`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub time: f32,
}

/// `dirLight` in the fragment shader; vec3 members are padded to 16 bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirLightUniform {
    pub direction: [f32; 3],
    pub _pad0: f32,
    pub ambient: [f32; 3],
    pub _pad1: f32,
    pub diffuse: [f32; 3],
    pub _pad2: f32,
    pub specular: [f32; 3],
    pub _pad3: f32,
}

impl From<&DirectionalLight> for DirLightUniform {
    fn from(light: &DirectionalLight) -> Self {
        Self {
            direction: light.direction.to_array(),
            _pad0: 0.0,
            ambient: light.ambient.to_array(),
            _pad1: 0.0,
            diffuse: light.diffuse.to_array(),
            _pad2: 0.0,
            specular: light.specular.to_array(),
            _pad3: 0.0,
        }
    }
}

/// `material` in the fragment shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub shininess: f32,
    pub _pad: [f32; 3],
}

impl MaterialUniform {
    pub fn new(shininess: f32) -> Self {
        Self { shininess, _pad: [0.0; 3] }
    }
}

/// Everything the render target needs to draw one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacket {
    pub clear_color: wgpu::Color,
    pub frame: FrameUniform,
    pub dir_light: DirLightUniform,
    pub material: MaterialUniform,
    pub wireframe: bool,
}

/// The GPU side of the frame loop
pub trait RenderTarget {
    /// Match the drawable surface to a new, non-zero viewport size
    fn resize(&mut self, width: u32, height: u32);

    /// Clear, upload uniforms, draw the mesh and present
    fn render(&mut self, packet: &FramePacket) -> Result<(), wgpu::SurfaceError>;

    fn supports_wireframe(&self) -> bool {
        false
    }
}

/// Frame timing. Timestamps are seconds since the clock was created and never
/// go backwards.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: f64,
    delta: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_frame: 0.0,
            delta: 0.0,
        }
    }

    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Record a new frame timestamp and return the elapsed delta
    pub fn advance(&mut self, now: f64) -> f32 {
        let now = now.max(self.last_frame);
        self.delta = (now - self.last_frame) as f32;
        self.last_frame = now;
        self.delta
    }

    pub fn last_frame(&self) -> f64 { self.last_frame }

    pub fn delta(&self) -> f32 { self.delta }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Returns false (and keeps the old size) for a minimised, zero-sized window
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }
}

#[derive(Debug, Default)]
struct FrameStats {
    frame_count: u32,
    fps_timer: f32,
    fps: f32,
}

impl FrameStats {
    fn record(&mut self, dt: f32) {
        self.frame_count += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer;
            self.frame_count = 0;
            self.fps_timer = 0.0;
            debug!(fps = self.fps, "frame statistics");
        }
    }
}

/// Owns all mutable demo state: camera, input, timing and the close signal.
pub struct FrameLoopContext {
    pub camera: Camera,
    pub camera_controller: CameraController,
    pub input_state: InputState,
    pub input_processor: InputProcessor,
    pub mouse_look: MouseLook,
    pub clock: FrameClock,
    pub viewport: Viewport,
    clear_color: wgpu::Color,
    dir_light: DirLightUniform,
    material: MaterialUniform,
    stats: FrameStats,
    close_requested: bool,
}

impl FrameLoopContext {
    pub fn new(config: &DemoConfig, width: u32, height: u32) -> Self {
        let [r, g, b, a] = config.clear_color;
        Self {
            camera: Camera::new(config.camera_start),
            camera_controller: CameraController::new(),
            input_state: InputState::new(),
            input_processor: InputProcessor::new(KeyBindings::default()),
            mouse_look: MouseLook::new(width as f32 / 2.0, height as f32 / 2.0),
            clock: FrameClock::new(),
            viewport: Viewport {
                width: width.max(1),
                height: height.max(1),
            },
            clear_color: wgpu::Color { r, g, b, a },
            dir_light: DirLightUniform::from(&config.light),
            material: MaterialUniform::new(config.shininess),
            stats: FrameStats::default(),
            close_requested: false,
        }
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Run one frame against the wall clock
    pub fn run_frame<T, I>(&mut self, events: I, target: &mut T) -> Result<(), wgpu::SurfaceError>
    where
        T: RenderTarget,
        I: IntoIterator<Item = InputEvent>,
    {
        let now = self.clock.now();
        self.run_frame_at(now, events, target)
    }

    /// Run one frame with an explicit timestamp (seconds since start)
    pub fn run_frame_at<T, I>(&mut self, now: f64, events: I, target: &mut T) -> Result<(), wgpu::SurfaceError>
    where
        T: RenderTarget,
        I: IntoIterator<Item = InputEvent>,
    {
        // Time step
        let dt = self.clock.advance(now);

        for event in events {
            self.dispatch(event, target);
        }
        self.poll_keyboard(dt);

        let packet = self.frame_packet();
        self.stats.record(dt);
        target.render(&packet)
    }

    fn dispatch<T: RenderTarget>(&mut self, event: InputEvent, target: &mut T) {
        match event {
            InputEvent::KeyDown(key) => {
                let fresh_press = self.input_state.process_event(&event);
                if fresh_press && self.input_processor.wants_to_toggle_wireframe(key) {
                    if target.supports_wireframe() {
                        self.input_state.toggle_wireframe();
                        info!(enabled = self.input_state.wireframe_mode, "wireframe mode");
                    } else {
                        warn!("wireframe mode not supported by this adapter");
                    }
                }
            }
            InputEvent::KeyUp(_) | InputEvent::FocusLost => {
                self.input_state.process_event(&event);
            }
            InputEvent::CursorMoved { x, y } => {
                let (dx, dy) = self.mouse_look.offset(x, y);
                self.camera_controller.apply_look(&mut self.camera, dx, dy);
            }
            InputEvent::Scroll { delta_y } => self.camera.process_scroll(delta_y),
            InputEvent::Resized { width, height } => {
                if self.viewport.resize(width, height) {
                    target.resize(width, height);
                }
            }
            InputEvent::CloseRequested => self.request_close(),
        }
    }

    fn poll_keyboard(&mut self, dt: f32) {
        if self.input_processor.wants_to_exit(&self.input_state) {
            self.request_close();
        }
        let movements = self.input_processor.held_movements(&self.input_state);
        self.camera_controller.update_movement(&mut self.camera, &movements, dt);
    }

    fn frame_packet(&self) -> FramePacket {
        FramePacket {
            clear_color: self.clear_color,
            frame: FrameUniform {
                model: Mat4::IDENTITY.to_cols_array_2d(),
                view: self.camera.view_matrix().to_cols_array_2d(),
                proj: self.camera.projection(self.viewport.aspect()).to_cols_array_2d(),
                view_pos: self.camera.eye.to_array(),
                time: self.clock.last_frame() as f32,
            },
            dir_light: self.dir_light,
            material: self.material,
            wireframe: self.input_state.wireframe_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use winit::keyboard::KeyCode;

    #[derive(Default)]
    struct RecordingTarget {
        wireframe: bool,
        resizes: Vec<(u32, u32)>,
        packets: Vec<FramePacket>,
        calls: Vec<&'static str>,
    }

    impl RenderTarget for RecordingTarget {
        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
            self.calls.push("resize");
        }

        fn render(&mut self, packet: &FramePacket) -> Result<(), wgpu::SurfaceError> {
            self.packets.push(*packet);
            self.calls.push("render");
            Ok(())
        }

        fn supports_wireframe(&self) -> bool {
            self.wireframe
        }
    }

    const NO_EVENTS: [InputEvent; 0] = [];

    fn context() -> FrameLoopContext {
        FrameLoopContext::new(&DemoConfig::default(), 1600, 1200)
    }

    #[test]
    fn uniform_sizes_match_shader_layout() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 208);
        assert_eq!(std::mem::size_of::<DirLightUniform>(), 64);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
    }

    #[test]
    fn clock_delta_is_never_negative() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(0.5), 0.5);
        assert_eq!(clock.advance(0.75), 0.25);
        assert_eq!(clock.advance(0.6), 0.0);
        assert_eq!(clock.last_frame(), 0.75);
        assert_eq!(clock.advance(0.75), 0.0);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn clock_delta_stays_precise_after_long_uptime() {
        let mut clock = FrameClock::new();
        let ten_hours = 36_000.0;
        clock.advance(ten_hours);
        for frame in 1..=3 {
            let dt = clock.advance(ten_hours + frame as f64 / 60.0);
            assert!((dt - 1.0 / 60.0).abs() < 1e-6, "uneven delta {dt}");
        }
    }

    #[test]
    fn frame_packet_carries_fixed_lighting() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(1.5, NO_EVENTS, &mut target).unwrap();

        let packet = target.packets[0];
        assert_eq!(packet.frame.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(packet.frame.time, 1.5);
        assert_eq!(packet.frame.view_pos, [0.0, 0.5, 10.0]);
        assert_eq!(packet.dir_light.direction, [0.0, -0.2, 1.0]);
        assert_eq!(packet.dir_light.ambient, [0.3; 3]);
        assert_eq!(packet.dir_light.diffuse, [0.4; 3]);
        assert_eq!(packet.dir_light.specular, [0.5; 3]);
        assert_eq!(packet.material.shininess, 64.0);
        assert_eq!(packet.clear_color, wgpu::Color { r: 0.2, g: 0.6, b: 0.75, a: 1.0 });
        assert!(!packet.wireframe);
    }

    #[test]
    fn resize_is_dispatched_before_render() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::Resized { width: 800, height: 200 }], &mut target).unwrap();

        assert_eq!(target.calls, vec!["resize", "render"]);
        assert_eq!(target.resizes, vec![(800, 200)]);
        let expected = ctx.camera.projection(4.0).to_cols_array_2d();
        assert_eq!(target.packets[0].frame.proj, expected);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::Resized { width: 0, height: 0 }], &mut target).unwrap();
        assert!(target.resizes.is_empty());
        assert_eq!(ctx.viewport, Viewport { width: 1600, height: 1200 });
    }

    #[test]
    fn held_keys_move_camera_by_delta() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.0, [InputEvent::KeyDown(KeyCode::KeyW)], &mut target).unwrap();
        assert_eq!(ctx.camera.eye, Vec3::new(0.0, 0.5, 10.0));

        ctx.run_frame_at(2.0, NO_EVENTS, &mut target).unwrap();
        assert!((ctx.camera.eye - Vec3::new(0.0, 0.5, 5.0)).length() < 1e-4);

        ctx.run_frame_at(3.0, [InputEvent::KeyUp(KeyCode::KeyW)], &mut target).unwrap();
        assert!((ctx.camera.eye - Vec3::new(0.0, 0.5, 5.0)).length() < 1e-4);
    }

    #[test]
    fn escape_sets_close_signal() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::KeyDown(KeyCode::Escape)], &mut target).unwrap();
        assert!(ctx.should_close());
    }

    #[test]
    fn platform_close_sets_close_signal() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::CloseRequested], &mut target).unwrap();
        assert!(ctx.should_close());
    }

    #[test]
    fn first_cursor_event_does_not_rotate() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        let yaw = ctx.camera.yaw;
        ctx.run_frame_at(0.1, [InputEvent::CursorMoved { x: 5.0, y: 5.0 }], &mut target).unwrap();
        assert_eq!(ctx.camera.yaw, yaw);
        assert_eq!(ctx.camera.pitch, 0.0);

        ctx.run_frame_at(0.2, [InputEvent::CursorMoved { x: 15.0, y: 0.0 }], &mut target).unwrap();
        assert!(ctx.camera.yaw > yaw);
        assert!(ctx.camera.pitch > 0.0);
    }

    #[test]
    fn scroll_zooms_in() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::Scroll { delta_y: 5.0 }], &mut target).unwrap();
        assert_eq!(ctx.camera.zoom, 40.0);
    }

    #[test]
    fn wireframe_toggle_requires_support() {
        let mut ctx = context();
        let mut target = RecordingTarget::default();
        ctx.run_frame_at(0.1, [InputEvent::KeyDown(KeyCode::KeyQ)], &mut target).unwrap();
        assert!(!target.packets[0].wireframe);

        let mut target = RecordingTarget { wireframe: true, ..Default::default() };
        ctx.run_frame_at(0.2, [InputEvent::KeyUp(KeyCode::KeyQ), InputEvent::KeyDown(KeyCode::KeyQ)], &mut target).unwrap();
        assert!(target.packets[0].wireframe);

        // held key repeats do not toggle back
        ctx.run_frame_at(0.3, [InputEvent::KeyDown(KeyCode::KeyQ)], &mut target).unwrap();
        assert!(target.packets[1].wireframe);
    }
}
