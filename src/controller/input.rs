//! Platform-agnostic input handling system
use std::collections::HashSet;
use winit::keyboard::KeyCode;

use crate::model::CameraMovement;

/// Platform-independent input events, queued by the window handler and
/// drained by the frame loop once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(KeyCode),
    KeyUp(KeyCode),

    // Mouse events, cursor position in window pixels (y grows downward)
    CursorMoved { x: f32, y: f32 },
    Scroll { delta_y: f32 },

    // Window events
    Resized { width: u32, height: u32 },
    FocusLost,
    CloseRequested,
}

/// Keys currently held plus the toggles they drive
pub struct InputState {
    pub pressed_keys: HashSet<KeyCode>,
    pub wireframe_mode: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            wireframe_mode: false,
        }
    }

    /// Update key state. Returns true when a key goes from released to
    /// pressed, so auto-repeat does not count as a fresh press.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(key) => self.pressed_keys.insert(*key),
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key);
                false
            }
            InputEvent::FocusLost => {
                self.clear_keys();
                false
            }
            _ => false,
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe_mode = !self.wireframe_mode;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub toggle_wireframe: KeyCode,
    pub escape: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            toggle_wireframe: KeyCode::KeyQ,
            escape: KeyCode::Escape,
        }
    }
}

/// High-level input processor
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Camera movements requested by the currently held keys
    pub fn held_movements(&self, input: &InputState) -> Vec<CameraMovement> {
        [
            (self.bindings.forward, CameraMovement::Forward),
            (self.bindings.backward, CameraMovement::Backward),
            (self.bindings.left, CameraMovement::Left),
            (self.bindings.right, CameraMovement::Right),
        ]
        .into_iter()
        .filter(|(key, _)| input.is_key_pressed(*key))
        .map(|(_, movement)| movement)
        .collect()
    }

    pub fn wants_to_exit(&self, input: &InputState) -> bool {
        input.is_key_pressed(self.bindings.escape)
    }

    pub fn wants_to_toggle_wireframe(&self, key: KeyCode) -> bool {
        key == self.bindings.toggle_wireframe
    }
}

/// Turns absolute cursor positions into look offsets.
///
/// The very first sample only records the position, so a cursor that starts
/// far from the initial guess does not snap the view.
#[derive(Debug, Clone)]
pub struct MouseLook {
    first_mouse: bool,
    last_x: f32,
    last_y: f32,
}

impl MouseLook {
    pub fn new(start_x: f32, start_y: f32) -> Self {
        Self {
            first_mouse: true,
            last_x: start_x,
            last_y: start_y,
        }
    }

    /// Returns `(x_offset, y_offset)` with y inverted so moving the mouse up
    /// gives a positive offset.
    pub fn offset(&mut self, x: f32, y: f32) -> (f32, f32) {
        if self.first_mouse {
            self.last_x = x;
            self.last_y = y;
            self.first_mouse = false;
        }
        let x_offset = x - self.last_x;
        let y_offset = self.last_y - y;
        self.last_x = x;
        self.last_y = y;
        (x_offset, y_offset)
    }
}

pub mod native {
    use super::*;
    use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
    use winit::keyboard::PhysicalKey;

    /// Pixel scroll deltas (touchpads) are scaled down to roughly one line per notch
    pub const PIXELS_PER_LINE: f32 = 20.0;

    /// Convert a winit window event into a queued input event, if it is one
    /// the demo reacts to.
    pub fn window_event_to_input(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => Some(match state {
                ElementState::Pressed => InputEvent::KeyDown(*code),
                ElementState::Released => InputEvent::KeyUp(*code),
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Scroll {
                delta_y: match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                },
            }),
            WindowEvent::Resized(size) => Some(InputEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
            _ => None,
        }
    }

    /// Accumulates relative device motion into an unbounded cursor position,
    /// so look input keeps working while the real cursor is grabbed.
    #[derive(Debug, Clone, Copy)]
    pub struct VirtualCursor {
        x: f64,
        y: f64,
    }

    impl VirtualCursor {
        pub fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }

        pub fn motion(&mut self, dx: f64, dy: f64) -> InputEvent {
            self.x += dx;
            self.y += dy;
            InputEvent::CursorMoved { x: self.x as f32, y: self.y as f32 }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::native::*;
    use super::*;

    #[test]
    fn first_mouse_sample_gives_zero_offset() {
        let mut look = MouseLook::new(800.0, 600.0);
        assert_eq!(look.offset(10.0, 1100.0), (0.0, 0.0));
    }

    #[test]
    fn later_samples_give_inverted_y_offset() {
        let mut look = MouseLook::new(0.0, 0.0);
        look.offset(100.0, 100.0);
        assert_eq!(look.offset(110.0, 90.0), (10.0, 10.0));
        assert_eq!(look.offset(105.0, 95.0), (-5.0, -5.0));
    }

    #[test]
    fn key_press_is_edge_triggered() {
        let mut input = InputState::new();
        assert!(input.process_event(&InputEvent::KeyDown(KeyCode::KeyQ)));
        // auto-repeat
        assert!(!input.process_event(&InputEvent::KeyDown(KeyCode::KeyQ)));
        assert!(!input.process_event(&InputEvent::KeyUp(KeyCode::KeyQ)));
        assert!(input.process_event(&InputEvent::KeyDown(KeyCode::KeyQ)));
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyW));
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyA));
        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed_keys.is_empty());
    }

    #[test]
    fn held_keys_map_to_movements() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyW));
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyD));
        input.process_event(&InputEvent::KeyDown(KeyCode::KeyX));
        assert_eq!(
            processor.held_movements(&input),
            vec![CameraMovement::Forward, CameraMovement::Right]
        );
        assert!(!processor.wants_to_exit(&input));

        input.process_event(&InputEvent::KeyDown(KeyCode::Escape));
        assert!(processor.wants_to_exit(&input));
    }

    #[test]
    fn window_events_map_to_queued_input() {
        use winit::dpi::PhysicalSize;
        use winit::event::WindowEvent;

        assert_eq!(
            window_event_to_input(&WindowEvent::Resized(PhysicalSize::new(800, 600))),
            Some(InputEvent::Resized { width: 800, height: 600 })
        );
        assert_eq!(window_event_to_input(&WindowEvent::Focused(false)), Some(InputEvent::FocusLost));
        assert_eq!(window_event_to_input(&WindowEvent::Focused(true)), None);
        assert_eq!(window_event_to_input(&WindowEvent::CloseRequested), Some(InputEvent::CloseRequested));
        assert_eq!(window_event_to_input(&WindowEvent::RedrawRequested), None);
    }

    #[test]
    fn wheel_deltas_are_in_lines() {
        use winit::dpi::PhysicalPosition;
        use winit::event::{DeviceId, MouseScrollDelta, TouchPhase, WindowEvent};

        let wheel = |delta| WindowEvent::MouseWheel {
            device_id: unsafe { DeviceId::dummy() },
            delta,
            phase: TouchPhase::Moved,
        };

        assert_eq!(
            window_event_to_input(&wheel(MouseScrollDelta::LineDelta(0.0, -2.0))),
            Some(InputEvent::Scroll { delta_y: -2.0 })
        );
        assert_eq!(
            window_event_to_input(&wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 60.0)))),
            Some(InputEvent::Scroll { delta_y: 60.0 / PIXELS_PER_LINE })
        );
    }

    #[test]
    fn virtual_cursor_accumulates_motion() {
        let mut cursor = VirtualCursor::new(800.0, 600.0);
        cursor.motion(5.0, -3.0);
        assert_eq!(cursor.motion(1.0, 1.0), InputEvent::CursorMoved { x: 806.0, y: 598.0 });
    }
}
