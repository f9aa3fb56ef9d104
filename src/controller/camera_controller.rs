use crate::model::{Camera, CameraMovement};

/// Handles camera movement and orientation
pub struct CameraController {
    /// World units per second
    pub move_speed: f32,
    /// Radians per pixel of cursor offset
    pub mouse_sensitivity: f32,
    pub pitch_limit: f32,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            move_speed: 2.5,
            mouse_sensitivity: 0.1f32.to_radians(),
            pitch_limit: 89f32.to_radians(),
        }
    }

    /// Apply a look offset; positive `dy` tilts the view up
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        camera.pitch = (camera.pitch + dy * self.mouse_sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Move the camera for each held movement, scaled by the frame delta
    pub fn update_movement(&self, camera: &mut Camera, movements: &[CameraMovement], dt: f32) {
        let distance = self.move_speed * dt;
        for movement in movements {
            camera.translate(*movement, distance);
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
