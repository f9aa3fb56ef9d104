use glam::{Mat4, Vec3};

pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Zoom (vertical field of view) bounds in degrees
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-fly camera. Yaw and pitch are in radians, zoom is the vertical field
/// of view in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub zoom: f32,
}

impl Camera {
    pub fn new(eye: Vec3) -> Self {
        Self {
            eye,
            // Looking down -Z
            yaw: (-90f32).to_radians(),
            pitch: 0.0,
            up: Vec3::Y,
            zoom: MAX_ZOOM,
        }
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    pub fn target(&self) -> Vec3 { self.eye + self.forward() }

    pub fn fov_y(&self) -> f32 { self.zoom.to_radians() }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target(), self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y(), aspect, Z_NEAR, Z_FAR)
    }

    /// Translate along the view direction or its right vector by `distance`
    pub fn translate(&mut self, movement: CameraMovement, distance: f32) {
        match movement {
            CameraMovement::Forward => self.eye += self.forward() * distance,
            CameraMovement::Backward => self.eye -= self.forward() * distance,
            CameraMovement::Left => self.eye -= self.right() * distance,
            CameraMovement::Right => self.eye += self.right() * distance,
        }
    }

    pub fn process_scroll(&mut self, delta_y: f32) {
        self.zoom = (self.zoom - delta_y).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.5, 10.0))
    }
}
