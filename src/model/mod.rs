// MODEL: Camera and scene geometry
pub mod camera;
pub mod plane;

pub use camera::{Camera, CameraMovement};
pub use plane::generate_flat_plane;
