//! Fixed demo settings. The demo takes no CLI flags, so everything tunable
//! lives here with its default value.

use glam::Vec3;
use std::path::PathBuf;

/// Directional light parameters, one RGB triple per term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -0.2, 1.0),
            ambient: Vec3::splat(0.3),
            diffuse: Vec3::splat(0.4),
            specular: Vec3::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,

    // Plane mesh
    pub plane_width: f32,
    pub plane_depth: f32,
    pub plane_divisions: u32,

    pub camera_start: Vec3,
    pub clear_color: [f64; 4],
    pub light: DirectionalLight,
    pub shininess: f32,

    pub vertex_shader_path: PathBuf,
    pub fragment_shader_path: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_title: "Water Demo".to_string(),
            window_width: 1600,
            window_height: 1200,
            plane_width: 20.0,
            plane_depth: 20.0,
            plane_divisions: 50,
            camera_start: Vec3::new(0.0, 0.5, 10.0),
            clear_color: [0.2, 0.6, 0.75, 1.0],
            light: DirectionalLight::default(),
            shininess: 64.0,
            vertex_shader_path: PathBuf::from("shaders/vertex.wgsl"),
            fragment_shader_path: PathBuf::from("shaders/fragment.wgsl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_window() {
        let config = DemoConfig::default();
        assert_eq!(config.window_title, "Water Demo");
        assert_eq!((config.window_width, config.window_height), (1600, 1200));
        assert_eq!(config.plane_divisions, 50);
    }

    #[test]
    fn shader_paths_are_relative() {
        let config = DemoConfig::default();
        assert!(config.vertex_shader_path.is_relative());
        assert!(config.fragment_shader_path.is_relative());
    }
}
