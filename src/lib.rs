//! Minimal real-time water plane demo: a flat tessellated mesh lit by a
//! directional light, explored with a free-fly camera.

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::DemoConfig;
pub use error::{DemoError, Result};
