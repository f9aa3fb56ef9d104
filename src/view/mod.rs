// VIEW: Rendering and graphics
pub mod render;
pub mod gpu_init;

pub use render::{PipelineResources, RenderState, ShaderSources, UniformResources};
pub use gpu_init::GpuContext;
