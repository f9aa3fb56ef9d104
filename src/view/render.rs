use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::DemoConfig;
use crate::controller::{DirLightUniform, FramePacket, FrameUniform, MaterialUniform, RenderTarget};
use crate::error::{DemoError, Result};
use crate::utils::{Mesh, MeshBuffer, Vertex};
use crate::view::GpuContext;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Uniform buffers for the water shader, bound at group 0:
/// binding 0 `frame`, binding 1 `dirLight`, binding 2 `material`.
pub struct UniformResources {
    pub frame_buffer: wgpu::Buffer,
    pub dir_light_buffer: wgpu::Buffer,
    pub material_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

pub struct PipelineResources {
    pub pipeline: wgpu::RenderPipeline,
    pub wireframe_pipeline: Option<wgpu::RenderPipeline>,
}

pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

pub fn load_shader_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DemoError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })
}

impl ShaderSources {
    pub fn load(config: &DemoConfig) -> Result<Self> {
        let vertex = load_shader_source(&config.vertex_shader_path)?;
        let fragment = load_shader_source(&config.fragment_shader_path)?;
        debug!(
            vertex = %config.vertex_shader_path.display(),
            fragment = %config.fragment_shader_path.display(),
            "loaded shader sources"
        );
        Ok(Self { vertex, fragment })
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_buffer<T>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_uniform_resources(device: &wgpu::Device) -> UniformResources {
    let frame_buffer = uniform_buffer::<FrameUniform>(device, "frame_buffer");
    let dir_light_buffer = uniform_buffer::<DirLightUniform>(device, "dir_light_buffer");
    let material_buffer = uniform_buffer::<MaterialUniform>(device, "material_buffer");

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &[
            uniform_layout_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            uniform_layout_entry(1, wgpu::ShaderStages::FRAGMENT),
            uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT),
        ],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: dir_light_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 2, resource: material_buffer.as_entire_binding() },
        ],
    });

    UniformResources { frame_buffer, dir_light_buffer, material_buffer, bind_group_layout, bind_group }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    vertex_shader: &wgpu::ShaderModule,
    fragment_shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex_shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment_shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The plane is visible from below as well
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

pub fn create_water_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
    sources: &ShaderSources,
) -> PipelineResources {
    let vertex_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("water_vertex_shader"),
        source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
    });
    let fragment_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("water_fragment_shader"),
        source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("water_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = create_pipeline(
        device,
        "water_pipeline",
        &pipeline_layout,
        &vertex_shader,
        &fragment_shader,
        format,
        wgpu::PolygonMode::Fill,
    );

    let wireframe_pipeline = device
        .features()
        .contains(wgpu::Features::POLYGON_MODE_LINE)
        .then(|| {
            create_pipeline(
                device,
                "water_wireframe_pipeline",
                &pipeline_layout,
                &vertex_shader,
                &fragment_shader,
                format,
                wgpu::PolygonMode::Line,
            )
        });

    PipelineResources { pipeline, wireframe_pipeline }
}

/// All GPU state needed to draw the water plane
pub struct RenderState {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    uniforms: UniformResources,
    pipelines: PipelineResources,
    mesh: MeshBuffer,
}

impl RenderState {
    pub fn new(gpu: GpuContext, sources: &ShaderSources, mesh: &Mesh) -> Self {
        let GpuContext { device, queue, surface, format, config } = gpu;

        let (_, depth_view) = create_depth_texture(&device, config.width, config.height);
        let uniforms = create_uniform_resources(&device);
        let pipelines = create_water_pipelines(&device, format, &uniforms.bind_group_layout, sources);
        let mesh = mesh.upload(&device);
        info!(
            indices = mesh.index_count,
            wireframe = pipelines.wireframe_pipeline.is_some(),
            "render state ready"
        );

        Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            uniforms,
            pipelines,
            mesh,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost
    pub fn reconfigure(&mut self) {
        let (width, height) = self.size();
        self.resize(width, height);
    }
}

impl RenderTarget for RenderState {
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        let (_, depth_view) = create_depth_texture(&self.device, width, height);
        self.depth_view = depth_view;
        debug!(width, height, "surface resized");
    }

    fn render(&mut self, packet: &FramePacket) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.queue.write_buffer(&self.uniforms.frame_buffer, 0, bytemuck::bytes_of(&packet.frame));
        self.queue.write_buffer(&self.uniforms.dir_light_buffer, 0, bytemuck::bytes_of(&packet.dir_light));
        self.queue.write_buffer(&self.uniforms.material_buffer, 0, bytemuck::bytes_of(&packet.material));

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(packet.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let pipeline = match &self.pipelines.wireframe_pipeline {
                Some(wireframe) if packet.wireframe => wireframe,
                _ => &self.pipelines.pipeline,
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.uniforms.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn supports_wireframe(&self) -> bool {
        self.pipelines.wireframe_pipeline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX_WGSL: &str = include_str!("../../shaders/vertex.wgsl");
    const FRAGMENT_WGSL: &str = include_str!("../../shaders/fragment.wgsl");

    #[test]
    fn shaders_keep_uniform_names() {
        for name in ["model", "view", "proj"] {
            assert!(VERTEX_WGSL.contains(&format!("frame.{name}")), "vertex shader missing {name}");
        }
        for name in [
            "material.shininess",
            "dirLight.direction",
            "dirLight.ambient",
            "dirLight.diffuse",
            "dirLight.specular",
            "frame.viewPos",
            "frame.time",
        ] {
            assert!(FRAGMENT_WGSL.contains(name), "fragment shader missing {name}");
        }
    }

    #[test]
    fn shader_entry_points_exist() {
        assert!(VERTEX_WGSL.contains("fn vs_main"));
        assert!(FRAGMENT_WGSL.contains("fn fs_main"));
    }

    #[test]
    fn missing_shader_is_reported_with_path() {
        let err = load_shader_source(Path::new("shaders/does-not-exist.wgsl")).unwrap_err();
        match err {
            DemoError::ShaderLoad { path, source } => {
                assert_eq!(path, Path::new("shaders/does-not-exist.wgsl"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn default_shader_paths_load_from_crate_root() {
        // cargo runs tests from the package root, same as the demo binary
        let sources = ShaderSources::load(&DemoConfig::default()).unwrap();
        assert_eq!(sources.vertex, VERTEX_WGSL);
        assert_eq!(sources.fragment, FRAGMENT_WGSL);
    }
}
