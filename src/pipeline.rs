//! # Pipeline Module
//!
//! Builds the immutable GPU resource bundle needed to draw one sphere mesh with one shader.
//!
//! [`SpherePipeline::new`] creates, in a single validation error scope:
//!
//! - the vertex and index buffers of the [`Mesh`],
//! - the camera bind group layout ([`UniformBinding::create_layout`]),
//! - the pipeline layout and the shader module,
//! - the render pipeline: `vs_main`/`fs_main`, the [`Vertex`] layout, one sRGB color target, a
//!   counter-clockwise front face with back-face culling, and no depth attachment.
//!
//! If any of these is rejected by the device (a shader that fails to compile, a layout that
//! disagrees with the shader, ...) the whole bundle is discarded and [`Error::Validation`] is
//! returned. There is no partially built pipeline.
//!
//! [`Error::Validation`]: crate::Error::Validation

use crate::error::Result;
use crate::gpu::Gpu;
use crate::mesh::Mesh;
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::CameraUniform;
use crate::vertex::Vertex;

/// Entry point of the vertex stage.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";

/// Entry point of the fragment stage.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";

/// Everything needed to draw one mesh, created once and never mutated.
pub struct SpherePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl SpherePipeline {
    /// Uploads `mesh` and builds the pipeline for `shader_source` rendering into `color_format`.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Validation`] with the device's message if any object fails validation.
    pub async fn new(
        gpu: &Gpu,
        mesh: &Mesh,
        shader_source: &str,
        color_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let sphere = gpu
            .validated(|device| Self::build(device, mesh, shader_source, color_format))
            .await?;
        log::debug!(
            "sphere pipeline ready: {} vertices, {} indices",
            sphere.vertex_count,
            sphere.index_count
        );
        Ok(sphere)
    }

    fn build(
        device: &wgpu::Device,
        mesh: &Mesh,
        shader_source: &str,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let index_buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );

        let bind_group_layout = UniformBinding::create_layout(device);
        let pipeline = Self::create_pipeline(device, shader_source, color_format, &bind_group_layout);

        Self {
            pipeline,
            bind_group_layout,
            vertex_buffer,
            index_buffer,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.index_count(),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        shader_source: &str,
        color_format: wgpu::TextureFormat,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(shader_source)),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_attributes = Vertex::vertex_attributes();

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sphere Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some(VERTEX_ENTRY_POINT),
                buffers: &[Vertex::description(&vertex_attributes)],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back), // Meshes are wound CCW seen from outside.
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some(FRAGMENT_ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }

    /// Uploads `uniform` and binds it against this pipeline's layout.
    pub fn bind_transform(&self, device: &wgpu::Device, uniform: CameraUniform) -> UniformBinding {
        UniformBinding::new(device, &self.bind_group_layout, uniform)
    }

    /// Binds the pipeline, `binding`, and the mesh buffers, then draws every index once.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, binding: &UniformBinding) {
        render_pass.push_debug_group("Prepare data for draw.");
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &binding.bind_group, &[]);
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.pop_debug_group();
        render_pass.insert_debug_marker("Draw!");
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
