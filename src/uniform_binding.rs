//! # Uniform Binding Module
//!
//! Binds the [`CameraUniform`] to the vertex shader.
//!
//! The bind group layout is created once, together with the pipeline, and describes one uniform
//! buffer at binding 0 that only the vertex stage can see. Its `min_binding_size` is the size of
//! the uniform (64 bytes), so a buffer of the wrong size is rejected by validation when the bind
//! group is created rather than producing garbage at draw time.
//!
//! A [`UniformBinding`] pairs a buffer holding one transform with the bind group that references
//! it. The animated sweep builds a fresh binding for every frame; a static frame builds one and
//! keeps it.

use crate::uniform_buffer::CameraUniform;

/// A uniform buffer holding one camera transform and the bind group referencing it.
pub struct UniformBinding {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl UniformBinding {
    /// Creates the bind group layout shared by every [`UniformBinding`] of a pipeline.
    pub fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(CameraUniform::SIZE),
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        })
    }

    /// Uploads `uniform` into a new buffer and binds it against `layout`.
    ///
    /// # Parameters
    ///
    /// - `device`: the device owning `layout`.
    /// - `layout`: the layout returned by [`UniformBinding::create_layout`].
    /// - `uniform`: the transform to upload.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform: CameraUniform,
    ) -> Self {
        let buffer = wgpu::util::DeviceExt::create_buffer_init(
            device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            },
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self { buffer, bind_group }
    }
}
