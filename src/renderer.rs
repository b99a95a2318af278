//! # `renderer.rs` - Renderer Module
//!
//! The `Renderer` owns every GPU object of a capture run and turns a camera angle into a PNG file.
//!
//! ## Lifecycle
//!
//! A `Renderer` is only ever observed fully built: [`Renderer::new`] validates the configuration,
//! generates the mesh, builds the [`SpherePipeline`], allocates the [`CaptureTarget`], and binds the
//! initial camera transform, or fails without returning anything. There is no state in which a
//! frame could be requested before the pipeline exists.
//!
//! ## Frames
//!
//! Frames are rendered one at a time. Each [`Renderer::render_to_png`] call records the render
//! pass and the readback copy, submits them, checks the validation scope, then waits for the
//! readback buffer to be mapped and writes the image. The readback buffer is reused by the next
//! frame, so a frame is finished (buffer unmapped, file written) before the call returns.
//!
//! The static camera binds its transform once in [`Renderer::new`]. The animated sweep calls
//! [`Renderer::set_rotation`] before every frame, which computes a fresh transform and builds a new
//! uniform buffer and bind group for it.

use std::path::Path;

use crate::camera::Camera;
use crate::capture::{CaptureTarget, CAPTURE_FORMAT};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::gpu::Gpu;
use crate::mesh;
use crate::pipeline::SpherePipeline;
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::CameraUniform;

pub struct Renderer {
    gpu: Gpu,
    sphere: SpherePipeline,
    camera: Camera,
    aspect_ratio: f32,
    binding: UniformBinding,
    target: CaptureTarget,
}

impl Renderer {
    /// Background color every frame is cleared to.
    pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
        r: 0.1,
        g: 0.2,
        b: 0.3,
        a: 1.0,
    };

    /// Blocking wrapper around [`Renderer::new_async`].
    pub fn new(gpu: Gpu, config: &RenderConfig, shader_source: &str) -> Result<Self> {
        pollster::block_on(Self::new_async(gpu, config, shader_source))
    }

    /// Builds every resource for `config` on `gpu`.
    ///
    /// # Parameters
    ///
    /// - `gpu`: the device to render with. The renderer takes ownership of it.
    /// - `config`: target size, sphere strategy and segment count, row alignment.
    /// - `shader_source`: WGSL exposing `vs_main` and `fs_main`, such as [`crate::SHADER_SOURCE`].
    ///
    /// # Errors
    ///
    /// Configuration and mesh errors before any GPU work, including a target too large for the
    /// device's limits. Then [`crate::Error::Validation`] if the device rejects the pipeline, the
    /// capture target or the initial bind group.
    pub async fn new_async(gpu: Gpu, config: &RenderConfig, shader_source: &str) -> Result<Self> {
        config.validate()?;
        config.check_limits(&gpu.device.limits())?;

        let mesh = mesh::generate(config.strategy, config.segments)?;
        let sphere = SpherePipeline::new(&gpu, &mesh, shader_source, CAPTURE_FORMAT).await?;
        let target = gpu
            .validated(|device| {
                CaptureTarget::new(device, config.width, config.height, config.row_alignment)
            })
            .await??;

        let camera = config.strategy.camera();
        let aspect_ratio = config.aspect_ratio();
        let uniform = CameraUniform::new(camera.transform(aspect_ratio, None));
        let binding = gpu
            .validated(|device| sphere.bind_transform(device, uniform))
            .await?;

        log::info!(
            "Renderer ready: {} sphere, {} segments, {}x{}",
            config.strategy,
            config.segments,
            config.width,
            config.height
        );

        Ok(Self {
            gpu,
            sphere,
            camera,
            aspect_ratio,
            binding,
            target,
        })
    }

    pub fn vertex_count(&self) -> u32 {
        self.sphere.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.sphere.index_count
    }

    /// Rebinds the camera transform with the model rotated by `rotation_degrees` about Z.
    ///
    /// The previous uniform buffer and bind group are dropped; `None` restores the static
    /// transform.
    pub fn set_rotation(&mut self, rotation_degrees: Option<f32>) -> Result<()> {
        let transform = self.camera.transform(self.aspect_ratio, rotation_degrees);
        let uniform = CameraUniform::new(transform);
        self.binding = pollster::block_on(
            self.gpu
                .validated(|device| self.sphere.bind_transform(device, uniform)),
        )?;
        Ok(())
    }

    /// Records the sphere's render pass into `encoder`, drawing into `view`.
    pub fn encode_pass(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sphere Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Self::CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.sphere.draw(&mut render_pass, &self.binding);
    }

    /// Blocking wrapper around [`Renderer::render_to_png_async`].
    pub fn render_to_png(&self, path: &Path) -> Result<()> {
        pollster::block_on(self.render_to_png_async(path))
    }

    /// Renders one frame with the current transform and writes it to `path`.
    pub async fn render_to_png_async(&self, path: &Path) -> Result<()> {
        let submission = self
            .gpu
            .validated(|device| {
                let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Capture Encoder"),
                });
                self.encode_pass(&mut encoder, self.target.view());
                self.target.copy_to_buffer(&mut encoder);
                self.gpu.queue.submit(std::iter::once(encoder.finish()))
            })
            .await?;

        self.target.capture_to_image(&self.gpu, submission, path).await?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    /// Drops every resource, then destroys the device.
    pub fn shutdown(self) {
        let Self {
            gpu,
            sphere,
            binding,
            target,
            ..
        } = self;
        drop((sphere, binding, target));
        gpu.shutdown();
    }
}
