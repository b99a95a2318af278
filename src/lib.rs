//! # Sphere Capture Library
//!
//! This library renders a procedurally generated sphere offscreen with `wgpu` and saves the
//! rendered frames as PNG files, either a single frame from a static camera or a sequence of frames
//! sweeping the sphere through a full rotation.
//!
//! ## Modules
//!
//! - [`app`]: Drives a capture run: static frame or rotation sweep.
//! - [`renderer`]: Owns the GPU objects of a run and renders one frame at a time into a PNG.
//! - [`gpu`]: Acquires a headless device and queue, and wraps work in validation error scopes.
//! - [`pipeline`]: Builds the render pipeline and mesh buffers as one immutable bundle.
//! - [`capture`]: Offscreen target, row padding, readback, and PNG encoding.
//! - [`camera`]: Projection × view × rotation, remapped to wgpu's clip space.
//! - [`mesh`]: Sphere generation with two triangulation strategies.
//! - [`vertex`]: Vertex layout shared by the mesh and the shader.
//! - [`uniform_buffer`]: The camera transform uniform.
//! - [`uniform_binding`]: Bind group layout and bind groups for the uniform.
//! - [`config`]: Settings of a run.
//! - [`error`]: The crate's error type.
//!
//! ## Data Flow
//!
//! ```text
//! mesh::generate ──► SpherePipeline (vertex/index buffers, pipeline)
//! camera::compute_transform ──► CameraUniform ──► UniformBinding
//! Renderer::encode_pass ──► capture texture ──► readback buffer ──► PNG file
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sphere_capture::{App, RenderConfig, RenderMode, SphereStrategy, SHADER_SOURCE};
//!
//! let config = RenderConfig {
//!     mode: RenderMode::Sweep { step_degrees: 10 },
//!     ..RenderConfig::for_strategy(SphereStrategy::Grid)
//! };
//! let report = App::new(config, SHADER_SOURCE).run()?;
//! assert_eq!(report.written.len(), 37);
//! # Ok::<(), sphere_capture::Error>(())
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`: device acquisition, pipelines, buffers, and GPU commands.
//! - `nalgebra-glm`: matrix and vector math.
//! - `bytemuck`: casting vertices and uniforms to bytes.
//! - `image`: PNG encoding.
//! - `futures` and `pollster`: awaiting buffer maps and error scopes.
//! - `log`: logging; the binary installs `env_logger`.
//! - `thiserror`: the [`Error`] type.

pub mod app;
pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

pub use crate::app::{App, RunReport};
pub use crate::camera::{compute_transform, opengl_to_wgpu_matrix, Camera};
pub use crate::capture::{encode_png, pack_rows, CaptureTarget, RowPadding, CAPTURE_FORMAT};
pub use crate::config::{RenderConfig, RenderMode};
pub use crate::error::{Error, Result};
pub use crate::gpu::Gpu;
pub use crate::mesh::{generate, Mesh, SphereStrategy};
pub use crate::pipeline::SpherePipeline;
pub use crate::renderer::Renderer;
pub use crate::uniform_binding::UniformBinding;
pub use crate::uniform_buffer::CameraUniform;
pub use crate::vertex::Vertex;

/// The built-in WGSL shader.
///
/// ### Uniform
///
/// - `camera.transform` at `@group(0) @binding(0)`: the 4×4 clip-space transform, visible to the
///   vertex stage only.
///
/// ### Vertex Stage (`vs_main`)
///
/// - `@location(0) position: vec4<f32>` and `@location(1) tex_coord: vec2<f32>`, matching
///   [`Vertex`].
///
/// ### Fragment Stage (`fs_main`)
///
/// Writes one color: a checkerboard over the texture coordinates. The render target is sRGB, so
/// the output is gamma-encoded on store.
pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");
