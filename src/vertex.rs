//! # Vertex Module
//!
//! This module provides the `Vertex` struct used by the sphere meshes and the methods that describe
//! its memory layout to the GPU.
//!
//! Each vertex carries a homogeneous position and a texture coordinate. The GPU reads them from the
//! vertex buffer through the layout returned by [`Vertex::description`], which must agree with the
//! `VertexInput` struct of the shader:
//!
//! | Location | Field       | Format      | Offset |
//! |----------|-------------|-------------|--------|
//! | 0        | `position`  | `Float32x4` | 0      |
//! | 1        | `tex_coord` | `Float32x2` | 16     |
//!
//! The stride of a single vertex is 24 bytes.
//!
//! ## Usage
//!
//! ```ignore
//! use wgpu::util::DeviceExt;
//!
//! let mesh = sphere_capture::generate(sphere_capture::SphereStrategy::Grid, 16)?;
//! let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
//!     label: Some("Vertex Buffer"),
//!     contents: bytemuck::cast_slice(&mesh.vertices),
//!     usage: wgpu::BufferUsages::VERTEX,
//! });
//! ```
//!
//! # Crate Dependencies
//!
//! - `wgpu` for the vertex attributes and buffer layouts.
//! - `bytemuck` for casting vertex slices to raw bytes.

/// A single sphere vertex.
///
/// `#[repr(C)]` together with `bytemuck::Pod` lets a `&[Vertex]` be uploaded as-is. The fourth
/// position component is always `1.0`: the mesh is generated in model space and no perspective
/// divide is baked in.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Homogeneous position `[x, y, z, 1.0]`.
    pub position: [f32; 4],

    /// Texture coordinate `[u, v]`.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Byte stride of one vertex in the vertex buffer.
    pub const STRIDE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;

    /// Builds a vertex from a model-space point, setting `w` to `1.0`.
    pub fn new(position: [f32; 3], tex_coord: [f32; 2]) -> Self {
        let [x, y, z] = position;
        Self {
            position: [x, y, z, 1.0],
            tex_coord,
        }
    }

    /// Generates the vertex attributes for the `Vertex` struct.
    ///
    /// # Returns
    ///
    /// Two attributes, indexed from 0 in the vertex shader:
    ///
    /// - `position` as a 4-component floating-point vector (`Float32x4`) at offset 0.
    /// - `tex_coord` as a 2-component floating-point vector (`Float32x2`) at offset 16.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x2].to_vec()
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// # Parameters
    ///
    /// - `attributes`: the attributes returned by [`Vertex::vertex_attributes`]. They are borrowed
    ///   by the layout, so the caller keeps them alive for as long as the layout is used.
    ///
    /// # Returns
    ///
    /// A per-vertex `wgpu::VertexBufferLayout` with a 24-byte stride.
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}
