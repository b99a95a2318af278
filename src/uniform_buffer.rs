//! # Uniform Buffer
//!
//! This module defines [`CameraUniform`], the CPU-side payload of the only uniform the sphere
//! shader reads: the combined camera transform computed by [`crate::camera::compute_transform`].
//!
//! ## Memory Layout
//!
//! - `#[repr(C)]` keeps the field at offset 0 with no hidden padding.
//! - `bytemuck::Pod` and `bytemuck::Zeroable` allow the struct to be cast to bytes for upload.
//! - `nalgebra_glm::Mat4` stores its elements column-major, which is the order WGSL expects for a
//!   `mat4x4<f32>`.
//!
//! The struct is exactly 64 bytes, and [`CameraUniform::SIZE`] is the minimum binding size declared
//! by the bind group layout in [`crate::uniform_binding`].

use nalgebra_glm::Mat4;

/// The transform uniform bound at `@group(0) @binding(0)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Clip-space transform: remap × projection × view × model.
    pub transform: Mat4,
}

impl CameraUniform {
    /// Size of the uniform in bytes; one 4×4 `f32` matrix.
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<CameraUniform>() as wgpu::BufferAddress;

    pub fn new(transform: Mat4) -> Self {
        Self { transform }
    }

    /// The transform packed column-major, as it is laid out in the uniform buffer.
    pub fn to_cols_array(&self) -> [f32; 16] {
        let mut columns = [0.0; 16];
        columns.copy_from_slice(self.transform.as_slice());
        columns
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::identity())
    }
}
