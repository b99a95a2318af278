//! # Error Module
//!
//! Crate-wide error type. Every fallible operation in the renderer returns [`Result`], and each
//! variant maps to one failure class of the capture pipeline:
//!
//! - [`Error::DeviceUnavailable`]: no adapter or device could be acquired. Fatal at startup.
//! - [`Error::Validation`]: wgpu rejected a pipeline, binding, shader, or command. Surfaced from an
//!   explicit validation error scope, never from the uncaptured-error handler.
//! - [`Error::Mapping`]: the readback buffer could not be mapped, or its mapped size disagrees with
//!   the declared image dimensions.
//! - [`Error::InvalidMesh`] / [`Error::InvalidConfig`]: rejected before any GPU work starts.

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no compatible graphics device: {0}")]
    DeviceUnavailable(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("buffer mapping error: {0}")]
    Mapping(String),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read shader source {path}: {source}")]
    ShaderSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<wgpu::Error> for Error {
    fn from(error: wgpu::Error) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<wgpu::BufferAsyncError> for Error {
    fn from(error: wgpu::BufferAsyncError) -> Self {
        Self::Mapping(error.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for Error {
    fn from(error: wgpu::RequestDeviceError) -> Self {
        Self::DeviceUnavailable(error.to_string())
    }
}
