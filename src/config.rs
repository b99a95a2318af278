//! # Configuration Module
//!
//! [`RenderConfig`] gathers every tunable of a capture run: target size, sphere strategy and
//! segment count, the row alignment of readback copies, the static/animated mode, and where frames
//! are written. [`RenderConfig::validate`] checks all of it up front, before a device is touched.

use std::path::PathBuf;

use crate::capture::RowPadding;
use crate::error::{Error, Result};
use crate::mesh::SphereStrategy;

/// What a run produces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RenderMode {
    /// One frame with the static camera, written to `out.png`.
    Static,
    /// One frame per rotation angle in `0, step, 2·step, …, 360`, each written to `<angle>.png`.
    Sweep { step_degrees: u32 },
}

/// Settings for one capture run.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub strategy: SphereStrategy,
    pub segments: u32,
    /// Row alignment of the readback buffer, in bytes.
    pub row_alignment: u32,
    pub mode: RenderMode,
    pub out_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::for_strategy(SphereStrategy::default())
    }
}

impl RenderConfig {
    /// A 1000×1000 static run using `strategy` and its default segment count.
    pub fn for_strategy(strategy: SphereStrategy) -> Self {
        Self {
            width: 1000,
            height: 1000,
            strategy,
            segments: strategy.default_segments(),
            row_alignment: wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
            mode: RenderMode::Static,
            out_dir: PathBuf::from("out"),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] for a zero dimension, a zero sweep step, a row alignment that is
    ///   not a positive multiple of `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`, or a padded row that does
    ///   not fit in `u32`.
    /// - [`Error::InvalidMesh`] for a segment count the strategy cannot index with `u16`.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(format!(
                "render target must not be empty, got {}x{}",
                self.width, self.height
            )));
        }
        let device_alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        if self.row_alignment == 0 || self.row_alignment % device_alignment != 0 {
            return Err(Error::InvalidConfig(format!(
                "row alignment {} is not a positive multiple of {device_alignment}",
                self.row_alignment
            )));
        }
        RowPadding::new(self.width, self.row_alignment)?;
        if let RenderMode::Sweep { step_degrees: 0 } = self.mode {
            return Err(Error::InvalidConfig("sweep step must be positive".to_string()));
        }
        let max = self.strategy.max_segments();
        if self.segments == 0 || self.segments > max {
            return Err(Error::InvalidMesh(format!(
                "{} segments requested, the {} strategy accepts 1..={max}",
                self.segments, self.strategy
            )));
        }
        Ok(())
    }

    /// Checks the render target against what `limits` allow a device to allocate.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if either dimension exceeds `max_texture_dimension_2d` or the
    /// padded readback buffer exceeds `max_buffer_size`.
    pub fn check_limits(&self, limits: &wgpu::Limits) -> Result<()> {
        let max_dimension = limits.max_texture_dimension_2d;
        if self.width > max_dimension || self.height > max_dimension {
            return Err(Error::InvalidConfig(format!(
                "render target {}x{} exceeds the device limit of {max_dimension} pixels per side",
                self.width, self.height
            )));
        }
        let buffer_size = RowPadding::new(self.width, self.row_alignment)?.buffer_size(self.height);
        if buffer_size > limits.max_buffer_size {
            return Err(Error::InvalidConfig(format!(
                "readback buffer of {buffer_size} bytes exceeds the device limit of {}",
                limits.max_buffer_size
            )));
        }
        Ok(())
    }

    /// Rotation angles of the frames to render; `None` is the static frame.
    pub fn frame_angles(&self) -> Vec<Option<u32>> {
        match self.mode {
            RenderMode::Static => vec![None],
            RenderMode::Sweep { step_degrees } => (0..=360)
                .step_by(step_degrees.max(1) as usize)
                .map(Some)
                .collect(),
        }
    }

    /// Output file of the frame at `angle`.
    pub fn frame_path(&self, angle: Option<u32>) -> PathBuf {
        match angle {
            Some(angle) => self.out_dir.join(format!("{angle}.png")),
            None => self.out_dir.join("out.png"),
        }
    }
}
