//! # Application Core (`app.rs`)
//!
//! [`App`] drives a capture run from a [`RenderConfig`]: it acquires a device, builds the
//! [`Renderer`], renders every frame the configuration asks for, and tears the device down again.
//!
//! ## Modes
//!
//! - **Static**: a single frame with the unrotated camera, written to `out.png`.
//! - **Sweep**: one frame per rotation angle from 0 to 360 degrees, written to `<angle>.png`.
//!
//! ## Failure handling
//!
//! Device acquisition and pipeline construction failures abort the run. During a sweep, a frame
//! that fails to render or capture is logged and skipped, and the sweep moves on to the next angle;
//! the run only fails if not a single frame was written. A static run fails with its frame.

use std::path::PathBuf;

use crate::config::{RenderConfig, RenderMode};
use crate::error::{Error, Result};
use crate::gpu::Gpu;
use crate::renderer::Renderer;

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files written, in rendering order.
    pub written: Vec<PathBuf>,
    /// Frames that were skipped, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
}

pub struct App {
    config: RenderConfig,
    shader_source: String,
}

impl App {
    pub fn new(config: RenderConfig, shader_source: impl Into<String>) -> Self {
        Self {
            config,
            shader_source: shader_source.into(),
        }
    }

    /// Acquires a device and renders every configured frame on it.
    pub fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        let gpu = Gpu::new()?;
        self.run_on(gpu)
    }

    /// Renders every configured frame on an already acquired device.
    pub fn run_on(&self, gpu: Gpu) -> Result<RunReport> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.out_dir)?;

        let mut renderer = Renderer::new(gpu, &self.config, &self.shader_source)?;
        log::info!(
            "Mesh: {} vertices, {} indices",
            renderer.vertex_count(),
            renderer.index_count()
        );

        let report = match self.config.mode {
            RenderMode::Static => {
                let path = self.config.frame_path(None);
                renderer.render_to_png(&path)?;
                log::info!("Wrote {}", path.display());
                RunReport {
                    written: vec![path],
                    failed: Vec::new(),
                }
            }
            RenderMode::Sweep { .. } => self.sweep(&mut renderer)?,
        };

        renderer.shutdown();
        Ok(report)
    }

    fn sweep(&self, renderer: &mut Renderer) -> Result<RunReport> {
        let mut report = RunReport::default();

        for angle in self.config.frame_angles() {
            let path = self.config.frame_path(angle);
            let frame = renderer
                .set_rotation(angle.map(|degrees| degrees as f32))
                .and_then(|()| renderer.render_to_png(&path));

            match frame {
                Ok(()) => {
                    log::info!("Wrote {}", path.display());
                    report.written.push(path);
                }
                Err(error) => {
                    log::error!("Skipping {}: {error}", path.display());
                    report.failed.push((path, error));
                }
            }
        }

        if report.written.is_empty() {
            if let Some((_, error)) = report.failed.into_iter().next() {
                return Err(error);
            }
            return Err(Error::InvalidConfig("sweep produced no frames".to_string()));
        }
        Ok(report)
    }
}
