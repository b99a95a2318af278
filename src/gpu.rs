//! # GPU Management Module
//!
//! The `gpu` module acquires the device and queue the renderer submits to, and scopes that
//! acquisition to one owned [`Gpu`] handle instead of process-wide state.
//!
//! ## Overview
//!
//! Rendering is headless: no window or surface is involved, so adapters are requested with
//! `compatible_surface: None`. Acquisition walks a short list of adapter preferences and takes the
//! first one that yields a device:
//!
//! 1. a high-performance (usually discrete) adapter,
//! 2. a low-power (usually integrated) adapter,
//! 3. the fallback adapter, typically a software rasterizer.
//!
//! Only when every preference fails is [`Error::DeviceUnavailable`] returned.
//!
//! ## Validation
//!
//! wgpu reports configuration mistakes asynchronously. [`Gpu::validated`] wraps a piece of work in
//! a `Validation` error scope and turns whatever the scope caught into [`Error::Validation`], so a
//! bad pipeline or an invalid copy surfaces as a `Result` instead of reaching the uncaptured-error
//! handler.
//!
//! ## Example Usage
//!
//! ```ignore
//! let gpu = sphere_capture::Gpu::new()?;
//! log::info!("rendering on {}", gpu.adapter_info.name);
//! gpu.shutdown();
//! ```

use crate::error::{Error, Result};

/// Adapter preferences, tried in order.
const ADAPTER_PREFERENCES: [(wgpu::PowerPreference, bool); 3] = [
    (wgpu::PowerPreference::HighPerformance, false),
    (wgpu::PowerPreference::LowPower, false),
    (wgpu::PowerPreference::None, true),
];

/// An owned device/queue pair.
///
/// Everything created from `device` belongs to the owner of this handle. Call [`Gpu::shutdown`]
/// to tear the device down explicitly once rendering is finished.
pub struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl Gpu {
    /// Blocking wrapper around [`Gpu::new_async`].
    pub fn new() -> Result<Self> {
        pollster::block_on(Self::new_async())
    }

    /// Requests a headless adapter and device, falling back through [`ADAPTER_PREFERENCES`].
    ///
    /// # Errors
    ///
    /// [`Error::DeviceUnavailable`] when no adapter produced a device.
    pub async fn new_async() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let mut last_error = None;

        for (power_preference, force_fallback_adapter) in ADAPTER_PREFERENCES {
            let Some(adapter) = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference,
                    compatible_surface: None,
                    force_fallback_adapter,
                })
                .await
            else {
                log::warn!(
                    "No adapter for {power_preference:?} (fallback: {force_fallback_adapter})"
                );
                continue;
            };

            match Self::request_device(adapter).await {
                Ok(gpu) => return Ok(gpu),
                Err(error) => {
                    log::warn!("Adapter rejected device request: {error}");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::DeviceUnavailable("no graphics adapter found".to_string())
        }))
    }

    async fn request_device(adapter: wgpu::Adapter) -> Result<Self> {
        let adapter_info = adapter.get_info();
        log::info!(
            "WGPU Adapter: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );
        log::debug!("WGPU Adapter Features: {:#?}", adapter.features());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sphere Capture Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }

    /// Runs `work` inside a validation error scope.
    ///
    /// # Returns
    ///
    /// The value produced by `work`, or [`Error::Validation`] carrying the message of the first
    /// validation error raised while it ran. The value is dropped in the error case, so a
    /// half-valid object never reaches the caller.
    pub async fn validated<T>(&self, work: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = work(&self.device);
        match self.device.pop_error_scope().await {
            Some(error) => Err(error.into()),
            None => Ok(value),
        }
    }

    /// Destroys the device. Resources created from it become invalid.
    pub fn shutdown(self) {
        log::debug!("Destroying device on {}", self.adapter_info.name);
        self.device.destroy();
    }
}
