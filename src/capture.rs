//! # Capture Module
//!
//! Moves a rendered frame from the GPU into a PNG file.
//!
//! ## Row padding
//!
//! wgpu requires the `bytes_per_row` of a texture-to-buffer copy to be a multiple of an alignment
//! constant (`wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`, 256 bytes). A row of the readback buffer is
//! therefore [`RowPadding::padded`] bytes long even though only [`RowPadding::unpadded`] of them
//! hold pixels. Declaring the logical row width as the copy stride instead would shift every row
//! after the first.
//!
//! ## Capture sequence
//!
//! [`CaptureTarget::capture_to_image`] runs these steps strictly in order:
//!
//! 1. Map the readback buffer for reading and wait until the copy has executed.
//! 2. Keep the first `unpadded` bytes of each of the `height` padded rows.
//! 3. Unmap the buffer so the next frame can copy into it again.
//! 4. Encode the packed pixels as an 8-bit RGB PNG, dropping alpha.
//! 5. Write the PNG next to its destination and rename it into place.
//!
//! Steps 2, 4 and 5 are plain functions ([`pack_rows`], [`encode_png`], [`write_atomically`]) and
//! are tested without a device.

use std::path::{Path, PathBuf};

use image::ImageEncoder;

use crate::error::{Error, Result};
use crate::gpu::Gpu;

/// Color format of the render target: 4 bytes per pixel, sRGB-encoded on write.
pub const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Bytes per pixel of [`CAPTURE_FORMAT`].
pub const BYTES_PER_PIXEL: u32 = 4;

/// Logical and padded byte length of one image row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowPadding {
    /// `width * 4`: the bytes that hold pixels.
    pub unpadded: u32,
    /// `unpadded` rounded up to the next multiple of the alignment.
    pub padded: u32,
}

impl RowPadding {
    /// Computes the padding of a `width`-pixel row for `alignment`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if `alignment` is zero or a padded row does not fit in `u32`.
    ///
    /// # Example
    ///
    /// ```
    /// use sphere_capture::RowPadding;
    ///
    /// let padding = RowPadding::new(1000, 256).unwrap();
    /// assert_eq!(padding.unpadded, 4000);
    /// assert_eq!(padding.padded, 4096);
    /// ```
    pub fn new(width: u32, alignment: u32) -> Result<Self> {
        if alignment == 0 {
            return Err(Error::InvalidConfig(
                "row alignment must be positive".to_string(),
            ));
        }
        let too_wide = || {
            Error::InvalidConfig(format!(
                "a {width}-pixel row does not fit a {alignment}-byte aligned copy"
            ))
        };
        let unpadded = width.checked_mul(BYTES_PER_PIXEL).ok_or_else(too_wide)?;
        let padded = unpadded
            .div_ceil(alignment)
            .checked_mul(alignment)
            .ok_or_else(too_wide)?;
        Ok(Self { unpadded, padded })
    }

    /// Padding for the device's own copy alignment.
    pub fn for_width(width: u32) -> Result<Self> {
        Self::new(width, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
    }

    /// Size of a readback buffer holding `height` padded rows.
    pub fn buffer_size(&self, height: u32) -> wgpu::BufferAddress {
        self.padded as wgpu::BufferAddress * height as wgpu::BufferAddress
    }
}

/// The offscreen color target and the buffer it is read back through.
pub struct CaptureTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    readback: wgpu::Buffer,
    width: u32,
    height: u32,
    padding: RowPadding,
}

impl CaptureTarget {
    /// Allocates a `width`×`height` color target and its readback buffer.
    ///
    /// Texture and buffer creation report limit violations through the device's error scopes, so
    /// callers run this inside [`Gpu::validated`].
    pub fn new(device: &wgpu::Device, width: u32, height: u32, alignment: u32) -> Result<Self> {
        let padding = RowPadding::new(width, alignment)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Readback Buffer"),
            size: padding.buffer_size(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        log::debug!(
            "capture target {width}x{height}: {} bytes per row, padded to {}",
            padding.unpadded,
            padding.padded
        );

        Ok(Self {
            texture,
            view,
            readback,
            width,
            height,
            padding,
        })
    }

    /// The view render passes draw into.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Records a copy of the whole color target into the readback buffer, one padded row per
    /// image row.
    pub fn copy_to_buffer(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padding.padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Maps the readback buffer once `submission` has executed.
    ///
    /// This is the only suspension point of a frame: the map request and the queue drain resolve
    /// through one future, and the buffer is not touched before it completes.
    async fn map_read(&self, gpu: &Gpu, submission: wgpu::SubmissionIndex) -> Result<()> {
        let (sender, receiver) = futures::channel::oneshot::channel();
        self.readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                if sender.send(result).is_err() {
                    log::error!("Readback map finished after its receiver was dropped!");
                }
            });

        let status = gpu
            .device
            .poll(wgpu::Maintain::WaitForSubmissionIndex(submission));
        log::debug!(
            "readback poll finished, queue empty: {}",
            status.is_queue_empty()
        );

        receiver
            .await
            .map_err(|_| Error::Mapping("map callback dropped without a result".to_string()))??;
        Ok(())
    }

    /// Reads the frame produced by `submission` back and writes it to `path` as a PNG.
    ///
    /// # Errors
    ///
    /// - [`Error::Mapping`] if mapping fails or the mapped range is smaller than the image.
    /// - [`Error::Image`] / [`Error::Io`] if encoding or writing fails. Nothing is left at `path`
    ///   in that case.
    pub async fn capture_to_image(
        &self,
        gpu: &Gpu,
        submission: wgpu::SubmissionIndex,
        path: &Path,
    ) -> Result<()> {
        self.map_read(gpu, submission).await?;

        let packed = {
            let mapped = self.readback.slice(..).get_mapped_range();
            pack_rows(&mapped, self.padding, self.height)
        };
        self.readback.unmap();

        let png = encode_png(&packed?, self.width, self.height)?;
        write_atomically(path, &png)
    }
}

/// Strips row padding: keeps the first `padding.unpadded` bytes of each of `height` rows.
///
/// # Errors
///
/// [`Error::Mapping`] if `mapped` is shorter than `height` padded rows.
pub fn pack_rows(mapped: &[u8], padding: RowPadding, height: u32) -> Result<Vec<u8>> {
    let padded = padding.padded as usize;
    let unpadded = padding.unpadded as usize;
    let rows = height as usize;

    if mapped.len() < padded * rows {
        return Err(Error::Mapping(format!(
            "mapped {} bytes, {rows} rows of {padded} bytes need {}",
            mapped.len(),
            padded * rows
        )));
    }

    let mut packed = Vec::with_capacity(unpadded * rows);
    for row in mapped.chunks_exact(padded).take(rows) {
        packed.extend_from_slice(&row[..unpadded]);
    }
    Ok(packed)
}

/// Encodes tightly packed RGBA8 pixels as an RGB8 PNG. Alpha is dropped.
///
/// # Errors
///
/// [`Error::Mapping`] if `packed` is not exactly `width * height * 4` bytes.
pub fn encode_png(packed: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = width as usize * height as usize * BYTES_PER_PIXEL as usize;
    if packed.len() != expected {
        return Err(Error::Mapping(format!(
            "{width}x{height} image needs {expected} bytes, got {}",
            packed.len()
        )));
    }

    let rgb: Vec<u8> = packed
        .chunks_exact(BYTES_PER_PIXEL as usize)
        .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
        .collect();

    let mut png = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png).write_image(
        &rgb,
        width,
        height,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(png)
}

/// Writes `bytes` to a sibling `.partial` file and renames it to `path`.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let written = std::fs::write(&partial, bytes).and_then(|()| std::fs::rename(&partial, path));
    if let Err(error) = written {
        if let Err(cleanup) = std::fs::remove_file(&partial) {
            log::debug!("no partial file to remove at {}: {cleanup}", partial.display());
        }
        return Err(error.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a padded readback image whose padding bytes are all `0xEE`.
    fn padded_source(width: u32, height: u32, alignment: u32) -> (Vec<u8>, Vec<u8>) {
        let padding = RowPadding::new(width, alignment).unwrap();
        let mut source = vec![0xEE; padding.buffer_size(height) as usize];
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let pixel = [(x * 7) as u8, (y * 13) as u8, (x + y) as u8, 0x80];
                let offset = (y * padding.padded + x * BYTES_PER_PIXEL) as usize;
                source[offset..offset + 4].copy_from_slice(&pixel);
                pixels.extend_from_slice(&pixel);
            }
        }
        (source, pixels)
    }

    #[test]
    fn row_padding_law() {
        for alignment in [64, 256, 512] {
            for width in 1..=1200 {
                let padding = RowPadding::new(width, alignment).unwrap();
                assert_eq!(padding.unpadded, width * 4);
                assert!(padding.padded >= padding.unpadded);
                assert_eq!(padding.padded % alignment, 0);
                assert!(padding.padded - padding.unpadded < alignment);
            }
        }
    }

    #[test]
    fn device_alignment_is_256() {
        assert_eq!(
            RowPadding::for_width(1000).unwrap(),
            RowPadding::new(1000, 256).unwrap()
        );
        assert_eq!(RowPadding::for_width(64).unwrap().padded, 256);
        assert_eq!(RowPadding::for_width(65).unwrap().padded, 512);
    }

    #[test]
    fn oversized_rows_are_rejected_instead_of_overflowing() {
        for (width, alignment) in [(1 << 30, 256), (u32::MAX, 256), ((u32::MAX - 255) / 4, 512)] {
            assert!(
                matches!(RowPadding::new(width, alignment), Err(Error::InvalidConfig(_))),
                "width {width} with alignment {alignment} was accepted"
            );
        }
        assert!(matches!(RowPadding::new(100, 0), Err(Error::InvalidConfig(_))));

        let widest = RowPadding::new((u32::MAX - 255) / 4, 256).unwrap();
        assert_eq!(widest.padded % 256, 0);
    }

    #[test]
    fn pack_rows_drops_padding() {
        let (source, pixels) = padded_source(37, 5, 256);
        let packed = pack_rows(&source, RowPadding::new(37, 256).unwrap(), 5).unwrap();
        assert_eq!(packed.len(), 37 * 4 * 5);
        assert_eq!(packed, pixels);
        assert!(!packed.contains(&0xEE));
    }

    #[test]
    fn pack_rows_without_padding_is_identity() {
        let (source, pixels) = padded_source(64, 3, 256);
        assert_eq!(pack_rows(&source, RowPadding::new(64, 256).unwrap(), 3).unwrap(), pixels);
    }

    #[test]
    fn short_mapping_is_rejected() {
        let padding = RowPadding::new(10, 256).unwrap();
        let mapped = vec![0; padding.buffer_size(4) as usize - 1];
        assert!(matches!(
            pack_rows(&mapped, padding, 4),
            Err(Error::Mapping(_))
        ));
    }

    #[test]
    fn capture_round_trip_preserves_rgb() {
        let (width, height) = (37, 5);
        let (source, pixels) = padded_source(width, height, 256);
        let packed = pack_rows(&source, RowPadding::new(width, 256).unwrap(), height).unwrap();
        let png = encode_png(&packed, width, height).unwrap();

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        let decoded = decoded.to_rgb8();
        assert_eq!(decoded.dimensions(), (width, height));

        let expected: Vec<u8> = pixels
            .chunks_exact(4)
            .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
            .collect();
        assert_eq!(decoded.into_raw(), expected);
    }

    #[test]
    fn encode_rejects_wrong_length() {
        assert!(matches!(
            encode_png(&[0; 15], 2, 2),
            Err(Error::Mapping(_))
        ));
    }

    #[test]
    fn write_atomically_replaces_file_and_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        write_atomically(&path, b"first").unwrap();
        write_atomically(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.png")]);
    }

    #[test]
    fn write_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_atomically(&path, b"png"), Err(Error::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_the_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the destination makes the rename fail after the write succeeded.
        let path = dir.path().join("out.png");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(matches!(write_atomically(&path, b"png"), Err(Error::Io(_))));
        assert!(!dir.path().join("out.png.partial").exists());
        assert!(path.join("keep").exists());
    }
}
