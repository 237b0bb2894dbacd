use std::ops::Range;

use image::RgbaImage;

use crate::color::Color;
use crate::error::AnalysisError;

const CHANNELS: usize = 4;

/// An opaque pixel picked by the sampler. Alpha has already been dropped.
pub type PixelSample = Color;

/// A borrowed RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, Copy)]
pub struct Raster<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Raster<'a> {
    /// Wrap a raw buffer. The length must be exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, AnalysisError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or_else(|| {
                AnalysisError::DecodeUnavailable(format!("image too large: {width}x{height}"))
            })?;
        if data.len() != expected {
            return Err(AnalysisError::DecodeUnavailable(format!(
                "pixel buffer holds {} bytes, expected {expected} for {width}x{height} RGBA",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_image(image: &'a RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.as_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Opaque samples over the whole buffer.
    pub fn samples(&self, stride: usize, alpha_threshold: u8) -> Samples<'a> {
        self.samples_in(0..self.pixel_count(), stride, alpha_threshold)
    }

    /// Opaque samples over a sub-range of pixel indices.
    ///
    /// A stride of 0 samples every pixel, like a stride of 1;
    /// [`AnalysisConfig::validate`](crate::config::AnalysisConfig::validate)
    /// rejects it before [`analyze`](crate::pipeline::analyze) gets here.
    /// The stride grid is anchored at pixel 0 of the whole buffer, so
    /// concatenating adjacent ranges visits exactly the pixels `samples`
    /// would.
    pub fn samples_in(
        &self,
        pixels: Range<usize>,
        stride: usize,
        alpha_threshold: u8,
    ) -> Samples<'a> {
        let stride = stride.max(1);
        let end = pixels.end.min(self.pixel_count());
        let first = pixels.start.div_ceil(stride) * stride;
        Samples {
            data: self.data,
            next: first,
            end,
            stride,
            alpha_threshold,
        }
    }

    /// Pixel index range covered by the given rows.
    pub fn row_span(&self, rows: Range<u32>) -> Range<usize> {
        let width = self.width as usize;
        let start = rows.start.min(self.height) as usize * width;
        let end = rows.end.min(self.height) as usize * width;
        start..end.max(start)
    }
}

/// Lazy, finite sequence of opaque pixels. Clone it to restart.
#[derive(Debug, Clone)]
pub struct Samples<'a> {
    data: &'a [u8],
    next: usize,
    end: usize,
    stride: usize,
    alpha_threshold: u8,
}

impl Iterator for Samples<'_> {
    type Item = PixelSample;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let offset = self.next * CHANNELS;
            self.next = self.next.saturating_add(self.stride);
            let px = self.data.get(offset..offset + CHANNELS)?;
            if px[3] >= self.alpha_threshold {
                return Some(Color::new(px[0], px[1], px[2]));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end.saturating_sub(self.next).div_ceil(self.stride);
        (0, Some(remaining))
    }
}
