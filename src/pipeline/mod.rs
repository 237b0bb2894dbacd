//! Image → palette → color pair.
//!
//! Sampling, quantization and ranking run synchronously on the caller's
//! thread; [`analyze_sharded`] splits the work by rows when throughput
//! matters.

pub mod contrast;
pub mod extract;
pub mod quantize;
pub mod rank;
pub mod sample;
pub mod select;

use std::thread;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use quantize::{quantize, Histogram};
use rank::{rank, Palette};
use sample::Raster;

/// Extract the ranked palette of `raster`.
///
/// Fails with [`AnalysisError::InvalidConfig`] before touching any pixel if
/// `config` does not validate.
pub fn analyze(raster: &Raster<'_>, config: &AnalysisConfig) -> Result<Palette, AnalysisError> {
    config.validate()?;
    let samples = raster.samples(config.stride, config.alpha_threshold);
    let histogram = quantize(samples, config.quant_step)?;
    Ok(finish(histogram, config))
}

/// Same result as [`analyze`], with row bands histogrammed on separate threads.
pub fn analyze_sharded(
    raster: &Raster<'_>,
    config: &AnalysisConfig,
    shards: usize,
) -> Result<Palette, AnalysisError> {
    config.validate()?;
    let height = raster.height();
    let shards = shards.clamp(1, height.max(1) as usize) as u32;
    let band = height.div_ceil(shards).max(1);

    let partials: Vec<Histogram> = thread::scope(|scope| {
        let handles: Vec<_> = (0..shards)
            .map(|i| {
                let rows = (i * band)..((i + 1) * band).min(height);
                scope.spawn(move || {
                    let mut histogram = Histogram::new(config.quant_step);
                    let span = raster.row_span(rows);
                    for sample in raster.samples_in(span, config.stride, config.alpha_threshold) {
                        histogram.add(sample);
                    }
                    histogram
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut merged = Histogram::new(config.quant_step);
    for partial in &partials {
        merged.merge(partial);
    }
    if merged.is_empty() {
        return Err(AnalysisError::EmptyHistogram);
    }
    Ok(finish(merged, config))
}

fn finish(histogram: Histogram, config: &AnalysisConfig) -> Palette {
    let palette = rank(&histogram, config.palette_size);
    tracing::debug!(
        samples = histogram.total_samples(),
        bins = histogram.distinct_bins(),
        palette = palette.len(),
        "palette extracted"
    );
    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::error::ConfigError;

    fn striped(width: u32, height: u32) -> image::RgbaImage {
        image::RgbaImage::from_fn(width, height, |x, y| {
            let v = ((x * 37 + y * 11) % 256) as u8;
            image::Rgba([v, 255 - v, (x * y % 256) as u8, if (x + y) % 7 == 0 { 0 } else { 255 }])
        })
    }

    #[test]
    fn two_pixel_image_yields_both_colors() {
        let data: [u8; 8] = [255, 0, 0, 255, 0, 0, 255, 255];
        let raster = Raster::new(2, 1, &data).unwrap();
        let config = AnalysisConfig {
            stride: 1,
            ..Default::default()
        };
        let palette = analyze(&raster, &config).unwrap();
        assert_eq!(
            palette.colors(),
            &[Color::new(255, 0, 0), Color::new(0, 0, 255)]
        );
    }

    #[test]
    fn transparent_image_is_empty_histogram() {
        let data = [9u8, 9, 9, 0].repeat(25);
        let raster = Raster::new(5, 5, &data).unwrap();
        let err = analyze(&raster, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyHistogram);
    }

    #[test]
    fn sharded_matches_sequential() {
        let image = striped(53, 41);
        let raster = Raster::from_image(&image);
        let config = AnalysisConfig::default();
        let expected = analyze(&raster, &config).unwrap();
        for shards in [1, 2, 3, 8, 100] {
            assert_eq!(analyze_sharded(&raster, &config, shards).unwrap(), expected);
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_sampling() {
        let data = [200u8, 10, 10, 255].repeat(4);
        let raster = Raster::new(2, 2, &data).unwrap();
        let no_colors = AnalysisConfig {
            palette_size: 0,
            ..Default::default()
        };
        assert_eq!(
            analyze(&raster, &no_colors),
            Err(AnalysisError::InvalidConfig(ConfigError::ZeroPaletteSize))
        );
        assert_eq!(
            analyze_sharded(&raster, &no_colors, 2),
            Err(AnalysisError::InvalidConfig(ConfigError::ZeroPaletteSize))
        );

        let no_stride = AnalysisConfig {
            stride: 0,
            ..Default::default()
        };
        assert_eq!(
            analyze(&raster, &no_stride),
            Err(AnalysisError::InvalidConfig(ConfigError::ZeroStride))
        );
    }

    #[test]
    fn sharded_empty_image_is_empty_histogram() {
        let raster = Raster::new(0, 0, &[]).unwrap();
        assert_eq!(
            analyze_sharded(&raster, &AnalysisConfig::default(), 4).unwrap_err(),
            AnalysisError::EmptyHistogram
        );
    }
}
