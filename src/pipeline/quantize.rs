use std::collections::HashMap;

use crate::color::Color;
use crate::error::AnalysisError;

/// A quantized color cell.
///
/// Channels are multiples of the quantization step and may reach 256 when
/// 255 rounds up, so they are kept wider than a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bin {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Bin {
    /// Snap a color onto the grid, rounding each channel half-up.
    pub fn quantize(color: Color, step: u16) -> Self {
        let step = step.max(1);
        let snap = |c: u8| (u16::from(c) + step / 2) / step * step;
        Self {
            r: snap(color.r),
            g: snap(color.g),
            b: snap(color.b),
        }
    }

    /// The 24-bit color for this bin; channels above 255 saturate.
    pub fn to_color(self) -> Color {
        let clamp = |c: u16| c.min(255) as u8;
        Color::new(clamp(self.r), clamp(self.g), clamp(self.b))
    }
}

/// Frequency histogram of quantized bins that remembers first-encounter order.
#[derive(Debug, Clone)]
pub struct Histogram {
    step: u16,
    entries: Vec<(Bin, usize)>,
    index: HashMap<Bin, usize>,
}

impl Histogram {
    pub fn new(step: u16) -> Self {
        Self {
            step: step.max(1),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, sample: Color) {
        self.add_bin(Bin::quantize(sample, self.step), 1);
    }

    fn add_bin(&mut self, bin: Bin, count: usize) {
        match self.index.get(&bin) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.index.insert(bin, self.entries.len());
                self.entries.push((bin, count));
            }
        }
    }

    /// Fold another histogram in. Counts add up; bins new to `self` are
    /// ordered after the existing ones, in `other`'s encounter order.
    pub fn merge(&mut self, other: &Histogram) {
        for &(bin, count) in &other.entries {
            self.add_bin(bin, count);
        }
    }

    /// Bins with counts, in first-encounter order.
    pub fn entries(&self) -> &[(Bin, usize)] {
        &self.entries
    }

    pub fn count(&self, bin: Bin) -> usize {
        self.index.get(&bin).map_or(0, |&slot| self.entries[slot].1)
    }

    pub fn distinct_bins(&self) -> usize {
        self.entries.len()
    }

    pub fn total_samples(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accumulate a histogram from a sample stream.
pub fn quantize<I>(samples: I, step: u16) -> Result<Histogram, AnalysisError>
where
    I: IntoIterator<Item = Color>,
{
    let mut histogram = Histogram::new(step);
    for sample in samples {
        histogram.add(sample);
    }
    if histogram.is_empty() {
        return Err(AnalysisError::EmptyHistogram);
    }
    Ok(histogram)
}
