//! Tunables for palette extraction and theme selection.
//!
//! The defaults reproduce the classic behaviour: every 5th pixel, a 32-wide
//! quantization grid, alpha cut-off at 128 and a ten color palette.

use crate::error::ConfigError;

pub const DEFAULT_STRIDE: usize = 5;
pub const DEFAULT_QUANT_STEP: u16 = 32;
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;
pub const DEFAULT_PALETTE_SIZE: usize = 10;
pub const DEFAULT_MIN_CONTRAST: f64 = 3.0;

/// Parameters for sampling, quantizing and ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Sample every `stride`-th pixel in row-major order.
    pub stride: usize,
    /// Per-channel quantization grid width.
    pub quant_step: u16,
    /// Pixels with alpha below this are ignored.
    pub alpha_threshold: u8,
    /// Maximum number of palette entries (K).
    pub palette_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            quant_step: DEFAULT_QUANT_STEP,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            palette_size: DEFAULT_PALETTE_SIZE,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if self.quant_step == 0 || self.quant_step > 255 {
            return Err(ConfigError::InvalidStep(self.quant_step));
        }
        if self.palette_size == 0 {
            return Err(ConfigError::ZeroPaletteSize);
        }
        Ok(())
    }
}

/// How the theme selector judges a foreground candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePolicy {
    /// A palette foreground is accepted at or above this contrast ratio.
    pub min_contrast: f64,
}

impl Default for ThemePolicy {
    fn default() -> Self {
        Self {
            min_contrast: DEFAULT_MIN_CONTRAST,
        }
    }
}

impl ThemePolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_contrast.is_finite() || self.min_contrast < 1.0 {
            return Err(ConfigError::InvalidContrast(self.min_contrast));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub theme: ThemePolicy,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.theme.validate()
    }
}
