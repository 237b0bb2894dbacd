use thiserror::Error;

/// Reasons an image produced no palette.
///
/// None is fatal: the engine folds each into an empty palette and the
/// default color pair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("image could not be rasterized: {0}")]
    DecodeUnavailable(String),

    #[error("image has no opaque pixels to analyze")]
    EmptyHistogram,

    #[error("invalid analysis settings: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// A state machine action that is not valid in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot regenerate colors: palette is empty")]
    EmptyPalette,

    #[error("manual colors can only be set while auto mode is off")]
    AutoModeActive,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample stride must be at least 1")]
    ZeroStride,

    #[error("quantization step must be between 1 and 255, got {0}")]
    InvalidStep(u16),

    #[error("palette size must be at least 1")]
    ZeroPaletteSize,

    #[error("minimum contrast must be a finite ratio >= 1.0, got {0}")]
    InvalidContrast(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("invalid hex color: expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex color: {0:?} contains non-hex characters")]
    InvalidDigit(String),

    #[error("invalid hex color: {0}")]
    InvalidHex(#[from] std::num::ParseIntError),
}
