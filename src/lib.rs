//! Adaptive palette and contrast engine.
//!
//! Samples an RGBA image, quantizes the opaque pixels into a coarse color
//! grid, ranks the most frequent cells into a palette and picks an accessible
//! background/foreground pair from it. [`engine::Engine`] keeps that choice
//! stable across image changes, regenerate requests and manual overrides.

pub mod cli;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod theme;
pub mod worker;

pub use color::Color;
pub use config::{AnalysisConfig, EngineConfig, ThemePolicy};
pub use engine::{Engine, SharedEngine};
pub use error::{AnalysisError, TransitionError};
pub use pipeline::rank::Palette;
pub use pipeline::select::ColorPair;
