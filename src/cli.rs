use std::path::PathBuf;

use clap::Parser;

use crate::color::Color;
use crate::config::{AnalysisConfig, EngineConfig, ThemePolicy};
use crate::config::{
    DEFAULT_ALPHA_THRESHOLD, DEFAULT_MIN_CONTRAST, DEFAULT_PALETTE_SIZE, DEFAULT_QUANT_STEP,
    DEFAULT_STRIDE,
};

/// Pick accessible card colors from an image's dominant palette.
#[derive(Parser, Debug)]
#[command(name = "cardtone", version, about)]
pub struct Args {
    /// Path to the input image (optional with --interactive)
    #[arg(required_unless_present = "interactive")]
    pub image: Option<PathBuf>,

    /// Number of palette colors to keep
    #[arg(short = 'k', long = "colors", default_value_t = DEFAULT_PALETTE_SIZE)]
    pub colors: usize,

    /// Sample every Nth pixel
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    pub stride: usize,

    /// Quantization step per channel
    #[arg(long, default_value_t = DEFAULT_QUANT_STEP)]
    pub step: u16,

    /// Ignore pixels with alpha below this value
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD)]
    pub alpha_threshold: u8,

    /// Minimum contrast for a palette color to be used as text
    #[arg(long, default_value_t = DEFAULT_MIN_CONTRAST)]
    pub min_contrast: f64,

    /// Regenerate this many times (cycles the background through the palette)
    #[arg(short, long, default_value_t = 0)]
    pub shuffle: usize,

    /// Override the background color (switches auto mode off)
    #[arg(long, value_parser = parse_color)]
    pub background: Option<Color>,

    /// Override the foreground color (switches auto mode off)
    #[arg(long, value_parser = parse_color)]
    pub foreground: Option<Color>,

    /// Write the theme to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a colored terminal preview of the palette and pair
    #[arg(long)]
    pub preview: bool,

    /// Read commands from stdin and drive the engine interactively
    #[arg(long, conflicts_with = "output")]
    pub interactive: bool,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            analysis: AnalysisConfig {
                stride: self.stride,
                quant_step: self.step,
                alpha_threshold: self.alpha_threshold,
                palette_size: self.colors,
            },
            theme: ThemePolicy {
                min_contrast: self.min_contrast,
            },
        }
    }
}

fn parse_color(s: &str) -> Result<Color, String> {
    Color::from_hex(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let args = Args::try_parse_from(["cardtone", "cover.png"]).unwrap();
        assert_eq!(args.engine_config(), EngineConfig::default());
    }

    #[test]
    fn image_required_without_interactive() {
        assert!(Args::try_parse_from(["cardtone"]).is_err());
        assert!(Args::try_parse_from(["cardtone", "--interactive"]).is_ok());
    }

    #[test]
    fn parses_manual_colors() {
        let args =
            Args::try_parse_from(["cardtone", "a.png", "--background", "#102030"]).unwrap();
        assert_eq!(args.background, Some(Color::new(0x10, 0x20, 0x30)));
        assert!(Args::try_parse_from(["cardtone", "a.png", "--foreground", "nope"]).is_err());
    }
}
