use std::path::Path;

use anyhow::{Context, Result};

use crate::engine::Snapshot;
use crate::pipeline::contrast::{contrast_ratio, ContrastLevel};
use crate::pipeline::rank::Palette;
use crate::pipeline::select::ColorPair;

/// A serializable card color theme: the active pair plus the palette it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CardTheme {
    pub pair: ColorPair,
    pub palette: Palette,
    pub auto_mode: bool,
}

impl CardTheme {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            pair: snapshot.pair,
            palette: snapshot.palette.clone(),
            auto_mode: snapshot.auto_mode,
        }
    }

    pub fn contrast(&self) -> f64 {
        contrast_ratio(self.pair.background, self.pair.foreground)
    }

    /// Serialize to `key = value` lines.
    pub fn serialize(&self) -> String {
        let ratio = self.contrast();
        let level = ContrastLevel::classify(ratio).map_or("fail", ContrastLevel::label);

        let mut out = String::new();
        out.push_str(&format!("background = {}\n", self.pair.background));
        out.push_str(&format!("foreground = {}\n", self.pair.foreground));
        out.push_str(&format!("contrast = {ratio:.2} ({level})\n"));
        out.push_str(&format!(
            "auto = {}\n",
            if self.auto_mode { "on" } else { "off" }
        ));
        for (i, color) in self.palette.iter().enumerate() {
            out.push_str(&format!("palette = {i}={color}\n"));
        }
        out
    }

    /// Write the theme to an arbitrary path.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.serialize())
            .with_context(|| format!("failed to write theme to {}", path.display()))?;
        Ok(())
    }
}
