use std::ops::Deref;
use std::sync::Arc;

use crate::color::Color;
use crate::pipeline::quantize::Histogram;

/// Ranked representative colors of one image, most frequent first.
///
/// Immutable once built; clones share the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(Arc<[Color]>);

impl Palette {
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.0.iter().map(|c| c.to_hex()).collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for Palette {
    type Target = [Color];

    fn deref(&self) -> &[Color] {
        &self.0
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Self(colors.into())
    }
}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Take the `k` most frequent bins. Equal counts keep encounter order.
pub fn rank(histogram: &Histogram, k: usize) -> Palette {
    let mut entries = histogram.entries().to_vec();
    // stable: ties stay in first-encounter order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
        .into_iter()
        .take(k)
        .map(|(bin, _)| bin.to_color())
        .collect()
}
