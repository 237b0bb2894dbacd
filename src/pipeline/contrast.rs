use crate::color::Color;

/// WCAG 2.x contrast thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContrastLevel {
    /// 3:1, large text and UI components.
    AaLarge,
    /// 4.5:1, body text.
    Aa,
    /// 7:1, enhanced.
    Aaa,
}

impl ContrastLevel {
    pub fn min_ratio(self) -> f64 {
        match self {
            ContrastLevel::AaLarge => 3.0,
            ContrastLevel::Aa => 4.5,
            ContrastLevel::Aaa => 7.0,
        }
    }

    pub fn passes(self, ratio: f64) -> bool {
        ratio >= self.min_ratio()
    }

    /// Highest level `ratio` satisfies, if any.
    pub fn classify(ratio: f64) -> Option<ContrastLevel> {
        [ContrastLevel::Aaa, ContrastLevel::Aa, ContrastLevel::AaLarge]
            .into_iter()
            .find(|level| level.passes(ratio))
    }

    pub fn label(self) -> &'static str {
        match self {
            ContrastLevel::AaLarge => "AA-large",
            ContrastLevel::Aa => "AA",
            ContrastLevel::Aaa => "AAA",
        }
    }
}

/// Relative luminance of `color`, in `[0, 1]`.
pub fn luminance(color: Color) -> f64 {
    color.relative_luminance()
}

/// Contrast ratio between two colors, in `[1, 21]`, symmetric.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    Color::contrast_ratio(&a, &b)
}
