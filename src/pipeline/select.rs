use crate::color::{Color, BLACK, WHITE};
use crate::config::ThemePolicy;
use crate::pipeline::contrast::{contrast_ratio, luminance};

/// Background/foreground pair applied to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub background: Color,
    pub foreground: Color,
}

/// Pair used when there is no palette to choose from.
pub const DEFAULT_PAIR: ColorPair = ColorPair {
    background: Color::new(0x1a, 0x1a, 0x1a),
    foreground: WHITE,
};

/// Backgrounds brighter than this get black text in the fallback.
const FALLBACK_LUMINANCE_SPLIT: f64 = 0.5;

/// Outcome of a selection, with diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub pair: ColorPair,
    /// Contrast ratio between the chosen background and foreground.
    pub ratio: f64,
    /// True when no palette entry met the policy and black/white was used.
    pub fallback: bool,
}

/// Choose a pair from `palette` with the background at `rotation`.
///
/// Never fails: an empty palette gives [`DEFAULT_PAIR`].
pub fn select_pair(palette: &[Color], rotation: usize, policy: &ThemePolicy) -> Selection {
    if palette.is_empty() {
        return Selection {
            pair: DEFAULT_PAIR,
            ratio: contrast_ratio(DEFAULT_PAIR.background, DEFAULT_PAIR.foreground),
            fallback: false,
        };
    }

    let background = palette[rotation % palette.len()];

    let mut best = WHITE;
    let mut max_ratio = 0.0;
    for &candidate in palette.iter().filter(|&&c| c != background) {
        let ratio = contrast_ratio(background, candidate);
        // strict: the first of equally good candidates wins
        if ratio > max_ratio {
            max_ratio = ratio;
            best = candidate;
        }
    }

    if max_ratio >= policy.min_contrast {
        return Selection {
            pair: ColorPair {
                background,
                foreground: best,
            },
            ratio: max_ratio,
            fallback: false,
        };
    }

    let foreground = if luminance(background) > FALLBACK_LUMINANCE_SPLIT {
        BLACK
    } else {
        WHITE
    };
    Selection {
        pair: ColorPair {
            background,
            foreground,
        },
        ratio: contrast_ratio(background, foreground),
        fallback: true,
    }
}
