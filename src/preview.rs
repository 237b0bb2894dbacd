//! Truecolor terminal preview of a theme.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};

use crate::color::{Color, BLACK, WHITE};
use crate::theme::CardTheme;

const SAMPLE_TEXT: &str = "Your Song Title";

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Readable label color for text printed on a swatch.
fn label_on(c: Color) -> Color {
    if c.relative_luminance() > 0.5 {
        BLACK
    } else {
        WHITE
    }
}

/// Render the active pair as a sample card line, then one swatch per
/// palette color. The swatch matching the background is bold.
pub fn render<W: Write>(out: &mut W, theme: &CardTheme) -> io::Result<()> {
    let pair = theme.pair;
    queue!(
        out,
        SetBackgroundColor(to_term(pair.background)),
        SetForegroundColor(to_term(pair.foreground)),
        Print(format!("  {SAMPLE_TEXT:^28}  ")),
        ResetColor,
        Print("\n")
    )?;

    for &color in theme.palette.iter() {
        let is_background = color == pair.background;
        if is_background {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(
            out,
            SetBackgroundColor(to_term(color)),
            SetForegroundColor(to_term(label_on(color))),
            Print(format!(" {color} ")),
            ResetColor
        )?;
        if is_background {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        queue!(out, Print(" "))?;
    }
    if !theme.palette.is_empty() {
        queue!(out, Print("\n"))?;
    }
    out.flush()
}
