//! ANSI escape sequences used by the inline renderer.
//!
//! Only what an in-place prompt needs: relative cursor movement, erasing,
//! synchronized output, and SGR colors/attributes.

use std::io::Write;

use super::{Line, Style};
use crate::types::{Attr, Rgba};

// =============================================================================
// Cursor Movement
// =============================================================================

/// Move cursor up by n rows.
#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: u16) -> std::io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}A", n)
    } else {
        Ok(())
    }
}

/// Move cursor to column 0.
#[inline]
pub fn cursor_column_zero<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\r")
}

// =============================================================================
// Erasing
// =============================================================================

/// Clear from cursor to end of screen.
#[inline]
pub fn erase_down<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[J")
}

// =============================================================================
// Synchronized Output
// =============================================================================

#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?2026h")
}

#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[?2026l")
}

// =============================================================================
// Colors
// =============================================================================

/// Reset all attributes and colors.
#[inline]
pub fn reset<W: Write>(w: &mut W) -> std::io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Set foreground color (TrueColor).
#[inline]
pub fn fg<W: Write>(w: &mut W, color: Rgba) -> std::io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[39m")
    } else {
        write!(w, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
    }
}

/// Set background color (TrueColor).
#[inline]
pub fn bg<W: Write>(w: &mut W, color: Rgba) -> std::io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[49m")
    } else {
        write!(w, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
    }
}

// =============================================================================
// Text Attributes
// =============================================================================

/// Set text attributes from bitflags.
#[allow(unused_assignments)]
pub fn attrs<W: Write>(w: &mut W, attr: Attr) -> std::io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    let mut first = true;
    write!(w, "\x1b[")?;

    macro_rules! emit {
        ($flag:expr, $code:expr) => {
            if attr.contains($flag) {
                if !first {
                    write!(w, ";")?;
                }
                write!(w, "{}", $code)?;
                first = false;
            }
        };
    }

    emit!(Attr::BOLD, 1);
    emit!(Attr::DIM, 2);
    emit!(Attr::ITALIC, 3);
    emit!(Attr::UNDERLINE, 4);
    emit!(Attr::INVERSE, 7);

    write!(w, "m")
}

/// Apply a complete style from a reset state.
pub fn style<W: Write>(w: &mut W, style: Style) -> std::io::Result<()> {
    attrs(w, style.attrs)?;
    if !style.fg.is_terminal_default() {
        fg(w, style.fg)?;
    }
    if !style.bg.is_terminal_default() {
        bg(w, style.bg)?;
    }
    Ok(())
}

// =============================================================================
// Lines
// =============================================================================

/// Write a styled line. Styled spans are bracketed by resets so no style
/// leaks into the next span or row.
pub fn line<W: Write>(w: &mut W, line: &Line) -> std::io::Result<()> {
    for span in &line.spans {
        if span.style.is_plain() {
            write!(w, "{}", span.text)?;
        } else {
            style(w, span.style)?;
            write!(w, "{}", span.text)?;
            reset(w)?;
        }
    }
    Ok(())
}
