//! Terminal output - styled lines drawn in place below the shell prompt.
//!
//! Widgets never write escape codes. They project their state into a
//! [`Frame`] of [`Line`]s made of styled [`Span`]s; the renderer turns that
//! into ANSI output.
//!
//! # Architecture
//!
//! ```text
//!   LineEditor::render ──┐
//!                        ├──► Frame ──► InlineRenderer ──► terminal
//!   QuickSearch::render ─┘                  │
//!                                  history lines printed above
//! ```
//!
//! # Example
//!
//! ```
//! use slashline::render::{Frame, Line, Span, Style};
//! use slashline::types::Attr;
//!
//! let line = Line::from_spans(vec![
//!     Span::raw("> "),
//!     Span::styled(" ", Style::new().attrs(Attr::INVERSE)),
//! ]);
//! let frame = Frame::from_lines(vec![line]);
//! assert_eq!(frame.height(), 1);
//! assert_eq!(frame.lines[0].text(), ">  ");
//! ```

pub mod ansi;
pub mod inline;
pub mod output;

pub use inline::InlineRenderer;
pub use output::OutputBuffer;

use unicode_width::UnicodeWidthChar;

use crate::types::{Attr, Rgba};

// =============================================================================
// Style
// =============================================================================

/// Colors and attributes of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Rgba,
    pub bg: Rgba,
    pub attrs: Attr,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Rgba) -> Self {
        self.fg = color;
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Rgba) -> Self {
        self.bg = color;
        self
    }

    #[must_use]
    pub const fn attrs(mut self, attrs: Attr) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn is_plain(&self) -> bool {
        self.fg.is_terminal_default() && self.bg.is_terminal_default() && self.attrs.is_empty()
    }

    pub fn is_inverse(&self) -> bool {
        self.attrs.contains(Attr::INVERSE)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Span / Line / Frame
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn raw(text: impl Into<String>) -> Self {
        Self::styled(text, Style::new())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn width(&self) -> usize {
        string_width(&self.text)
    }
}

/// One terminal row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::from_spans(vec![Span::raw(text)])
    }

    /// Append a span, skipping empty text.
    pub fn push(&mut self, span: Span) {
        if !span.text.is_empty() {
            self.spans.push(span);
        }
    }

    pub fn extend(&mut self, other: Line) {
        for span in other.spans {
            self.push(span);
        }
    }

    /// Text without styling.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Text of every span carrying the given attribute, concatenated.
    pub fn text_with(&self, attr: Attr) -> String {
        self.spans
            .iter()
            .filter(|span| span.style.attrs.contains(attr))
            .map(|span| span.text.as_str())
            .collect()
    }

    /// Break the line into rows of at most `max_width` columns, the way
    /// the terminal would soft-wrap it. Styles carry across the break. A
    /// wide character that does not fit moves whole to the next row.
    pub fn wrap(&self, max_width: usize) -> Vec<Line> {
        if max_width == 0 {
            return vec![self.clone()];
        }

        let mut rows = Vec::new();
        let mut row = Line::new();
        let mut used = 0;
        for span in &self.spans {
            let mut text = String::new();
            for ch in span.text.chars() {
                let w = char_width(ch);
                if used > 0 && used + w > max_width {
                    row.push(Span::styled(std::mem::take(&mut text), span.style));
                    rows.push(std::mem::take(&mut row));
                    used = 0;
                }
                used += w;
                text.push(ch);
            }
            row.push(Span::styled(text, span.style));
        }
        rows.push(row);
        rows
    }
}

/// A full projection of the prompt, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: Vec<Line>,
}

impl Frame {
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Unstyled text of every row.
    pub fn text_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }
}

// =============================================================================
// Width
// =============================================================================

/// Terminal columns a character occupies. Control characters take none.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_push_skips_empty() {
        let mut line = Line::new();
        line.push(Span::raw(""));
        line.push(Span::raw("ab"));
        assert_eq!(line.spans.len(), 1);
    }

    #[test]
    fn test_line_width_counts_wide_chars() {
        let line = Line::raw("a日本");
        assert_eq!(line.width(), 5);
    }

    #[test]
    fn test_wrap_keeps_styles_across_rows() {
        let inverse = Style::new().attrs(Attr::INVERSE);
        let line = Line::from_spans(vec![Span::raw("abc"), Span::styled("def", inverse)]);
        let rows = line.wrap(4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "abcd");
        assert_eq!(rows[0].text_with(Attr::INVERSE), "d");
        assert_eq!(rows[1].text(), "ef");
        assert_eq!(rows[1].text_with(Attr::INVERSE), "ef");
    }

    #[test]
    fn test_wrap_moves_wide_char_to_next_row() {
        let rows = Line::raw("a日").wrap(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text(), "a");
        assert_eq!(rows[1].text(), "日");
    }

    #[test]
    fn test_wrap_short_and_empty_lines_stay_one_row() {
        assert_eq!(Line::raw("abc").wrap(10), vec![Line::raw("abc")]);
        assert_eq!(Line::new().wrap(10), vec![Line::new()]);
    }

    #[test]
    fn test_style_default_is_plain() {
        assert!(Style::default().is_plain());
        assert!(!Style::new().fg(Rgba::GREEN).is_plain());
        assert!(Style::new().attrs(Attr::INVERSE | Attr::BOLD).is_inverse());
    }
}
