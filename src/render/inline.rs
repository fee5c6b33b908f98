//! Inline renderer for normal terminal mode.
//!
//! Draws the prompt frame in the normal screen buffer, directly below
//! whatever the shell printed, and redraws it in place on every update:
//!
//! - Erases the previous frame by moving up to its first row
//! - Prints history lines above the live frame so they scroll away
//!   naturally into the terminal's scrollback
//! - Wraps rows at the terminal width itself and counts the physical
//!   rows, so the next redraw erases exactly what was drawn
//!
//! The cursor rests at the end of the last row between renders. Raw mode
//! disables output post-processing, so rows are separated by `\r\n`.

use std::io::{self, Stdout, Write};

use super::output::OutputBuffer;
use super::{Frame, Line, ansi};

pub struct InlineRenderer<W: Write = Stdout> {
    writer: W,
    output: OutputBuffer,
    previous_height: u16,
    width: Option<usize>,
}

impl InlineRenderer<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for InlineRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> InlineRenderer<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            output: OutputBuffer::new(),
            previous_height: 0,
            width: None,
        }
    }

    /// Terminal width used for wrapping; `None` draws rows unwrapped.
    pub fn set_width(&mut self, width: Option<usize>) {
        self.width = width.filter(|w| *w > 0);
    }

    /// Replace the previous frame with `frame`.
    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        ansi::begin_sync(&mut self.output)?;
        self.erase_previous()?;

        let rows: Vec<Line> = match self.width {
            Some(width) => frame.lines.iter().flat_map(|line| line.wrap(width)).collect(),
            None => frame.lines.clone(),
        };
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                self.output.newline();
            }
            ansi::line(&mut self.output, row)?;
        }

        ansi::reset(&mut self.output)?;
        ansi::end_sync(&mut self.output)?;
        self.output.flush_to(&mut self.writer)?;

        self.previous_height = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        Ok(())
    }

    /// Erase the live frame and print `lines` where it was. The next
    /// `render` draws below them.
    pub fn print_above(&mut self, lines: &[String]) -> io::Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        self.erase_previous()?;
        for line in lines {
            for row in line.split('\n') {
                self.output.write_str(row.trim_end_matches('\r'));
                self.output.newline();
            }
        }
        self.output.flush_to(&mut self.writer)?;
        self.previous_height = 0;
        Ok(())
    }

    /// Leave the last frame on screen and move below it.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.previous_height > 0 {
            ansi::reset(&mut self.output)?;
            self.output.newline();
            self.output.flush_to(&mut self.writer)?;
            self.previous_height = 0;
        }
        Ok(())
    }

    pub fn previous_height(&self) -> u16 {
        self.previous_height
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn erase_previous(&mut self) -> io::Result<()> {
        if self.previous_height > 0 {
            // The cursor sits on the last row of the previous frame.
            ansi::cursor_up(&mut self.output, self.previous_height - 1)?;
            ansi::cursor_column_zero(&mut self.output)?;
            ansi::erase_down(&mut self.output)?;
            self.previous_height = 0;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Span, Style};
    use crate::types::Attr;

    fn output(renderer: &InlineRenderer<Vec<u8>>) -> String {
        String::from_utf8_lossy(renderer.writer()).into_owned()
    }

    #[test]
    fn test_first_render_does_not_erase() {
        let mut renderer = InlineRenderer::with_writer(Vec::new());
        renderer
            .render(&Frame::from_lines(vec![Line::raw("> hi")]))
            .unwrap();
        let out = output(&renderer);
        assert!(out.contains("> hi"));
        assert!(!out.contains("\x1b[J"));
        assert_eq!(renderer.previous_height(), 1);
    }

    #[test]
    fn test_rerender_moves_up_to_first_row() {
        let mut renderer = InlineRenderer::with_writer(Vec::new());
        let frame = Frame::from_lines(vec![Line::raw("a"), Line::raw("b"), Line::raw("c")]);
        renderer.render(&frame).unwrap();
        renderer.render(&frame).unwrap();
        let out = output(&renderer);
        assert!(out.contains("\x1b[2A\r\x1b[J"));
        assert!(out.contains("a\r\nb\r\nc"));
    }

    #[test]
    fn test_single_row_rerender_stays_on_row() {
        let mut renderer = InlineRenderer::with_writer(Vec::new());
        let frame = Frame::from_lines(vec![Line::raw("x")]);
        renderer.render(&frame).unwrap();
        renderer.render(&frame).unwrap();
        let out = output(&renderer);
        assert!(out.contains("\r\x1b[J"));
        assert!(!out.contains("A\r"));
    }

    #[test]
    fn test_print_above_resets_height() {
        let mut renderer = InlineRenderer::with_writer(Vec::new());
        renderer
            .render(&Frame::from_lines(vec![Line::raw("> /save")]))
            .unwrap();
        renderer.print_above(&["saved".to_string()]).unwrap();
        assert_eq!(renderer.previous_height(), 0);
        assert!(output(&renderer).ends_with("saved\r\n"));
    }

    #[test]
    fn test_long_row_wraps_and_counts_physical_rows() {
        let mut renderer = InlineRenderer::with_writer(Vec::new());
        renderer.set_width(Some(3));
        renderer
            .render(&Frame::from_lines(vec![Line::raw("abcdef"), Line::raw("g")]))
            .unwrap();
        assert!(output(&renderer).contains("abc\r\ndef\r\ng"));
        assert_eq!(renderer.previous_height(), 3);

        renderer.render(&Frame::from_lines(vec![Line::raw("x")])).unwrap();
        assert!(output(&renderer).contains("\x1b[2A\r\x1b[J"));
        assert_eq!(renderer.previous_height(), 1);
    }

    #[test]
    fn test_cursor_cell_survives_narrow_terminal() {
        let text = "a long chat message that is much wider than twenty";
        let mut line = Line::raw("> ");
        line.push(Span::raw(text));
        line.push(Span::styled(" ", Style::new().attrs(Attr::INVERSE)));

        let mut renderer = InlineRenderer::with_writer(Vec::new());
        renderer.set_width(Some(20));
        renderer.render(&Frame::from_lines(vec![line])).unwrap();

        let out = output(&renderer);
        assert!(out.contains("\x1b[7m \x1b[0m"));
        assert!(out.contains("twenty"));
        assert_eq!(renderer.previous_height(), 3);
    }
}
