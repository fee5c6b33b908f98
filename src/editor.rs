//! Single-line text editing with a drawn cursor.
//!
//! The edited string is owned by the caller. `LineEditor` keeps only the
//! cursor state (`EditorState`) and turns key presses into an
//! [`EditorAction`] describing what the caller should do with its string.
//! The terminal's own cursor is never used: [`LineEditor::render`] marks the
//! cursor cell (and a freshly pasted span) with inverse video.
//!
//! All offsets count `char`s.
//!
//! # Example
//!
//! ```
//! use slashline::editor::{EditorAction, LineEditor};
//! use slashline::input::{KeyName, KeyPress};
//!
//! let mut editor = LineEditor::with_value("hello");
//! for _ in 0..3 {
//!     editor.handle_key("hello", &KeyPress::named(KeyName::Left));
//! }
//! let action = editor.handle_key("hello", &KeyPress::named(KeyName::Backspace));
//! assert_eq!(action, EditorAction::Changed("hllo".to_string()));
//! assert_eq!(editor.cursor_offset(), 1);
//! ```

use crate::input::{KeyName, KeyPress};
use crate::render::{Line, Span, Style};
use crate::types::{Attr, EditorState};

/// What a key press did to the edited value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// The value changed; the caller stores the new string.
    Changed(String),
    /// The key was consumed without changing the value.
    Moved,
    /// Return was pressed on this value.
    Submit(String),
    /// Not handled here; left for an outer handler.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    state: EditorState,
    focused: bool,
    highlight_pasted_text: bool,
}

impl LineEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::default(),
            focused: true,
            highlight_pasted_text: true,
        }
    }

    /// An editor whose cursor starts at the end of `value`.
    pub fn with_value(value: &str) -> Self {
        let mut editor = Self::new();
        editor.reset(value);
        editor
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn cursor_offset(&self) -> usize {
        self.state.cursor_offset
    }

    pub fn cursor_width(&self) -> usize {
        self.state.cursor_width
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_highlight_pasted_text(&mut self, on: bool) {
        self.highlight_pasted_text = on;
    }

    /// The value was overwritten from outside. A cursor at or past the new
    /// end snaps to the end and the paste highlight is dropped.
    pub fn set_value(&mut self, value: &str) {
        let len = value.chars().count();
        if self.state.cursor_offset + 1 > len {
            self.state = EditorState {
                cursor_offset: len,
                cursor_width: 0,
            };
        }
    }

    /// Start over on `value` with the cursor at its end, as a freshly
    /// shown editor does.
    pub fn reset(&mut self, value: &str) {
        self.state = EditorState {
            cursor_offset: value.chars().count(),
            cursor_width: 0,
        };
    }

    /// Apply a key press to `value`.
    pub fn handle_key(&mut self, value: &str, key: &KeyPress) -> EditorAction {
        if !self.focused || key.is_raw_escape() || is_passthrough(key) {
            return EditorAction::Ignored;
        }

        if key.is(KeyName::Return) {
            return EditorAction::Submit(value.to_string());
        }

        let mut chars: Vec<char> = value.chars().collect();
        let len = chars.len();
        let cursor = self.state.cursor_offset.min(len);

        let next_cursor = if key.is(KeyName::Left) {
            cursor.saturating_sub(1)
        } else if key.is(KeyName::Right) {
            (cursor + 1).min(len)
        } else if key.is(KeyName::Home) || is_ctrl(key, 'a') {
            0
        } else if key.is(KeyName::End) || is_ctrl(key, 'e') {
            len
        } else if key.is(KeyName::Backspace) || key.is(KeyName::Delete) {
            if cursor == 0 {
                self.state = EditorState {
                    cursor_offset: 0,
                    cursor_width: 0,
                };
                return EditorAction::Moved;
            }
            chars.remove(cursor - 1);
            self.state = EditorState {
                cursor_offset: cursor - 1,
                cursor_width: 0,
            };
            return EditorAction::Changed(chars.into_iter().collect());
        } else if key.is_printable() {
            let inserted: Vec<char> = key.input.chars().collect();
            let count = inserted.len();
            chars.splice(cursor..cursor, inserted);
            self.state = EditorState {
                cursor_offset: cursor + count,
                cursor_width: if count > 1 { count } else { 0 },
            };
            return EditorAction::Changed(chars.into_iter().collect());
        } else {
            return EditorAction::Ignored;
        };

        self.state = EditorState {
            cursor_offset: next_cursor,
            cursor_width: 0,
        };
        EditorAction::Moved
    }

    /// Draw `value` with the cursor overlay.
    ///
    /// The cell at the cursor is inverted, along with the pasted span before
    /// it when highlighting is on. A cursor past the last character is an
    /// inverted trailing blank; an empty value is a single inverted blank.
    pub fn render(&self, value: &str) -> Line {
        if !self.focused {
            return Line::raw(value);
        }

        let inverse = Style::new().attrs(Attr::INVERSE);
        if value.is_empty() {
            return Line::from_spans(vec![Span::styled(" ", inverse)]);
        }

        let len = value.chars().count();
        let cursor = self.state.cursor_offset.min(len);
        let width = if self.highlight_pasted_text {
            self.state.cursor_width
        } else {
            0
        };
        let highlight_from = cursor.saturating_sub(width);

        let mut line = Line::new();
        let mut run = String::new();
        let mut run_inverted = false;
        for (i, ch) in value.chars().enumerate() {
            let inverted = i >= highlight_from && i <= cursor;
            if inverted != run_inverted && !run.is_empty() {
                line.push(span_for(std::mem::take(&mut run), run_inverted));
            }
            run_inverted = inverted;
            run.push(ch);
        }
        line.push(span_for(run, run_inverted));

        if cursor == len {
            line.push(Span::styled(" ", inverse));
        }
        line
    }
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn span_for(text: String, inverted: bool) -> Span {
    if inverted {
        Span::styled(text, Style::new().attrs(Attr::INVERSE))
    } else {
        Span::raw(text)
    }
}

fn is_ctrl(key: &KeyPress, letter: char) -> bool {
    key.ctrl && key.name.is_none() && key.input == letter.to_string()
}

/// Keys the editor leaves for whoever owns it.
fn is_passthrough(key: &KeyPress) -> bool {
    key.is(KeyName::Up)
        || key.is(KeyName::Down)
        || key.is(KeyName::Tab)
        || key.is(KeyName::Escape)
        || is_ctrl(key, 'c')
}
