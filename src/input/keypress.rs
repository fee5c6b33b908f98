//! Normalized key presses.
//!
//! The widgets never look at parser output directly. Every event is first
//! folded into a `KeyPress`: the text it would insert, an optional named
//! key, modifier flags, and the raw sequence it came from.
//!
//! A printable character has no name. Sequences that start with ESC but do
//! not map to a key the widgets understand are "raw escapes" and are
//! dropped before they reach any widget.

use super::parser::{KeyCode, KeyState, Modifier, ParsedEvent};

// =============================================================================
// Types
// =============================================================================

/// Keys the widgets give meaning to, plus the rest of the named keys so
/// they can be told apart from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyName {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Return,
    Backspace,
    Delete,
    Escape,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
}

impl KeyName {
    /// Named keys that survive the raw escape filter.
    fn is_recognized(self) -> bool {
        matches!(
            self,
            KeyName::Up
                | KeyName::Down
                | KeyName::Left
                | KeyName::Right
                | KeyName::Tab
                | KeyName::Return
                | KeyName::Backspace
                | KeyName::Delete
                | KeyName::Escape
                | KeyName::Home
                | KeyName::End
        )
    }
}

/// A single key press as the widgets see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Text this press would insert. Empty for named keys.
    pub input: String,
    pub name: Option<KeyName>,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    /// Raw bytes as received from the terminal.
    pub sequence: String,
    /// Set for bracketed paste, which delivers many characters at once.
    pub paste: bool,
}

impl KeyPress {
    /// A printable character.
    pub fn char(ch: char) -> Self {
        Self {
            input: ch.to_string(),
            name: None,
            shift: ch.is_uppercase(),
            ctrl: false,
            meta: false,
            sequence: ch.to_string(),
            paste: false,
        }
    }

    /// A named key with its conventional sequence.
    pub fn named(name: KeyName) -> Self {
        Self {
            input: String::new(),
            name: Some(name),
            shift: false,
            ctrl: false,
            meta: false,
            sequence: default_sequence(name).to_string(),
            paste: false,
        }
    }

    /// Ctrl + letter, carrying the control byte as its sequence.
    pub fn ctrl(ch: char) -> Self {
        let lower = ch.to_ascii_lowercase();
        let sequence = if lower.is_ascii_lowercase() {
            ((lower as u8 - b'a' + 1) as char).to_string()
        } else {
            String::new()
        };
        Self {
            input: lower.to_string(),
            name: None,
            shift: false,
            ctrl: true,
            meta: false,
            sequence,
            paste: false,
        }
    }

    /// Text delivered in one piece, as by a bracketed paste.
    pub fn paste(text: &str) -> Self {
        let input = sanitize_paste(text);
        Self {
            sequence: input.clone(),
            input,
            name: None,
            shift: false,
            ctrl: false,
            meta: false,
            paste: true,
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Normalize a parser event. Release events, focus reports and
    /// zero-length pastes yield `None`.
    pub fn from_event(event: &ParsedEvent) -> Option<Self> {
        match event {
            ParsedEvent::Key(key) => {
                if key.state == KeyState::Release {
                    return None;
                }
                let shift = key.modifiers.contains(Modifier::SHIFT);
                let ctrl = key.modifiers.contains(Modifier::CTRL);
                let meta = key.modifiers.intersects(Modifier::ALT | Modifier::SUPER);

                let (input, name) = match &key.code {
                    KeyCode::Char(ch) => (ch.to_string(), None),
                    KeyCode::Enter => (String::new(), Some(KeyName::Return)),
                    KeyCode::Tab => (String::new(), Some(KeyName::Tab)),
                    KeyCode::Backspace => (String::new(), Some(KeyName::Backspace)),
                    KeyCode::Escape => (String::new(), Some(KeyName::Escape)),
                    KeyCode::Delete => (String::new(), Some(KeyName::Delete)),
                    KeyCode::Up => (String::new(), Some(KeyName::Up)),
                    KeyCode::Down => (String::new(), Some(KeyName::Down)),
                    KeyCode::Left => (String::new(), Some(KeyName::Left)),
                    KeyCode::Right => (String::new(), Some(KeyName::Right)),
                    KeyCode::Home => (String::new(), Some(KeyName::Home)),
                    KeyCode::End => (String::new(), Some(KeyName::End)),
                    KeyCode::PageUp => (String::new(), Some(KeyName::PageUp)),
                    KeyCode::PageDown => (String::new(), Some(KeyName::PageDown)),
                    KeyCode::Insert => (String::new(), Some(KeyName::Insert)),
                    KeyCode::F(n) => (String::new(), Some(KeyName::F(*n))),
                    KeyCode::Null => (String::new(), None),
                };
                let shift = shift || (name.is_none() && input.chars().any(char::is_uppercase));

                Some(Self {
                    input,
                    name,
                    shift,
                    ctrl,
                    meta,
                    sequence: key.sequence.clone(),
                    paste: false,
                })
            }
            ParsedEvent::Paste(text) => {
                let press = Self::paste(text);
                if press.input.is_empty() { None } else { Some(press) }
            }
            ParsedEvent::Unknown(raw) => Some(Self {
                input: String::new(),
                name: None,
                shift: false,
                ctrl: false,
                meta: false,
                sequence: raw.clone(),
                paste: false,
            }),
            ParsedEvent::FocusGained | ParsedEvent::FocusLost => None,
        }
    }

    pub fn is(&self, name: KeyName) -> bool {
        self.name == Some(name)
    }

    /// An escape sequence that names nothing the widgets act on
    /// (function keys, Alt chords, mouse reports, unknown CSI).
    pub fn is_raw_escape(&self) -> bool {
        if self.paste || !self.sequence.contains('\x1b') {
            return false;
        }
        !matches!(self.name, Some(name) if name.is_recognized())
    }

    /// Text with no named key and no modifier chord: safe to insert.
    pub fn is_printable(&self) -> bool {
        self.name.is_none()
            && !self.ctrl
            && !self.meta
            && !self.input.is_empty()
            && !self.input.chars().any(char::is_control)
    }
}

fn default_sequence(name: KeyName) -> &'static str {
    match name {
        KeyName::Up => "\x1b[A",
        KeyName::Down => "\x1b[B",
        KeyName::Right => "\x1b[C",
        KeyName::Left => "\x1b[D",
        KeyName::Tab => "\t",
        KeyName::Return => "\r",
        KeyName::Backspace => "\x7f",
        KeyName::Delete => "\x1b[3~",
        KeyName::Escape => "\x1b",
        KeyName::Home => "\x1b[H",
        KeyName::End => "\x1b[F",
        KeyName::PageUp => "\x1b[5~",
        KeyName::PageDown => "\x1b[6~",
        KeyName::Insert => "\x1b[2~",
        KeyName::F(_) => "\x1bOP",
    }
}

/// A single-line editor cannot hold line breaks or other control
/// characters; pasted whitespace collapses to spaces and the rest is dropped.
fn sanitize_paste(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    text.chars()
        .filter_map(|ch| match ch {
            '\n' | '\r' | '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}
