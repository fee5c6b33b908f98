//! Escape sequence parser for terminal input.
//!
//! Parses raw stdin bytes into structured events:
//! - CSI sequences (Arrow keys, Home, End, Insert, Delete, PageUp/Down, F1-F12)
//! - SS3 sequences (F1-F4, alternate encodings)
//! - Bracketed paste (ESC [ 200 ~ ... ESC [ 201 ~)
//! - Kitty keyboard protocol (codepoint, modifiers, state)
//! - Alt+key (ESC + char)
//! - Control keys (bytes 0-31)
//!
//! Every key event records the exact bytes it was parsed from. Sequences
//! we do not understand (mouse reports, unknown CSI finals) come out as
//! `ParsedEvent::Unknown` so the caller can drop them explicitly.
//!
//! A lone ESC is ambiguous until more bytes arrive; the caller waits
//! `ESCAPE_TIMEOUT` and then calls `flush_pending`.

use std::time::Duration;

/// How long to wait for the rest of an escape sequence.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(10);

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

// =============================================================================
// Types
// =============================================================================

/// A parsed input event.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    Key(KeyEvent),
    Paste(String),
    FocusGained,
    FocusLost,
    /// A complete sequence with no meaning to us, raw bytes included.
    Unknown(String),
}

/// A key event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifier,
    pub state: KeyState,
    /// The raw bytes this key was parsed from.
    pub sequence: String,
}

/// Key state (for Kitty keyboard protocol).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Press,
    Repeat,
    Release,
}

/// Key code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
    Null,
}

bitflags::bitflags! {
    /// Keyboard modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifier: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const SUPER = 1 << 3;
    }
}

// =============================================================================
// Parser
// =============================================================================

/// Incremental decoder from terminal bytes to events.
///
/// Bytes that do not yet form a complete event stay in `pending` until the
/// next `parse` call or `flush_pending`.
pub struct InputParser {
    pending: Vec<u8>,
    /// Bytes taken for the event being decoded.
    taken: Vec<u8>,
}

impl InputParser {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(64),
            taken: Vec::with_capacity(16),
        }
    }

    /// Decode `data` together with any bytes left over from earlier calls.
    /// An incomplete sequence at the end is kept for the next call.
    pub fn parse(&mut self, data: &[u8]) -> Vec<ParsedEvent> {
        self.pending.extend_from_slice(data);
        let mut events = Vec::new();

        while !self.pending.is_empty() {
            self.taken.clear();
            match self.step() {
                Step::Emit(mut event) => {
                    if let ParsedEvent::Key(key) = &mut event {
                        if key.sequence.is_empty() {
                            key.sequence = String::from_utf8_lossy(&self.taken).into_owned();
                        }
                    }
                    events.push(event);
                }
                Step::NeedMore => break,
                Step::Skip => {
                    if self.taken.is_empty() {
                        self.advance(1);
                    }
                }
            }
        }

        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether a bracketed paste has started but its end marker has not
    /// arrived. A paste can take arbitrarily long to come in, so it is
    /// never cut short by the escape timeout.
    pub fn in_paste(&self) -> bool {
        self.pending.starts_with(PASTE_START)
    }

    /// Resolve buffered bytes once the escape timeout has expired.
    ///
    /// A lone ESC becomes the Escape key and any other stalled bytes are
    /// reported as unknown. An open paste stays buffered.
    pub fn flush_pending(&mut self) -> Vec<ParsedEvent> {
        if self.pending.is_empty() || self.in_paste() {
            return Vec::new();
        }

        let mut events = Vec::new();
        if self.pending[0] == ESC {
            self.pending.remove(0);
            events.push(key_event(KeyCode::Escape, Modifier::NONE, "\x1b"));
        }
        if !self.pending.is_empty() {
            // The remainder may itself be complete (e.g. ESC followed by a
            // multi-byte character that arrived split).
            let rest = std::mem::take(&mut self.pending);
            events.extend(self.parse(&rest));
            if !self.pending.is_empty() && !self.in_paste() {
                let raw = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                events.push(ParsedEvent::Unknown(raw));
            }
        }
        events
    }

    /// Resolve everything at end of input. An unterminated paste is
    /// delivered with whatever text arrived.
    pub fn finish(&mut self) -> Vec<ParsedEvent> {
        let mut events = self.flush_pending();
        if self.in_paste() {
            let text = String::from_utf8_lossy(&self.pending[PASTE_START.len()..]).into_owned();
            self.pending.clear();
            events.push(ParsedEvent::Paste(text));
        }
        events
    }

    fn step(&mut self) -> Step {
        let Some(&lead) = self.pending.first() else {
            return Step::Skip;
        };

        if lead == ESC {
            return self.escape();
        }
        if let Some((code, modifiers)) = control_key(lead) {
            self.advance(1);
            return Step::key(code, modifiers);
        }
        if lead.is_ascii() {
            self.advance(1);
            return Step::key(KeyCode::Char(char::from(lead)), Modifier::NONE);
        }
        self.utf8_char()
    }

    /// Everything that starts with ESC.
    fn escape(&mut self) -> Step {
        let Some(&next) = self.pending.get(1) else {
            return Step::NeedMore;
        };

        match next {
            b'[' => self.csi(),
            b'O' => self.ss3(),
            ESC => {
                self.advance(2);
                Step::key(KeyCode::Escape, Modifier::ALT)
            }
            0x20..=0x7E => {
                self.advance(2);
                Step::key(KeyCode::Char(char::from(next)), Modifier::ALT)
            }
            // ESC followed by something that cannot extend it.
            _ => {
                self.advance(1);
                Step::key(KeyCode::Escape, Modifier::NONE)
            }
        }
    }

    fn csi(&mut self) -> Step {
        if self.pending.len() < 3 {
            return Step::NeedMore;
        }
        if self.pending.starts_with(PASTE_START) {
            return self.paste();
        }

        match self.pending[2] {
            // X10 mouse report carries three raw bytes after the M.
            b'M' if self.pending.len() < 6 => return Step::NeedMore,
            b'M' => return self.unknown(6),
            b'I' => {
                self.advance(3);
                return Step::Emit(ParsedEvent::FocusGained);
            }
            b'O' => {
                self.advance(3);
                return Step::Emit(ParsedEvent::FocusLost);
            }
            _ => {}
        }

        let Some(final_at) = self.pending[2..]
            .iter()
            .position(|b| (0x40..=0x7E).contains(b))
            .map(|i| i + 2)
        else {
            return Step::NeedMore;
        };
        let len = final_at + 1;
        let final_byte = self.pending[final_at];
        let params = String::from_utf8_lossy(&self.pending[2..final_at]).into_owned();

        // Private-marker sequences (SGR mouse, DA replies, mode reports).
        if params.starts_with(|c: char| matches!(c, '<' | '?' | '>' | '=')) {
            return self.unknown(len);
        }

        let params = numeric_params(&params);
        let param = |i: usize| params.get(i).copied().unwrap_or(0);

        if final_byte == b'u' {
            self.advance(len);
            return kitty_key(&params);
        }

        let modifiers = match param(1) {
            0 => Modifier::NONE,
            p => decode_modifier(p),
        };
        let code = match final_byte {
            b'Z' => Some(KeyCode::Tab),
            b'~' => tilde_key(param(0)),
            other => final_key(other),
        };

        match code {
            Some(KeyCode::Tab) => {
                self.advance(len);
                Step::key(KeyCode::Tab, modifiers | Modifier::SHIFT)
            }
            Some(code) => {
                self.advance(len);
                Step::key(code, modifiers)
            }
            None => self.unknown(len),
        }
    }

    fn ss3(&mut self) -> Step {
        let Some(&last) = self.pending.get(2) else {
            return Step::NeedMore;
        };
        let code = if last == b'M' { Some(KeyCode::Enter) } else { final_key(last) };
        match code {
            Some(code) => {
                self.advance(3);
                Step::key(code, Modifier::NONE)
            }
            None => self.unknown(3),
        }
    }

    fn paste(&mut self) -> Step {
        let body = &self.pending[PASTE_START.len()..];
        let Some(end) = body
            .windows(PASTE_END.len())
            .position(|window| window == PASTE_END)
        else {
            return Step::NeedMore;
        };

        let text = String::from_utf8_lossy(&body[..end]).into_owned();
        self.advance(PASTE_START.len() + end + PASTE_END.len());
        Step::Emit(ParsedEvent::Paste(text))
    }

    fn utf8_char(&mut self) -> Step {
        let width = match self.pending[0] {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            // Stray continuation or invalid lead byte.
            _ => {
                self.advance(1);
                return Step::Skip;
            }
        };
        if self.pending.len() < width {
            return Step::NeedMore;
        }

        let decoded = std::str::from_utf8(&self.pending[..width])
            .ok()
            .and_then(|s| s.chars().next());
        match decoded {
            Some(ch) => {
                self.advance(width);
                Step::key(KeyCode::Char(ch), Modifier::NONE)
            }
            None => {
                // Bad continuation bytes: drop the lead and resync.
                self.advance(1);
                Step::Skip
            }
        }
    }

    fn advance(&mut self, n: usize) {
        self.taken.extend(self.pending.drain(..n));
    }

    fn unknown(&mut self, n: usize) -> Step {
        self.advance(n);
        Step::Emit(ParsedEvent::Unknown(
            String::from_utf8_lossy(&self.taken).into_owned(),
        ))
    }
}

impl Default for InputParser {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helpers
// =============================================================================

const ESC: u8 = 0x1B;

/// Outcome of decoding at the front of the pending bytes.
enum Step {
    Emit(ParsedEvent),
    NeedMore,
    /// Bytes were dropped without producing an event.
    Skip,
}

impl Step {
    fn key(code: KeyCode, modifiers: Modifier) -> Self {
        Step::Emit(key_event(code, modifiers, ""))
    }
}

fn key_event(code: KeyCode, modifiers: Modifier, sequence: &str) -> ParsedEvent {
    ParsedEvent::Key(KeyEvent {
        code,
        modifiers,
        state: KeyState::Press,
        sequence: sequence.to_string(),
    })
}

/// C0 control bytes and DEL.
fn control_key(byte: u8) -> Option<(KeyCode, Modifier)> {
    let key = match byte {
        0x00 => (KeyCode::Null, Modifier::CTRL),
        0x08 | 0x7F => (KeyCode::Backspace, Modifier::NONE),
        0x09 => (KeyCode::Tab, Modifier::NONE),
        0x0A | 0x0D => (KeyCode::Enter, Modifier::NONE),
        0x01..=0x1A => (KeyCode::Char(char::from(byte - 1 + b'a')), Modifier::CTRL),
        // Ctrl+\ Ctrl+] Ctrl+^ Ctrl+_
        0x1C..=0x1F => (KeyCode::Char(char::from(byte + b'@')), Modifier::CTRL),
        _ => return None,
    };
    Some(key)
}

/// Final bytes shared by CSI and SS3 cursor and function keys.
fn final_key(byte: u8) -> Option<KeyCode> {
    let code = match byte {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P'..=b'S' => KeyCode::F(byte - b'P' + 1),
        _ => return None,
    };
    Some(code)
}

/// `CSI <n> ~` keys.
fn tilde_key(n: u32) -> Option<KeyCode> {
    let code = match n {
        1 | 7 => KeyCode::Home,
        2 => KeyCode::Insert,
        3 => KeyCode::Delete,
        4 | 8 => KeyCode::End,
        5 => KeyCode::PageUp,
        6 => KeyCode::PageDown,
        15 => KeyCode::F(5),
        17..=21 => KeyCode::F((n - 11) as u8),
        23 | 24 => KeyCode::F((n - 12) as u8),
        _ => return None,
    };
    Some(code)
}

/// `1;5` → `[1, 5]`. Sub-parameters after `:` are ignored, missing or
/// malformed numbers read as 0.
fn numeric_params(params: &str) -> Vec<u32> {
    params
        .split(';')
        .map(|field| {
            field
                .split(':')
                .next()
                .and_then(|n| n.parse().ok())
                .unwrap_or(0)
        })
        .collect()
}

fn kitty_key(params: &[u32]) -> Step {
    let param = |i: usize| params.get(i).copied();
    let modifiers = param(1).map_or(Modifier::NONE, decode_modifier);
    let state = match param(2) {
        Some(2) => KeyState::Repeat,
        Some(3) => KeyState::Release,
        _ => KeyState::Press,
    };

    let code = match param(0).unwrap_or(0) {
        9 => KeyCode::Tab,
        13 => KeyCode::Enter,
        27 => KeyCode::Escape,
        127 => KeyCode::Backspace,
        cp => char::from_u32(cp).map_or(KeyCode::Null, KeyCode::Char),
    };

    let sequence = legacy_sequence(&code, modifiers).unwrap_or_default();
    Step::Emit(ParsedEvent::Key(KeyEvent {
        code,
        modifiers,
        state,
        sequence,
    }))
}

/// The bytes a legacy terminal would have sent for a Kitty-encoded key.
///
/// Kitty reports every key as `CSI ... u`; downstream code compares raw
/// sequences (Ctrl-U, Ctrl-W) and treats leftover escapes as noise, so
/// plain keys get their traditional encoding back.
fn legacy_sequence(code: &KeyCode, modifiers: Modifier) -> Option<String> {
    let seq = match code {
        KeyCode::Char(ch) if modifiers.contains(Modifier::CTRL) && ch.is_ascii_alphabetic() => {
            let byte = ch.to_ascii_lowercase() as u8 - b'a' + 1;
            char::from(byte).to_string()
        }
        KeyCode::Char(ch) if modifiers.contains(Modifier::ALT) => format!("\x1b{}", ch),
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::Tab if modifiers.contains(Modifier::SHIFT) => "\x1b[Z".to_string(),
        KeyCode::Tab => "\t".to_string(),
        KeyCode::Enter => "\r".to_string(),
        KeyCode::Escape => "\x1b".to_string(),
        KeyCode::Backspace => "\x7f".to_string(),
        _ => return None,
    };
    Some(seq)
}

/// xterm modifier parameter: 1 + bitmask of shift, alt, ctrl, super.
fn decode_modifier(param: u32) -> Modifier {
    Modifier::from_bits_truncate((param.saturating_sub(1) & 0x0F) as u8)
}

// =============================================================================
// Tests
// =============================================================================
