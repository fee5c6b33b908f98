//! Core types for slashline.
//!
//! These types define what flows between the input subsystem and its caller:
//! the items a quick search picks from, the window and cursor state the
//! widgets own, and the color/attribute vocabulary the renderer understands.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Special value: r=-1 means "terminal default" (let terminal pick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as i16,
            g: g as i16,
            b: b as i16,
            a: a as i16,
        }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Terminal default color (let terminal decide).
    pub const TERMINAL_DEFAULT: Self = Self {
        r: -1,
        g: -1,
        b: -1,
        a: -1,
    };

    pub const GREEN: Self = Self::rgb(0x00, 0xFF, 0x00);
    /// Background of the matched part of a quick-search label.
    pub const MATCH_HIGHLIGHT: Self = Self::rgb(0x6C, 0x71, 0xC4);
    /// Foreground of the query in the quick-search status line.
    pub const QUERY: Self = Self::rgb(0x74, 0xBE, 0xFF);

    /// Check if this is the terminal default color.
    #[inline]
    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }
}

// =============================================================================
// Text Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::INVERSE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 5;
    }
}

// =============================================================================
// Items
// =============================================================================

/// The value an item carries back to the caller when it is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Text(String),
    Number(f64),
}

impl ItemValue {
    /// The value as buffer text (numbers use their shortest decimal form).
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Text(text) => f.write_str(text),
            ItemValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for ItemValue {
    fn from(value: &str) -> Self {
        ItemValue::Text(value.to_string())
    }
}

impl From<String> for ItemValue {
    fn from(value: String) -> Self {
        ItemValue::Text(value)
    }
}

impl From<f64> for ItemValue {
    fn from(value: f64) -> Self {
        ItemValue::Number(value)
    }
}

impl From<i32> for ItemValue {
    fn from(value: i32) -> Self {
        ItemValue::Number(f64::from(value))
    }
}

/// A selectable entry in a quick search.
///
/// Items are compared structurally: two lists with the same labels and
/// values in the same order are the same list, whoever allocated them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemEntry")]
pub struct Item {
    pub label: String,
    pub value: ItemValue,
}

/// Item as written in a config file, where `value` may be left out.
#[derive(Deserialize)]
struct ItemEntry {
    label: String,
    #[serde(default)]
    value: Option<ItemValue>,
}

impl From<ItemEntry> for Item {
    fn from(entry: ItemEntry) -> Self {
        match entry.value {
            Some(value) => Item::new(entry.label, value),
            None => Item::labeled(entry.label),
        }
    }
}

impl Item {
    pub fn new(label: impl Into<String>, value: impl Into<ItemValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// An item whose value is its own label.
    pub fn labeled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: ItemValue::Text(label.clone()),
            label,
        }
    }

    /// What Return selects when nothing matches.
    pub fn sentinel() -> Self {
        Self::labeled("")
    }

    pub fn is_sentinel(&self) -> bool {
        self.label.is_empty()
    }
}

// =============================================================================
// Widget State
// =============================================================================

/// Selection and scroll position inside the filtered item list.
///
/// `selection` indexes the filtered list; `start` is the first visible row
/// when a display limit is active. Whenever the filtered list is non-empty,
/// `start <= selection < len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowIndices {
    pub selection: usize,
    pub start: usize,
}

/// Cursor state of a line editor.
///
/// The edited text itself is owned by the caller. `cursor_offset` counts
/// characters, not bytes. `cursor_width` is the length of the span inserted
/// by the last edit when that edit inserted more than one character (a
/// paste), and zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorState {
    pub cursor_offset: usize,
    pub cursor_width: usize,
}
