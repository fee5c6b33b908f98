//! # slashline
//!
//! Inline terminal prompt for chat-style REPLs: a line editor with a drawn
//! cursor, plus a quick search over slash commands that opens when the
//! input starts with `/`.
//!
//! ## Architecture
//!
//! Every widget is an explicit state object changed only by key handling
//! and drawn by a pure projection to a [`render::Frame`]:
//! ```text
//! stdin bytes → InputParser → KeyPress → Prompt ─┬→ LineEditor  (free text)
//!                                                └→ QuickSearch (after `/`)
//!                                        Prompt::frame → InlineRenderer → stdout
//! ```
//!
//! The application supplies the command list and a [`PromptHandler`];
//! [`PromptSession::run`] owns the terminal for the lifetime of the prompt.
//!
//! ## Modules
//!
//! - [`types`] - Items, window and cursor state, colors and attributes
//! - [`config`] - Prompt and quick-search settings, TOML loading
//! - [`input`] - Raw mode, stdin reader, escape parser, key normalization
//! - [`editor`] - Single-line editing and the cursor overlay
//! - [`search`] - Substring filtering, windowed selection
//! - [`prompt`] - Routing between the two modes, the handler seam
//! - [`render`] - Styled lines and the in-place renderer
//! - [`session`] - The event loop tying it all together

pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod prompt;
pub mod render;
pub mod search;
pub mod session;
pub mod types;

// Re-export commonly used items
pub use config::{PromptConfig, QuickSearchConfig};
pub use editor::{EditorAction, LineEditor};
pub use error::{PromptError, Result};
pub use input::{KeyName, KeyPress};
pub use prompt::{CommandAction, Prompt, PromptEvent, PromptHandler};
pub use search::{QuickSearch, SearchAction, SearchRow, SearchView};
pub use session::PromptSession;
pub use types::{EditorState, Item, ItemValue, WindowIndices};
