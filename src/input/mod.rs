//! Terminal input: raw bytes to normalized key presses.
//!
//! # Architecture
//!
//! ```text
//! terminal ──(raw mode, RawModeGuard)──► InputReader thread
//!                                            │ bytes
//!                                            ▼
//!                                       InputParser ──(ESC timeout)──► flush_pending
//!                                            │ ParsedEvent
//!                                            ▼
//!                                    KeyPress::from_event
//!                                            │
//!                              raw escapes dropped here
//!                                            ▼
//!                                         Prompt
//! ```

pub mod keypress;
pub mod parser;
pub mod reader;
pub mod terminal;

pub use keypress::{KeyName, KeyPress};
pub use parser::{InputParser, ParsedEvent, ESCAPE_TIMEOUT};
pub use reader::{InputReader, ReaderMessage};
pub use terminal::RawModeGuard;
