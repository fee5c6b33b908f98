//! Error types for slashline.
//!
//! Key handling never fails: out-of-range navigation is clamped and
//! rejected queries leave state unchanged. Errors only come from the
//! terminal, from configuration, or from tearing the terminal down.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Restoring the terminal failed. The session is over either way; the
    /// caller decides whether to warn the user.
    #[error("failed to restore terminal mode: {0}")]
    TerminalRestore(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl PromptError {
    /// Whether the process can carry on after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PromptError::TerminalRestore(_))
    }
}

pub type Result<T> = std::result::Result<T, PromptError>;
