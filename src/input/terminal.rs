//! Raw mode as a scoped resource.
//!
//! `RawModeGuard::acquire` puts the terminal in raw mode, hides the
//! hardware cursor (the editor draws its own), and turns on bracketed
//! paste. The terminal is restored by `release` or, failing that, by
//! `Drop`, so every exit path out of a session leaves the terminal the way
//! it found it.
//!
//! When stdin is not a TTY (piped input, tests) raw mode is skipped and
//! the guard only manages the escape-sequence features.

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal;
use crossterm::tty::IsTty;

use crate::error::{PromptError, Result};

pub struct RawModeGuard {
    raw: bool,
    features: bool,
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        let mut guard = Self {
            raw: false,
            features: false,
        };

        if io::stdin().is_tty() {
            terminal::enable_raw_mode()?;
            guard.raw = true;
        } else {
            tracing::debug!("stdin is not a tty, skipping raw mode");
        }

        // On failure here, dropping `guard` undoes raw mode.
        execute!(io::stdout(), Hide, EnableBracketedPaste)?;
        guard.features = true;

        tracing::debug!(raw = guard.raw, "terminal acquired");
        Ok(guard)
    }

    pub fn is_active(&self) -> bool {
        self.raw || self.features
    }

    /// Restore the terminal. Safe to call more than once; later calls
    /// are no-ops.
    pub fn release(&mut self) -> Result<()> {
        let mut first_error: Option<io::Error> = None;

        if self.features {
            self.features = false;
            let mut stdout = io::stdout();
            if let Err(e) = execute!(stdout, DisableBracketedPaste, Show)
                .and_then(|()| stdout.flush())
            {
                first_error = Some(e);
            }
        }

        if self.raw {
            self.raw = false;
            if let Err(e) = terminal::disable_raw_mode() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(PromptError::TerminalRestore(e)),
            None => Ok(()),
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "terminal restore failed during drop");
        }
    }
}
