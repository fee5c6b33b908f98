//! The prompt's event loop.
//!
//! One loop owns every piece: the raw-mode guard, the reader thread, the
//! parser and the renderer. Bytes are parsed and dispatched to the prompt
//! strictly in arrival order, one key at a time, and the frame is redrawn
//! once per drained batch.
//!
//! ```text
//! reader ──bytes──► parser ──events──► KeyPress ──► Prompt::handle_key
//!    ▲                 │ idle ESC                        │
//!    │                 └─► flush_pending                  ▼
//!  stdin                                   handler messages + frame ──► renderer
//! ```
//!
//! The terminal is restored on every way out of [`PromptSession::run`]:
//! an exit command, Ctrl-C, EOF on stdin, or an I/O error.

use std::io::{self, Stdout, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crossterm::terminal;

use crate::error::{PromptError, Result};
use crate::input::{
    ESCAPE_TIMEOUT, InputParser, InputReader, KeyPress, ParsedEvent, RawModeGuard, ReaderMessage,
};
use crate::prompt::{Prompt, PromptEvent, PromptHandler};
use crate::render::InlineRenderer;

pub struct PromptSession<W: Write = Stdout> {
    parser: InputParser,
    renderer: InlineRenderer<W>,
    escape_timeout: Duration,
}

impl PromptSession<Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for PromptSession<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PromptSession<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            parser: InputParser::new(),
            renderer: InlineRenderer::with_writer(writer),
            escape_timeout: ESCAPE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    pub fn renderer(&self) -> &InlineRenderer<W> {
        &self.renderer
    }

    /// Run the prompt on the terminal until the handler asks to exit or
    /// stdin closes.
    ///
    /// Each call spawns a reader on stdin that outlives the session if it
    /// is blocked in a read, so run one session per process.
    pub fn run<H: PromptHandler>(&mut self, prompt: &mut Prompt, handler: &mut H) -> Result<()> {
        let mut guard = RawModeGuard::acquire()?;

        let outcome = InputReader::spawn_stdin()
            .map_err(PromptError::from)
            .and_then(|(_reader, rx)| self.event_loop(&rx, prompt, handler));
        let finished = self.renderer.finish();

        let released = guard.release();
        if let Err(e) = &released {
            tracing::warn!(error = %e, "terminal was not restored");
        }

        outcome?;
        finished?;
        released
    }

    fn event_loop<H: PromptHandler>(
        &mut self,
        rx: &Receiver<ReaderMessage>,
        prompt: &mut Prompt,
        handler: &mut H,
    ) -> Result<()> {
        self.update_width();
        self.redraw(prompt, handler)?;

        loop {
            let mut closed = false;
            let mut events = match self.next_message(rx) {
                Some(ReaderMessage::Data(bytes)) => self.feed(prompt, handler, &bytes),
                Some(ReaderMessage::Closed) => {
                    closed = true;
                    Vec::new()
                }
                None => self.flush_pending(prompt, handler),
            };

            // Drain whatever else already arrived so a burst redraws once.
            while !closed && !events.contains(&PromptEvent::Exit) {
                match rx.try_recv() {
                    Ok(ReaderMessage::Data(bytes)) => {
                        events.extend(self.feed(prompt, handler, &bytes));
                    }
                    Ok(ReaderMessage::Closed) | Err(TryRecvError::Disconnected) => closed = true,
                    Err(TryRecvError::Empty) => break,
                }
            }
            if closed && !events.contains(&PromptEvent::Exit) {
                events.extend(self.finish_input(prompt, handler));
            }

            self.update_width();
            self.redraw(prompt, handler)?;

            if events.contains(&PromptEvent::Exit) {
                tracing::debug!("session exit requested");
                return Ok(());
            }
            if closed {
                tracing::debug!("input closed, ending session");
                return Ok(());
            }
        }
    }

    /// Wait for input. While an escape sequence is incomplete, wait at most
    /// the escape timeout and return `None` when it expires. An open paste
    /// waits for its end marker however long it takes.
    fn next_message(&self, rx: &Receiver<ReaderMessage>) -> Option<ReaderMessage> {
        if self.parser.has_pending() && !self.parser.in_paste() {
            match rx.recv_timeout(self.escape_timeout) {
                Ok(message) => Some(message),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(ReaderMessage::Closed),
            }
        } else {
            Some(rx.recv().unwrap_or(ReaderMessage::Closed))
        }
    }

    /// Parse `bytes` and dispatch every resulting key. Submitted lines are
    /// handed to the handler and then cleared from the buffer.
    pub fn feed<H: PromptHandler>(
        &mut self,
        prompt: &mut Prompt,
        handler: &mut H,
        bytes: &[u8],
    ) -> Vec<PromptEvent> {
        let events = self.parser.parse(bytes);
        dispatch(events, prompt, handler)
    }

    /// Resolve a pending lone ESC (or other stalled bytes) after the
    /// escape timeout. An unfinished paste is left alone.
    pub fn flush_pending<H: PromptHandler>(
        &mut self,
        prompt: &mut Prompt,
        handler: &mut H,
    ) -> Vec<PromptEvent> {
        let events = self.parser.flush_pending();
        dispatch(events, prompt, handler)
    }

    fn finish_input<H: PromptHandler>(
        &mut self,
        prompt: &mut Prompt,
        handler: &mut H,
    ) -> Vec<PromptEvent> {
        let events = self.parser.finish();
        dispatch(events, prompt, handler)
    }

    /// Print queued handler messages, then draw the prompt below them.
    pub fn redraw<H: PromptHandler>(&mut self, prompt: &Prompt, handler: &mut H) -> io::Result<()> {
        let messages = handler.drain_messages();
        self.renderer.print_above(&messages)?;
        self.renderer.render(&prompt.frame())
    }

    fn update_width(&mut self) {
        let width = terminal::size().ok().map(|(cols, _)| usize::from(cols));
        self.renderer.set_width(width);
    }
}

fn dispatch<H: PromptHandler>(
    events: Vec<ParsedEvent>,
    prompt: &mut Prompt,
    handler: &mut H,
) -> Vec<PromptEvent> {
    let mut outcomes = Vec::new();
    for event in &events {
        let Some(key) = KeyPress::from_event(event) else {
            tracing::trace!(?event, "event not forwarded");
            continue;
        };

        match prompt.handle_key(&key, handler) {
            PromptEvent::None => {}
            PromptEvent::Exit => {
                outcomes.push(PromptEvent::Exit);
                break;
            }
            PromptEvent::Submitted(value) => {
                prompt.set_value("");
                outcomes.push(PromptEvent::Submitted(value));
            }
            other => outcomes.push(other),
        }
    }
    outcomes
}
