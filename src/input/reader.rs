//! Background byte reader.
//!
//! Reads raw bytes on a dedicated thread and hands them to the session
//! through a channel, so the session loop can wait with a timeout and
//! resolve a lone ESC without blocking on the terminal.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// What the reader thread sends.
#[derive(Debug, PartialEq, Eq)]
pub enum ReaderMessage {
    Data(Vec<u8>),
    /// The source hit EOF or failed; no more data will follow.
    Closed,
}

/// Handle to the reader thread.
///
/// A thread blocked in `read` cannot be interrupted portably. `stop` only
/// clears the running flag; the thread exits on its next wakeup, or with
/// the process.
pub struct InputReader {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl InputReader {
    /// Spawn a reader over the process's stdin.
    pub fn spawn_stdin() -> io::Result<(Self, Receiver<ReaderMessage>)> {
        Self::spawn(io::stdin())
    }

    /// Spawn a reader over any byte source.
    pub fn spawn<R>(source: R) -> io::Result<(Self, Receiver<ReaderMessage>)>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name("slashline-input".to_string())
            .spawn(move || read_loop(source, running_clone, tx))?;

        Ok((
            Self {
                handle: Some(handle),
                running,
            },
            rx,
        ))
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Detach: joining could hang on a blocked read.
        drop(self.handle.take());
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop<R: Read>(mut source: R, running: Arc<AtomicBool>, tx: Sender<ReaderMessage>) {
    let mut buf = [0u8; 256];

    while running.load(Ordering::SeqCst) {
        match source.read(&mut buf) {
            Ok(0) => {
                tracing::debug!("input closed");
                let _ = tx.send(ReaderMessage::Closed);
                break;
            }
            Ok(n) => {
                if tx.send(ReaderMessage::Data(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(error = %e, "input read failed");
                let _ = tx.send(ReaderMessage::Closed);
                break;
            }
        }
    }
    running.store(false, Ordering::SeqCst);
}
