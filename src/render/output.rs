//! Output buffering.
//!
//! A frame is assembled in memory and written with a single call, so the
//! terminal never shows a half-erased prompt.

use std::io::{self, Write};

/// Bytes for the next write to the terminal.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    pending: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(1024),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn write_str(&mut self, s: &str) {
        self.pending.extend_from_slice(s.as_bytes());
    }

    /// Raw mode turns off output post-processing, so a line break needs
    /// an explicit carriage return.
    pub fn newline(&mut self) {
        self.pending.extend_from_slice(b"\r\n");
    }

    /// Hand everything buffered to `writer` in one write, then flush it.
    /// Returns the number of bytes written.
    pub fn flush_to<W: Write>(&mut self, writer: &mut W) -> io::Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        writer.write_all(&self.pending)?;
        writer.flush()?;
        let written = self.pending.len();
        self.pending.clear();
        Ok(written)
    }

    #[cfg(test)]
    fn pending_text(&self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }
}

impl Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    // Nothing reaches the terminal until `flush_to`.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
