// src/exec/scanner.rs

//! Incremental line splitting for process output.
//!
//! Maintenance tools redraw their progress bars with a bare `\r`, so a
//! carriage return ends a line just like `\n` does (and `\r\n` counts once).
//! Bytes are buffered until a terminator arrives, which keeps multi-byte
//! UTF-8 sequences intact even when a read splits them.

/// Splits a byte stream into lines, one chunk at a time.
#[derive(Debug, Default)]
pub struct LineScanner {
    buf: Vec<u8>,
    pending_cr: bool,
}

impl LineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed.
    ///
    /// Returned lines are raw: not trimmed, possibly empty.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in chunk {
            if self.pending_cr {
                self.pending_cr = false;
                if byte == b'\n' {
                    continue;
                }
            }

            match byte {
                b'\n' => lines.push(self.take_line()),
                b'\r' => {
                    lines.push(self.take_line());
                    self.pending_cr = true;
                }
                _ => self.buf.push(byte),
            }
        }

        lines
    }

    /// Flush the trailing unterminated fragment, if any, at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        self.pending_cr = false;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take_line())
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

/// Trim trailing whitespace; `None` for lines that end up empty.
pub fn clean_line(raw: &str) -> Option<&str> {
    let trimmed = raw.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
