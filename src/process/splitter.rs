//! Incremental line splitting over a chunked byte stream.
//!
//! # Responsibilities
//! - Accumulate bytes until a terminator completes a line
//! - Carry a partial line across chunk boundaries
//! - Flush the pending tail exactly once when the stream ends
//!
//! # Design Decisions
//! - Splitting works on raw bytes; decoding happens per completed line, so a
//!   multi-byte character cut by a chunk boundary still decodes intact
//! - Output depends only on the byte sequence, never on how it was chunked
//! - `\n`, `\r\n` and a bare `\r` each end a line. ffmpeg rewrites its
//!   progress line with `\r` and never sends `\n` while running
//! - A line reaching [`MAX_LINE_BYTES`] is emitted as is, so a stream without
//!   terminators cannot grow the buffer without bound

/// Longest line kept in one piece.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Splits a byte stream into lines, one instance per stream.
#[derive(Debug, Default)]
pub struct LineSplitter {
    /// Bytes of the line currently being assembled.
    pending: Vec<u8>,
    /// The previous byte was a `\r`, so a following `\n` belongs to it.
    after_cr: bool,
    /// Set once end-of-stream has been consumed.
    closed: bool,
}

impl LineSplitter {
    /// Create a splitter with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the lines it completes.
    ///
    /// A zero-length chunk marks end-of-stream: the pending buffer is emitted
    /// as a final line (even when empty) and the splitter closes. Input after
    /// that is ignored.
    pub fn consume(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.closed {
            return Vec::new();
        }

        if chunk.is_empty() {
            return vec![self.finish()];
        }

        let mut lines = Vec::new();
        for &byte in chunk {
            let after_cr = std::mem::replace(&mut self.after_cr, false);
            match byte {
                b'\n' if after_cr => {}
                b'\n' => lines.push(self.take_line()),
                b'\r' => {
                    lines.push(self.take_line());
                    self.after_cr = true;
                }
                _ => {
                    self.pending.push(byte);
                    if self.pending.len() == MAX_LINE_BYTES {
                        lines.push(self.take_line());
                    }
                }
            }
        }

        lines
    }

    /// Close the stream and return the residual partial line.
    pub fn finish(&mut self) -> String {
        self.closed = true;
        self.take_line()
    }

    /// Returns true once end-of-stream has been consumed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns true if a partial line is buffered.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
