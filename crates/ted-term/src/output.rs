// SPDX-License-Identifier: MIT
//
// Frame output buffering.
//
// The renderer never touches the live terminal cell by cell. Every escape
// sequence and every character of a frame is appended to an in-memory
// buffer first, and the completed frame goes out in one write() syscall.
// One write per frame is what makes the redraw tear-free: the terminal
// never displays a half-painted screen between two partial writes.

use std::io::{self, Write};

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame for a single `write()` syscall.
///
/// Implements [`Write`], so the ANSI emitters and `write!` both append to
/// it directly. [`flush_stdout`](Self::flush_stdout) ships the frame and
/// resets the buffer for the next one, keeping the allocation.
///
/// Default capacity: 16 KB — enough for a full frame on common terminal
/// sizes without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated frame to stdout and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush_stdout(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&self.buf)?;
            stdout.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_stdout().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
