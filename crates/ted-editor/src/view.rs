//! View — viewport state and frame drawing.
//!
//! A `View` decides which part of a [`Document`] is on screen: the first
//! visible row (`row_offset`) and the first visible render column
//! (`col_offset`). Scrolling is recomputed from the cursor before every
//! frame, and drawing appends finished screen lines to a ted-term
//! [`OutputBuffer`] so the caller can push the whole frame in one write.
//!
//! The screen is never cleared wholesale between frames. Each line ends
//! with an erase-to-end-of-line, which overwrites leftovers from the
//! previous frame without the flicker a full clear causes.
//!
//! # Frame anatomy
//!
//! ```text
//! ┌────────────────────────────────┐
//! │ text rows (render slices, `~`) │  ← text_rows
//! ├────────────────────────────────┤
//! │ status bar (reverse video)     │  ← 1 row
//! ├────────────────────────────────┤
//! │ message bar (transient)        │  ← 1 row
//! └────────────────────────────────┘
//! ```
//!
//! The status and message bars are plain functions — they carry no
//! viewport state. Only the text area needs the offsets.

use std::io::{self, Write};
use std::time::Instant;

use ted_term::ansi;
use ted_term::output::OutputBuffer;

use crate::cursor::Cursor;
use crate::document::Document;
use crate::message::StatusMessage;

/// Banner shown in an empty document.
const WELCOME: &str = concat!("ted editor -- version ", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Scroll state: the document row and render column at the top-left of
/// the text area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct View {
    row_offset: usize,
    col_offset: usize,
}

impl View {
    /// Create a view scrolled to the top-left corner.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible document row.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First visible render column.
    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    // -- Scrolling ----------------------------------------------------------

    /// Bring the cursor into the viewport and return its render column.
    ///
    /// `rx` is recomputed from the cursor's source column via
    /// [`cx_to_rx`](crate::row::Row::cx_to_rx), or 0 on the virtual line
    /// past the last row. Each offset then moves just far enough that
    /// `row_offset <= cy < row_offset + text_rows` and
    /// `col_offset <= rx < col_offset + text_cols`. A zero-size text
    /// area cannot satisfy the upper bounds; the offsets then hold at or
    /// below the cursor instead of sliding past it.
    pub fn scroll(
        &mut self,
        cursor: &Cursor,
        doc: &Document,
        text_rows: usize,
        text_cols: usize,
    ) -> usize {
        let rx = doc.row(cursor.y).map_or(0, |row| row.cx_to_rx(cursor.x));

        if cursor.y < self.row_offset {
            self.row_offset = cursor.y;
        }
        if text_rows > 0 && cursor.y >= self.row_offset + text_rows {
            self.row_offset = cursor.y - text_rows + 1;
        }
        if rx < self.col_offset {
            self.col_offset = rx;
        }
        if text_cols > 0 && rx >= self.col_offset + text_cols {
            self.col_offset = rx - text_cols + 1;
        }

        rx
    }

    // -- Drawing ------------------------------------------------------------

    /// Append the text area to the frame: one screen line per row.
    ///
    /// Document rows are drawn as the render slice starting at
    /// `col_offset`, clipped to `text_cols` chars. Rows past the end of
    /// the document get a `~` marker; an empty document additionally gets
    /// the centered welcome banner a third of the way down. Every line
    /// ends with erase-to-end-of-line and `\r\n`.
    ///
    /// # Errors
    ///
    /// Returns an error if appending to the frame fails.
    pub fn draw_rows(
        &self,
        frame: &mut OutputBuffer,
        doc: &Document,
        text_rows: usize,
        text_cols: usize,
    ) -> io::Result<()> {
        for y in 0..text_rows {
            let file_row = y + self.row_offset;
            if let Some(row) = doc.row(file_row) {
                let visible: String = row
                    .render()
                    .chars()
                    .skip(self.col_offset)
                    .take(text_cols)
                    .collect();
                frame.write_all(visible.as_bytes())?;
            } else if doc.is_empty() && y == text_rows / 3 {
                draw_welcome(frame, text_cols)?;
            } else {
                frame.write_all(b"~")?;
            }
            ansi::clear_line(frame)?;
            frame.write_all(b"\r\n")?;
        }
        Ok(())
    }
}

/// Center the welcome banner in `width` columns, keeping the `~` marker
/// when there is room for it.
fn draw_welcome(frame: &mut OutputBuffer, width: usize) -> io::Result<()> {
    let text: String = WELCOME.chars().take(width).collect();
    let mut padding = (width - text.chars().count()) / 2;
    if padding > 0 {
        frame.write_all(b"~")?;
        padding -= 1;
    }
    for _ in 0..padding {
        frame.write_all(b" ")?;
    }
    frame.write_all(text.as_bytes())
}

// ---------------------------------------------------------------------------
// Status and message bars
// ---------------------------------------------------------------------------

/// Append the reverse-video status bar: document name and line count on
/// the left, `current/total` position on the right, spaces in between.
///
/// The name is truncated to 20 chars and the whole line is clipped to
/// `width`. The right side is dropped entirely when it would not fit
/// flush against the edge.
///
/// # Errors
///
/// Returns an error if appending to the frame fails.
pub fn draw_status_bar(
    frame: &mut OutputBuffer,
    doc: &Document,
    cursor: &Cursor,
    width: usize,
) -> io::Result<()> {
    let left = format!("{:.20} - {} lines", doc.display_name(), doc.row_count());
    let right = format!("{}/{}", cursor.y + 1, doc.row_count());

    ansi::reverse(frame)?;
    let clipped: String = left.chars().take(width).collect();
    let mut len = clipped.chars().count();
    frame.write_all(clipped.as_bytes())?;

    let right_len = right.chars().count();
    while len < width {
        if width - len == right_len {
            frame.write_all(right.as_bytes())?;
            break;
        }
        frame.write_all(b" ")?;
        len += 1;
    }
    ansi::reset(frame)?;
    frame.write_all(b"\r\n")
}

/// Append the message bar: erase the line, then the status message text
/// clipped to `width` — but only while the message is still fresh.
///
/// # Errors
///
/// Returns an error if appending to the frame fails.
pub fn draw_message_bar(
    frame: &mut OutputBuffer,
    message: &StatusMessage,
    now: Instant,
    width: usize,
) -> io::Result<()> {
    ansi::clear_line(frame)?;
    if message.visible(now) {
        let clipped: String = message.text().chars().take(width).collect();
        frame.write_all(clipped.as_bytes())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
