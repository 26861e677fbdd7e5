// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit — the renderer decides that. This module
// just knows the byte-level encoding of every terminal command we need,
// which for a full-redraw editor is a short list: cursor motion and
// visibility, line/screen erase, reverse video, and the cursor-position
// report used as a window-size fallback.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor toward the bottom-right corner (CUF 999 + CUD 999).
///
/// Both motions clamp at the screen edge, so afterwards the cursor sits in
/// the last column of the last row — the setup step for measuring the
/// window with [`cursor_position_query`].
#[inline]
pub fn cursor_to_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal where the cursor is (DSR 6).
///
/// The terminal answers on stdin with `ESC [ <row> ; <col> R`.
#[inline]
pub fn cursor_position_query(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the current line (EL 0).
///
/// Redrawing a line and then erasing its stale tail avoids the whole-screen
/// clear that makes every frame flicker.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Switch to reverse video (SGR 7) — the status bar style.
#[inline]
pub fn reverse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// Reset all SGR attributes to terminal defaults (bare SGR, same as SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
