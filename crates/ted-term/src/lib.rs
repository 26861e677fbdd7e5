// SPDX-License-Identifier: MIT
//
// ted-term — terminal layer for ted.
//
// Raw-mode control, escape-sequence key decoding, and ANSI output for a
// full-screen editor that talks to the terminal directly. The visible
// surface is small: a RAII raw-mode handle that cannot leave the terminal
// broken, a finite-state key decoder, a handful of escape emitters, and a
// per-frame byte buffer flushed with a single write.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via ANSI escape
// sequences and raw termios. Every byte sent to the terminal is
// accounted for.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;
