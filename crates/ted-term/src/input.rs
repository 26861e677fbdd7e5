// SPDX-License-Identifier: MIT
//
// Terminal key decoding.
//
// Turns raw stdin bytes into logical key events. The vocabulary is the
// classic VT100/xterm set:
//
// - Legacy CSI sequences (arrows, `ESC [ H/F`, `ESC [ <digit> ~`)
// - SS3 sequences (`ESC O H/F` from application-keypad terminals)
// - Control bytes (reported as `Char` + CTRL, mirroring the 0x1F mask)
// - UTF-8 multi-byte characters
//
// # Design
//
// Escape sequences arrive one byte per `read()`, so decoding is an
// explicit finite-state machine rather than a lookahead parser: feed one
// byte with [`Decoder::feed`], get at most one key back. A read timeout
// while a sequence is pending resolves the ESC ambiguity — the caller
// invokes [`Decoder::interrupt`] and a lone or unfinished escape comes
// out as a literal Escape key. Every transition is a match arm, which
// keeps the whole table testable without a terminal.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// A decoded keyboard event: key identity plus modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: Key,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

/// Identity of a key.
///
/// Special keys decoded from escape sequences get dedicated variants;
/// everything else — printable characters, tab, carriage return, the
/// stray DEL byte — is delivered as [`Char`](Key::Char) so the editor
/// sees the literal input unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A literal character (printable, tab, CR/LF, or a control byte
    /// reported together with the CTRL modifier).
    Char(char),
    /// A bare Escape keypress, or an escape sequence that never resolved.
    Escape,
    // ── Navigation ──────────────────────────────────────────────
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Editing ─────────────────────────────────────────────────
    Delete,
}

bitflags! {
    /// Keyboard modifier flags.
    ///
    /// Raw mode only ever tells us about Ctrl (a control byte is the
    /// letter with the top three bits stripped), so one flag is the
    /// whole vocabulary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0000_0001;
    }
}

/// Build a plain key press with no modifiers.
const fn press(code: Key) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: Modifiers::empty(),
    }
}

/// Build a Ctrl+key press.
const fn ctrl_key(code: Key) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: Modifiers::CTRL,
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Decoder state between bytes.
///
/// `Ground` is the resting state; the others mean a sequence is in
/// flight and the next byte decides where it goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No sequence in progress.
    Ground,
    /// ESC seen; expecting `[`, `O`, or nothing.
    Esc,
    /// `ESC [` seen; expecting a digit or a final letter.
    Csi,
    /// `ESC [ <digit>` seen; expecting the `~` terminator.
    CsiParam(u8),
    /// `ESC O` seen; expecting `H` or `F`.
    Ss3,
    /// Inside a UTF-8 multi-byte character; collecting continuations.
    Utf8 { buf: [u8; 4], len: u8, need: u8 },
}

/// Byte-at-a-time key decoder.
///
/// ```
/// use ted_term::input::{Decoder, Key};
///
/// let mut decoder = Decoder::new();
/// assert_eq!(decoder.feed(0x1b), None);          // sequence pending
/// assert_eq!(decoder.feed(b'['), None);
/// let key = decoder.feed(b'A').unwrap();
/// assert_eq!(key.code, Key::ArrowUp);
/// ```
#[derive(Debug)]
pub struct Decoder {
    state: State,
}

impl Decoder {
    /// Create a decoder in the ground state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Ground,
        }
    }

    /// True while a sequence is in flight and more bytes are expected.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !matches!(self.state, State::Ground)
    }

    /// Feed one input byte. Returns a key once one is complete.
    ///
    /// An unrecognized byte inside an escape sequence terminates the
    /// sequence as a literal Escape; the offending byte is consumed with
    /// it, matching how the terminal framed it.
    pub fn feed(&mut self, byte: u8) -> Option<KeyEvent> {
        match self.state {
            State::Ground => self.feed_ground(byte),
            State::Esc => match byte {
                b'[' => self.pending(State::Csi),
                b'O' => self.pending(State::Ss3),
                _ => self.emit(press(Key::Escape)),
            },
            State::Csi => match byte {
                d @ b'0'..=b'9' => self.pending(State::CsiParam(d - b'0')),
                b'A' => self.emit(press(Key::ArrowUp)),
                b'B' => self.emit(press(Key::ArrowDown)),
                b'C' => self.emit(press(Key::ArrowRight)),
                b'D' => self.emit(press(Key::ArrowLeft)),
                b'H' => self.emit(press(Key::Home)),
                b'F' => self.emit(press(Key::End)),
                _ => self.emit(press(Key::Escape)),
            },
            State::CsiParam(digit) => match (digit, byte) {
                (1 | 7, b'~') => self.emit(press(Key::Home)),
                (4 | 8, b'~') => self.emit(press(Key::End)),
                (3, b'~') => self.emit(press(Key::Delete)),
                (5, b'~') => self.emit(press(Key::PageUp)),
                (6, b'~') => self.emit(press(Key::PageDown)),
                _ => self.emit(press(Key::Escape)),
            },
            State::Ss3 => match byte {
                b'H' => self.emit(press(Key::Home)),
                b'F' => self.emit(press(Key::End)),
                _ => self.emit(press(Key::Escape)),
            },
            State::Utf8 { buf, len, need } => self.feed_utf8(buf, len, need, byte),
        }
    }

    /// Resolve a read timeout. A sequence cut off mid-flight becomes a
    /// literal Escape; an interrupted UTF-8 character is discarded; in
    /// the ground state there is nothing to resolve.
    pub fn interrupt(&mut self) -> Option<KeyEvent> {
        let state = std::mem::replace(&mut self.state, State::Ground);
        match state {
            State::Ground | State::Utf8 { .. } => None,
            State::Esc | State::Csi | State::CsiParam(_) | State::Ss3 => {
                Some(press(Key::Escape))
            }
        }
    }

    fn feed_ground(&mut self, byte: u8) -> Option<KeyEvent> {
        match byte {
            0x1B => self.pending(State::Esc),
            // Tab, LF, and CR stay literal: the editor inserts the raw byte.
            0x09 | 0x0A | 0x0D => self.emit(press(Key::Char(byte as char))),
            0x00 => self.emit(ctrl_key(Key::Char('@'))),
            b @ 0x01..=0x1A => self.emit(ctrl_key(Key::Char((b + b'a' - 1) as char))),
            // Remaining C0 bytes (FS/GS/RS/US) and DEL are literal too.
            b @ (0x1C..=0x1F | 0x7F) => self.emit(press(Key::Char(b as char))),
            b @ 0x20..=0x7E => self.emit(press(Key::Char(b as char))),
            // UTF-8 lead bytes.
            b @ 0xC0..=0xDF => self.pending(State::Utf8 {
                buf: [b, 0, 0, 0],
                len: 1,
                need: 2,
            }),
            b @ 0xE0..=0xEF => self.pending(State::Utf8 {
                buf: [b, 0, 0, 0],
                len: 1,
                need: 3,
            }),
            b @ 0xF0..=0xF4 => self.pending(State::Utf8 {
                buf: [b, 0, 0, 0],
                len: 1,
                need: 4,
            }),
            // Bare continuation bytes or invalid leads — drop.
            _ => None,
        }
    }

    fn feed_utf8(&mut self, mut buf: [u8; 4], len: u8, need: u8, byte: u8) -> Option<KeyEvent> {
        // A non-continuation byte aborts the character; reprocess it from
        // the ground state so a following key is not lost.
        if byte & 0xC0 != 0x80 {
            self.state = State::Ground;
            return self.feed(byte);
        }

        buf[len as usize] = byte;
        let len = len + 1;
        if len < need {
            return self.pending(State::Utf8 { buf, len, need });
        }

        self.state = State::Ground;
        std::str::from_utf8(&buf[..need as usize])
            .ok()
            .and_then(|s| s.chars().next())
            .map(|ch| press(Key::Char(ch)))
    }

    fn pending(&mut self, next: State) -> Option<KeyEvent> {
        self.state = next;
        None
    }

    fn emit(&mut self, key: KeyEvent) -> Option<KeyEvent> {
        self.state = State::Ground;
        Some(key)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
