// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control — there is no
// safe alternative. Each unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It enters raw mode via termios
// with a bounded read (VMIN=0, VTIME=1): every read() returns within a tenth
// of a second carrying zero or one byte, so the key loop can resolve the
// lone-ESC ambiguity by timeout and signals still interrupt the process.
// Restoration is guaranteed on drop — even if the editor panics mid-frame.
//
// The panic hook deserves special mention: it bypasses Rust's stdout lock
// entirely, writing a pre-built restore sequence directly to fd 1. This
// prevents deadlock if the panic happened while holding the stdout lock
// (common during frame rendering). One raw write, everything restored,
// then the original panic handler prints its message to a working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::{Decoder, KeyEvent};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// reported size has a zero dimension (some terminals answer the ioctl
/// with zeros, which is as useless as failing).
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup — behind a [`Mutex`], not `static mut` —
/// lets the hook restore cooked mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Screen restore sequence for emergency use.
///
/// Concatenation of: clear screen, cursor home, reset SGR attributes,
/// show cursor. The panic message then prints at the top of a clean,
/// working screen instead of into the wreckage of a half-drawn frame.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[m\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen restore sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter_raw_mode`](Self::enter_raw_mode) before reading keys or
/// probing the window size. The original attributes are reapplied when the
/// handle is dropped — even on panic.
///
/// # Example
///
/// ```no_run
/// use ted_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter_raw_mode()?;
/// let size = term.window_size()?;
/// // ... draw frames, read keys ...
/// // Terminal is restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Escape-sequence decoder fed by [`read_key`](Self::read_key).
    decoder: Decoder,

    /// Whether raw mode is active.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle.
    ///
    /// Does **not** touch the terminal — call
    /// [`enter_raw_mode`](Self::enter_raw_mode) for that.
    ///
    /// # Errors
    ///
    /// Currently infallible, but returns `Result` for forward compatibility
    /// (e.g., opening `/dev/tty` instead of relying on stdin).
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            original_termios: None,
            decoder: Decoder::new(),
            active: false,
        })
    }

    /// Whether raw mode is currently active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Snapshots the current attributes, then disables echo, canonical
    /// input, signal keys, implementation-defined input processing, output
    /// post-processing, flow control, and CR translation; sets VMIN=0 /
    /// VTIME=1 so reads are bounded. Installs the panic hook on first use.
    ///
    /// Idempotent: calling while already active is a no-op. Off a TTY the
    /// attribute calls are skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes cannot be read or set.
    pub fn enter_raw_mode(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        // Install the panic hook (once per process).
        install_panic_hook();

        self.enable_raw_mode()?;
        self.active = true;
        tracing::debug!("entered raw mode");
        Ok(())
    }

    /// Leave raw mode and restore the original attributes.
    ///
    /// Idempotent: calling while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the termios restore fails.
    pub fn leave_raw_mode(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!("restored terminal attributes");
        Ok(())
    }

    /// Read the next logical key, blocking until one arrives.
    ///
    /// Each underlying read returns within the VTIME window. A timeout in
    /// the ground state just waits again; a timeout mid-sequence resolves
    /// to a literal Escape, so decoding never stalls on an unfinished
    /// sequence. Interrupted and would-block reads are retried.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub fn read_key(&mut self) -> io::Result<KeyEvent> {
        loop {
            match read_byte()? {
                Some(byte) => {
                    if let Some(key) = self.decoder.feed(byte) {
                        return Ok(key);
                    }
                }
                None => {
                    if let Some(key) = self.decoder.interrupt() {
                        return Ok(key);
                    }
                }
            }
        }
    }

    /// Measure the terminal, preferring `ioctl(TIOCGWINSZ)`.
    ///
    /// When the ioctl is unavailable or useless, falls back to the probe:
    /// push the cursor to the bottom-right corner, ask the terminal where
    /// the cursor is, and parse the reply. The fallback requires raw mode
    /// (the reply arrives unbuffered on stdin).
    ///
    /// # Errors
    ///
    /// Returns an error if neither mechanism produces a usable size.
    pub fn window_size(&mut self) -> io::Result<Size> {
        if let Some(size) = get_size() {
            return Ok(size);
        }
        tracing::debug!("TIOCGWINSZ unavailable, probing with cursor report");
        self.probe_size()
    }

    /// Window-size fallback: cursor-position report after a forced move.
    fn probe_size(&mut self) -> io::Result<Size> {
        {
            let mut stdout = io::stdout().lock();
            ansi::cursor_to_bottom_right(&mut stdout)?;
            ansi::cursor_position_query(&mut stdout)?;
            stdout.flush()?;
        }

        // Collect the reply up to and including the final `R`. The bound
        // covers the longest legal report with room to spare.
        let mut reply = Vec::with_capacity(32);
        while reply.len() < 32 {
            match read_byte()? {
                Some(byte) => {
                    reply.push(byte);
                    if byte == b'R' {
                        break;
                    }
                }
                None => break,
            }
        }

        parse_cursor_report(&reply).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "terminal did not report a usable window size",
            )
        })
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            // Save original for restore.
            self.original_termios = Some(termios);

            // Also save to global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // No break-as-interrupt, no CR→NL translation, no parity
            // checking, no bit stripping, no flow control.
            termios.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            // No output post-processing ("\n" stays a bare line feed).
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            // No echo, no line buffering, no Ctrl-V, no signal keys.
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most a tenth of a
            // second with zero or one byte.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave_raw_mode();
        }
    }
}

// ─── Byte input ─────────────────────────────────────────────────────────────

/// Read one byte from stdin under the VMIN=0/VTIME=1 discipline.
///
/// `Ok(None)` means the VTIME window expired with nothing to read.
/// `EINTR` and `EAGAIN` are absorbed here; everything else propagates.
#[cfg(unix)]
fn read_byte() -> io::Result<Option<u8>> {
    let mut byte: u8 = 0;
    loop {
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                (&raw mut byte).cast::<libc::c_void>(),
                1,
            )
        };
        match n {
            1 => return Ok(Some(byte)),
            0 => return Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                if !matches!(
                    err.kind(),
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
                ) {
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(not(unix))]
fn read_byte() -> io::Result<Option<u8>> {
    // No termios timeout off Unix: fall back to a plain blocking read.
    use std::io::Read;
    let mut byte = [0u8; 1];
    match io::stdin().read(&mut byte)? {
        0 => Ok(None),
        _ => Ok(Some(byte[0])),
    }
}

// ─── Cursor report parsing ──────────────────────────────────────────────────

/// Parse a cursor-position report, `ESC [ <rows> ; <cols> R`.
///
/// Returns `None` for malformed or truncated replies and for reports with
/// a zero dimension.
fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?.strip_suffix(b"R")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some(Size { cols, rows })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
