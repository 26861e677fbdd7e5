// SPDX-License-Identifier: MIT
//
// ted — a minimal full-screen terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   ted-term   → raw mode, key decoding, ANSI output, window size
//   ted-editor → rows, document, cursor, viewport, status message
//
// The Editor struct holds one session's state. Each iteration of the
// main loop paints a complete frame, then blocks on the next key:
//
//   refresh_screen → scroll → draw rows/status/message → one write
//   read_key       → stdin bytes → decoder → KeyEvent
//   process_key    → cursor motion, literal insertion, or quit
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ text area                    │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status bar (reverse video)   │  ← 1 row
//   ├──────────────────────────────┤
//   │ message line                 │  ← 1 row
//   └──────────────────────────────┘
//
// The window size is measured once at startup; a resize is picked up on
// the next start.

use std::env;
use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use ted_editor::cursor::Cursor;
use ted_editor::document::Document;
use ted_editor::message::StatusMessage;
use ted_editor::view::{self, View};

use ted_term::ansi;
use ted_term::input::{Key, KeyEvent, Modifiers};
use ted_term::output::OutputBuffer;
use ted_term::terminal::{Size, Terminal};

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

// ─── Dispatcher outcome ─────────────────────────────────────────────────────

/// What the key dispatcher tells the main loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep reading keys.
    Continue,
    /// Leave the loop and exit cleanly.
    Quit,
}

// ─── Editor ─────────────────────────────────────────────────────────────────

/// One editing session: the document, the cursor position in it, the
/// scroll state, and the transient bottom-line message.
struct Editor {
    /// The text being viewed or edited.
    document: Document,
    /// Cursor position in document coordinates.
    cursor: Cursor,
    /// Scroll offsets mapping the document onto the screen.
    view: View,
    /// Timed message shown on the bottom line.
    message: StatusMessage,
    /// Screen rows available for text (total minus the two bars).
    text_rows: usize,
    /// Screen columns available for text.
    text_cols: usize,
}

impl Editor {
    /// Create a session for `document` on a terminal of `size`.
    fn new(document: Document, size: Size) -> Self {
        let mut message = StatusMessage::new();
        message.set("HELP: Ctrl-Q = quit");
        Self {
            document,
            cursor: Cursor::new(),
            view: View::new(),
            message,
            text_rows: usize::from(size.rows).saturating_sub(2),
            text_cols: usize::from(size.cols),
        }
    }

    /// Paint frames and dispatch keys until quit or error.
    fn run(&mut self, terminal: &mut Terminal) -> io::Result<()> {
        loop {
            self.refresh_screen()?;
            let key = terminal.read_key()?;
            match self.process_key(key)? {
                Action::Continue => {}
                Action::Quit => return Ok(()),
            }
        }
    }

    // ─── Rendering ──────────────────────────────────────────────────────────

    /// Compose one complete frame.
    ///
    /// Scrolls first so the offsets are current, then appends in draw
    /// order: hide the cursor, home, text rows, status bar, message bar,
    /// reposition the cursor inside the viewport, show it again. The
    /// caller writes the whole buffer in one syscall, so the terminal
    /// never shows a half-painted state.
    fn compose_frame(&mut self) -> io::Result<OutputBuffer> {
        let rx = self
            .view
            .scroll(&self.cursor, &self.document, self.text_rows, self.text_cols);

        let mut frame = OutputBuffer::new();
        ansi::cursor_hide(&mut frame)?;
        ansi::cursor_home(&mut frame)?;
        self.view
            .draw_rows(&mut frame, &self.document, self.text_rows, self.text_cols)?;
        view::draw_status_bar(&mut frame, &self.document, &self.cursor, self.text_cols)?;
        view::draw_message_bar(&mut frame, &self.message, Instant::now(), self.text_cols)?;

        let (x, y) = self.cursor_screen_position(rx);
        ansi::cursor_to(&mut frame, x, y)?;
        ansi::cursor_show(&mut frame)?;
        Ok(frame)
    }

    /// Paint the current frame with a single write to stdout.
    fn refresh_screen(&mut self) -> io::Result<()> {
        self.compose_frame()?.flush_stdout()
    }

    /// Cursor position in 0-indexed screen coordinates.
    ///
    /// The subtractions cannot underflow: `scroll` never leaves an
    /// offset above the cursor, even when the window is too small for
    /// any text rows or columns. On any usable terminal the results fit
    /// in `u16`.
    #[allow(clippy::cast_possible_truncation)]
    const fn cursor_screen_position(&self, rx: usize) -> (u16, u16) {
        let x = (rx - self.view.col_offset()) as u16;
        let y = (self.cursor.y - self.view.row_offset()) as u16;
        (x, y)
    }

    // ─── Key dispatch ───────────────────────────────────────────────────────

    /// Apply one key to the session.
    ///
    /// Movement keys reposition the cursor, `Ctrl-Q` quits, `Delete` and
    /// a bare `Escape` are absorbed, and every other character is
    /// inserted literally.
    fn process_key(&mut self, key: KeyEvent) -> io::Result<Action> {
        match key.code {
            Key::Char('q') if key.modifiers.contains(Modifiers::CTRL) => {
                info!("quit");
                clear_screen()?;
                return Ok(Action::Quit);
            }
            Key::ArrowUp => self.cursor.move_up(&self.document),
            Key::ArrowDown => self.cursor.move_down(&self.document),
            Key::ArrowLeft => self.cursor.move_left(&self.document),
            Key::ArrowRight => self.cursor.move_right(&self.document),
            Key::Home => self.cursor.move_to_line_start(),
            Key::End => self.cursor.move_to_line_end(&self.document),
            Key::PageUp => self.page_up(),
            Key::PageDown => self.page_down(),
            // Deletion is not implemented; a bare Escape has no binding.
            Key::Delete | Key::Escape => {}
            Key::Char(ch) => self.insert_char(ch, key.modifiers),
        }
        Ok(Action::Continue)
    }

    /// Move up one screenful: snap to the top edge of the viewport, then
    /// walk up a screen of rows so the per-line clamp rules apply.
    fn page_up(&mut self) {
        self.cursor.y = self.view.row_offset();
        for _ in 0..self.text_rows {
            self.cursor.move_up(&self.document);
        }
    }

    /// Move down one screenful: snap to the bottom edge of the viewport
    /// (clamped to the virtual line), then walk down a screen of rows.
    fn page_down(&mut self) {
        self.cursor.y = (self.view.row_offset() + self.text_rows)
            .saturating_sub(1)
            .min(self.document.row_count());
        for _ in 0..self.text_rows {
            self.cursor.move_down(&self.document);
        }
    }

    /// Insert the decoded character at the cursor and advance.
    ///
    /// Ctrl combinations insert the control byte the terminal actually
    /// sent: the decoder reports Ctrl-A as `Char('a')` + CTRL, so the
    /// 0x1F mask is undone here and 0x01 lands in the row, just like the
    /// tab, CR, and DEL bytes that arrive as plain chars.
    fn insert_char(&mut self, ch: char, modifiers: Modifiers) {
        // The decoder only attaches CTRL to ASCII `@` and letters, so the
        // masked byte is exactly what the terminal sent.
        #[allow(clippy::cast_possible_truncation)]
        let ch = if modifiers.contains(Modifiers::CTRL) {
            char::from(ch as u8 & 0x1F)
        } else {
            ch
        };
        self.document.insert_char(self.cursor.y, self.cursor.x, ch);
        self.cursor.x += 1;
    }
}

/// Wipe the screen and home the cursor.
///
/// Used at quit and before a fatal error report — the only moments the
/// whole screen is cleared; frames rely on per-line erase instead.
fn clear_screen() -> io::Result<()> {
    let mut out = OutputBuffer::new();
    ansi::clear_screen(&mut out)?;
    ansi::cursor_home(&mut out)?;
    out.flush_stdout()
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Set up the opt-in log file.
///
/// Stdout belongs to the UI, so events never go there. When `RUST_LOG`
/// is set they are written to `ted.log` in the working directory through
/// a non-blocking writer; without it, logging stays off and the editor
/// touches no file besides the document.
fn init_logging() -> Option<WorkerGuard> {
    if env::var_os("RUST_LOG").is_none() {
        return None;
    }

    let appender = tracing_appender::rolling::never(".", "ted.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        // A subscriber is already installed; let this writer shut down.
        Err(_) => None,
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

/// Enter raw mode, measure the screen, and run the session.
///
/// The terminal handle lives in this frame, so raw mode is unwound by
/// its `Drop` on every way out — clean quit, error, or panic.
fn run_editor(document: Document) -> io::Result<()> {
    let mut terminal = Terminal::new()?;
    terminal.enter_raw_mode()?;
    let size = terminal.window_size()?;
    info!(cols = size.cols, rows = size.rows, "session started");

    let mut editor = Editor::new(document, size);
    let result = editor.run(&mut terminal);
    if result.is_err() {
        // Leave a clean screen for the error report; ignore nested
        // failures so the original error is the one that surfaces.
        let _ = clear_screen();
    }
    result
}

/// Report a fatal error and exit.
///
/// Takes the log guard by value so pending lines flush before the
/// process dies — `process::exit` runs no destructors.
fn fail(log_guard: Option<WorkerGuard>, message: &str) -> ! {
    eprintln!("ted: {message}");
    drop(log_guard);
    process::exit(1);
}

fn main() {
    let log_guard = init_logging();

    let document = match env::args().nth(1) {
        Some(path) => match Document::open(Path::new(&path)) {
            Ok(document) => document,
            Err(e) => fail(log_guard, &format!("{path}: {e}")),
        },
        None => Document::new(),
    };

    if let Err(e) = run_editor(document) {
        fail(log_guard, &e.to_string());
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Create a key press with no modifiers.
    fn press(code: Key) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Create a Ctrl+char key press.
    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent {
            code: Key::Char(ch),
            modifiers: Modifiers::CTRL,
        }
    }

    /// Create an 80x24 session over the given lines.
    fn editor_with(lines: &[&str]) -> Editor {
        let mut document = Document::new();
        for (i, line) in lines.iter().enumerate() {
            document.insert_row(i, line);
        }
        Editor::new(document, Size { cols: 80, rows: 24 })
    }

    /// Feed keys through the dispatcher, asserting none of them quit.
    fn feed(editor: &mut Editor, keys: &[KeyEvent]) {
        for &key in keys {
            let action = editor.process_key(key).unwrap();
            assert_eq!(action, Action::Continue);
        }
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    #[test]
    fn two_rows_reserved_for_bars() {
        let e = editor_with(&[]);
        assert_eq!(e.text_rows, 22);
        assert_eq!(e.text_cols, 80);
    }

    #[test]
    fn tiny_terminal_leaves_no_text_rows() {
        let e = Editor::new(Document::new(), Size { cols: 10, rows: 1 });
        assert_eq!(e.text_rows, 0);
    }

    #[test]
    fn startup_message_is_the_help_line() {
        let e = editor_with(&[]);
        assert_eq!(e.message.text(), "HELP: Ctrl-Q = quit");
        assert!(e.message.visible(Instant::now()));
    }

    // ── Cursor keys ───────────────────────────────────────────────────────

    #[test]
    fn arrows_move_the_cursor() {
        let mut e = editor_with(&["ab", "cd"]);
        feed(&mut e, &[press(Key::ArrowRight), press(Key::ArrowDown)]);
        assert_eq!((e.cursor.x, e.cursor.y), (1, 1));
        feed(&mut e, &[press(Key::ArrowLeft), press(Key::ArrowUp)]);
        assert_eq!((e.cursor.x, e.cursor.y), (0, 0));
    }

    #[test]
    fn left_at_line_start_wraps_to_previous_end() {
        let mut e = editor_with(&["ab", "cd"]);
        feed(&mut e, &[press(Key::ArrowDown), press(Key::ArrowLeft)]);
        assert_eq!((e.cursor.x, e.cursor.y), (2, 0));
    }

    #[test]
    fn home_and_end_jump_within_the_line() {
        let mut e = editor_with(&["hello"]);
        feed(&mut e, &[press(Key::End)]);
        assert_eq!(e.cursor.x, 5);
        feed(&mut e, &[press(Key::Home)]);
        assert_eq!(e.cursor.x, 0);
    }

    #[test]
    fn page_down_snaps_to_bottom_then_walks_a_screenful() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut e = editor_with(&refs);

        // Bottom edge is row 21 on a 22-row text area; 22 steps down
        // from there lands on row 43.
        feed(&mut e, &[press(Key::PageDown)]);
        assert_eq!(e.cursor.y, 43);
    }

    #[test]
    fn page_up_from_a_scrolled_view_returns_by_screenfuls() {
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut e = editor_with(&refs);

        feed(&mut e, &[press(Key::PageDown)]);
        // Composing a frame scrolls the viewport down to the cursor.
        let _ = e.compose_frame().unwrap();
        assert_eq!(e.view.row_offset(), 22);

        feed(&mut e, &[press(Key::PageUp)]);
        assert_eq!(e.cursor.y, 0);
    }

    #[test]
    fn page_down_near_the_end_stops_at_the_virtual_line() {
        let mut e = editor_with(&["one", "two"]);
        feed(&mut e, &[press(Key::PageDown)]);
        assert_eq!(e.cursor.y, 2);
        assert_eq!(e.cursor.x, 0);
    }

    // ── Editing keys ──────────────────────────────────────────────────────

    #[test]
    fn typing_inserts_and_advances() {
        let mut e = editor_with(&[]);
        feed(&mut e, &[press(Key::Char('h')), press(Key::Char('i'))]);
        assert_eq!(e.document.row(0).unwrap().chars(), "hi");
        assert_eq!((e.cursor.x, e.cursor.y), (2, 0));
    }

    #[test]
    fn typing_mid_line_splices() {
        let mut e = editor_with(&["ab"]);
        feed(&mut e, &[press(Key::ArrowRight), press(Key::Char('X'))]);
        assert_eq!(e.document.row(0).unwrap().chars(), "aXb");
        assert_eq!(e.cursor.x, 2);
    }

    #[test]
    fn typing_on_the_virtual_line_appends_a_row() {
        let mut e = editor_with(&["one"]);
        feed(&mut e, &[press(Key::ArrowDown), press(Key::Char('x'))]);
        assert_eq!(e.document.row_count(), 2);
        assert_eq!(e.document.row(1).unwrap().chars(), "x");
        assert_eq!((e.cursor.x, e.cursor.y), (1, 1));
    }

    #[test]
    fn tab_and_enter_insert_their_raw_bytes() {
        let mut e = editor_with(&[]);
        feed(&mut e, &[press(Key::Char('\t')), press(Key::Char('\r'))]);
        assert_eq!(e.document.row(0).unwrap().chars(), "\t\r");
    }

    #[test]
    fn ctrl_combo_inserts_the_control_byte() {
        let mut e = editor_with(&[]);
        feed(&mut e, &[ctrl('a')]);
        assert_eq!(e.document.row(0).unwrap().chars(), "\u{1}");
        assert_eq!(e.cursor.x, 1);
    }

    #[test]
    fn ctrl_h_inserts_the_backspace_byte() {
        // 0x08 arrives from the decoder as Ctrl-H; re-masking stores the
        // byte the terminal sent.
        let mut e = editor_with(&[]);
        feed(&mut e, &[ctrl('h')]);
        assert_eq!(e.document.row(0).unwrap().chars(), "\u{8}");
    }

    #[test]
    fn delete_and_escape_are_absorbed() {
        let mut e = editor_with(&["ab"]);
        feed(&mut e, &[press(Key::Delete), press(Key::Escape)]);
        assert_eq!(e.document.row(0).unwrap().chars(), "ab");
        assert_eq!((e.cursor.x, e.cursor.y), (0, 0));
    }

    // ── Quit ──────────────────────────────────────────────────────────────

    #[test]
    fn ctrl_q_quits() {
        let mut e = editor_with(&[]);
        let action = e.process_key(ctrl('q')).unwrap();
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn plain_q_is_just_a_character() {
        let mut e = editor_with(&[]);
        feed(&mut e, &[press(Key::Char('q'))]);
        assert_eq!(e.document.row(0).unwrap().chars(), "q");
    }

    // ── Frame composition ─────────────────────────────────────────────────

    #[test]
    fn empty_document_frame_has_banner_bars_and_homed_cursor() {
        let mut e = editor_with(&[]);
        let frame = e.compose_frame().unwrap();
        let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();

        assert!(text.starts_with("\x1b[?25l\x1b[H"));
        assert!(text.ends_with("\x1b[1;1H\x1b[?25h"));
        assert!(text.contains("ted editor -- version"));
        assert!(text.contains("[No Name] - 0 lines"));
        assert!(text.contains("1/0"));
        assert!(text.contains("HELP: Ctrl-Q = quit"));
        // Per-line erase everywhere; never a full-screen clear.
        assert!(!text.contains("\x1b[2J"));
    }

    #[test]
    fn frame_positions_the_cursor_inside_the_viewport() {
        let mut e = editor_with(&["hello", "world"]);
        feed(&mut e, &[press(Key::ArrowDown), press(Key::ArrowRight)]);
        let frame = e.compose_frame().unwrap();
        let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();
        assert!(text.ends_with("\x1b[2;2H\x1b[?25h"));
    }

    #[test]
    fn frame_cursor_column_uses_the_render_position() {
        let mut e = editor_with(&["\tx"]);
        feed(&mut e, &[press(Key::ArrowRight)]);
        let frame = e.compose_frame().unwrap();
        let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();
        // cx 1 sits after the tab, which renders 8 columns wide.
        assert!(text.ends_with("\x1b[1;9H\x1b[?25h"));
    }

    #[test]
    fn status_line_tracks_the_cursor_row() {
        let mut e = editor_with(&["a", "b", "c"]);
        feed(&mut e, &[press(Key::ArrowDown), press(Key::ArrowDown)]);
        let frame = e.compose_frame().unwrap();
        let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();
        assert!(text.contains("3/3"));
    }

    #[test]
    fn tiny_terminal_frames_still_compose() {
        // One or two rows leave nothing for text; the frame is just the
        // bars, with the cursor homed.
        for rows in [1, 2] {
            let mut e = Editor::new(Document::new(), Size { cols: 80, rows });
            let frame = e.compose_frame().unwrap();
            let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();
            assert!(text.contains("[No Name] - 0 lines"), "rows {rows}");
            assert!(text.ends_with("\x1b[1;1H\x1b[?25h"), "rows {rows}");
        }
    }

    #[test]
    fn two_row_terminal_keeps_composing_as_the_cursor_moves() {
        let mut document = Document::new();
        document.insert_row(0, "one");
        document.insert_row(1, "two");
        let mut e = Editor::new(document, Size { cols: 80, rows: 2 });

        feed(&mut e, &[press(Key::ArrowDown)]);
        let frame = e.compose_frame().unwrap();
        let text = String::from_utf8(frame.as_bytes().to_vec()).unwrap();
        // No text rows to scroll into: the offsets stay at the origin
        // and the cursor row maps straight through.
        assert_eq!(e.view.row_offset(), 0);
        assert!(text.ends_with("\x1b[2;1H\x1b[?25h"));
    }
}
