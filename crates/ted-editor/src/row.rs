//! Row — one line of text and its render projection.
//!
//! A `Row` keeps two strings: `chars`, the text as loaded or typed, and
//! `render`, the exact sequence of characters the screen shows for it.
//! They differ only where the source contains tabs; each tab expands to
//! spaces up to the next multiple of [`TAB_STOP`].
//!
//! # Design choices
//!
//! - **Two strings, not one.** Movement and insertion work in source
//!   coordinates (`cx`), drawing and horizontal scrolling in render
//!   coordinates (`rx`). Deriving `render` eagerly after every mutation
//!   means the draw path never expands tabs itself — it just slices.
//!
//! - **Columns are char offsets**, not byte offsets. Column 3 of `"café"`
//!   is `'é'`, never a byte in the middle of its UTF-8 encoding. Byte
//!   indices stay private to this module.
//!
//! - **The tab stop is fixed at 8.** A configurable stop would thread a
//!   width parameter through every conversion for no current benefit.

// ---------------------------------------------------------------------------
// Tab stop
// ---------------------------------------------------------------------------

/// Render columns per tab stop. A tab advances the render column to the
/// next multiple of this, so it occupies between 1 and `TAB_STOP` cells.
pub const TAB_STOP: usize = 8;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of text plus its tab-expanded render string.
///
/// The two strings are kept in lockstep: every constructor and mutator
/// re-derives `render` before returning, so callers can never observe
/// them disagreeing.
///
/// ```
/// use ted_editor::row::Row;
///
/// let row = Row::new("\thi");
/// assert_eq!(row.render(), "        hi");
/// assert_eq!(row.cx_to_rx(1), 8); // cursor after the tab lands on col 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Source text, exactly as loaded or typed.
    chars: String,
    /// Display text: `chars` with every tab expanded to spaces.
    render: String,
}

impl Row {
    // -- Construction -------------------------------------------------------

    /// Create a row from source text, deriving its render string.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut row = Self {
            chars: text.to_owned(),
            render: String::new(),
        };
        row.update_render();
        row
    }

    // -- Accessors ----------------------------------------------------------

    /// The source text.
    #[inline]
    #[must_use]
    pub fn chars(&self) -> &str {
        &self.chars
    }

    /// The render text (tabs already expanded).
    #[inline]
    #[must_use]
    pub fn render(&self) -> &str {
        &self.render
    }

    /// Number of chars in the source text.
    #[inline]
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.chars.chars().count()
    }

    /// Number of chars in the render text.
    #[inline]
    #[must_use]
    pub fn render_len(&self) -> usize {
        self.render.chars().count()
    }

    /// True when the row holds no text.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Map a source column to its render column.
    ///
    /// Walks the source text up to (not including) `cx`: an ordinary char
    /// advances the render column by one, a tab advances it to the next
    /// multiple of [`TAB_STOP`]. A `cx` past the end of the row maps to
    /// the full render width.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize) -> usize {
        let mut rx = 0;
        for ch in self.chars.chars().take(cx) {
            if ch == '\t' {
                rx += (TAB_STOP - 1) - (rx % TAB_STOP);
            }
            rx += 1;
        }
        rx
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert a character at source column `at`, then re-derive the render
    /// string. `at` is clamped to the row end, so an out-of-range column
    /// appends.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let at = at.min(self.char_len());
        let byte = self.byte_of(at);
        self.chars.insert(byte, ch);
        self.update_render();
    }

    /// Rebuild `render` from `chars`, expanding tabs.
    fn update_render(&mut self) {
        let mut render = String::with_capacity(self.chars.len());
        let mut width = 0;
        for ch in self.chars.chars() {
            if ch == '\t' {
                render.push(' ');
                width += 1;
                while width % TAB_STOP != 0 {
                    render.push(' ');
                    width += 1;
                }
            } else {
                render.push(ch);
                width += 1;
            }
        }
        self.render = render;
    }

    /// Byte index of the char at `col`, or the string length when `col` is
    /// one past the end.
    fn byte_of(&self, col: usize) -> usize {
        self.chars
            .char_indices()
            .nth(col)
            .map_or(self.chars.len(), |(idx, _)| idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Fold tab expansion back out of a render string: spaces become a
    /// tab at every stop boundary they reach, and a run that falls short
    /// of a boundary stays literal.
    fn collapse_tabs(render: &str) -> String {
        let mut out = String::new();
        let mut pending = 0;
        for (col, ch) in render.chars().enumerate() {
            if ch == ' ' {
                pending += 1;
                if (col + 1) % TAB_STOP == 0 {
                    out.push('\t');
                    pending = 0;
                }
            } else {
                for _ in 0..pending {
                    out.push(' ');
                }
                pending = 0;
                out.push(ch);
            }
        }
        for _ in 0..pending {
            out.push(' ');
        }
        out
    }

    // -- Render derivation --------------------------------------------------

    #[test]
    fn render_matches_chars_without_tabs() {
        let row = Row::new("plain text, no tabs");
        assert_eq!(row.render(), row.chars());
        assert_eq!(row.render_len(), row.char_len());
    }

    #[test]
    fn empty_row() {
        let row = Row::new("");
        assert!(row.is_empty());
        assert_eq!(row.char_len(), 0);
        assert_eq!(row.render(), "");
    }

    #[test]
    fn leading_tab_expands_to_full_stop() {
        let row = Row::new("\tx");
        assert_eq!(row.render(), "        x"); // 8 spaces
        assert_eq!(row.render_len(), 9);
    }

    #[test]
    fn mid_row_tab_expands_to_next_stop() {
        // "ab" ends at render column 2, so the tab covers columns 2..8.
        let row = Row::new("ab\tc");
        assert_eq!(row.render(), "ab      c");
    }

    #[test]
    fn tab_on_stop_boundary_expands_to_eight() {
        // After 8 chars the width is already a multiple of 8, so the tab
        // contributes a full stop of 8 spaces.
        let row = Row::new("12345678\tx");
        assert_eq!(row.render(), "12345678        x");
    }

    #[test]
    fn consecutive_tabs() {
        let row = Row::new("\t\t");
        assert_eq!(row.render(), " ".repeat(16));
    }

    #[test]
    fn tab_contribution_is_between_one_and_eight() {
        // Place a tab after every possible prefix length within one stop.
        for prefix in 0..TAB_STOP {
            let text = format!("{}\t", "a".repeat(prefix));
            let row = Row::new(&text);
            let contribution = row.render_len() - prefix;
            assert!(
                (1..=TAB_STOP).contains(&contribution),
                "prefix {prefix}: tab expanded to {contribution} spaces"
            );
            assert_eq!(row.render_len() % TAB_STOP, 0);
        }
    }

    #[test]
    fn tab_expansion_folds_back_to_chars() {
        // Expansion keeps enough structure to recover the source: every
        // space run a tab produced ends exactly on a stop boundary.
        let inputs = [
            "\thi",
            "a\tb",
            "\t\tx",
            "ab\tcd\t",
            "12345678\tx",
            "a b\tc",
            "no tabs",
        ];
        for chars in inputs {
            let row = Row::new(chars);
            assert_eq!(collapse_tabs(row.render()), chars, "chars {chars:?}");
        }
    }

    // -- cx_to_rx -----------------------------------------------------------

    #[test]
    fn cx_to_rx_origin_is_zero() {
        let row = Row::new("\tabc");
        assert_eq!(row.cx_to_rx(0), 0);
    }

    #[test]
    fn cx_to_rx_without_tabs_is_identity() {
        let row = Row::new("hello");
        for cx in 0..=5 {
            assert_eq!(row.cx_to_rx(cx), cx);
        }
    }

    #[test]
    fn cx_to_rx_after_leading_tab() {
        let row = Row::new("\tx");
        assert_eq!(row.cx_to_rx(1), 8);
        assert_eq!(row.cx_to_rx(2), 9);
    }

    #[test]
    fn cx_to_rx_mid_row_tab() {
        let row = Row::new("ab\tc");
        assert_eq!(row.cx_to_rx(2), 2);
        assert_eq!(row.cx_to_rx(3), 8);
        assert_eq!(row.cx_to_rx(4), 9);
    }

    #[test]
    fn cx_to_rx_is_strictly_increasing() {
        let row = Row::new("a\tbb\t\tc");
        let mut last = row.cx_to_rx(0);
        for cx in 1..=row.char_len() {
            let rx = row.cx_to_rx(cx);
            assert!(rx > last, "rx regressed at cx {cx}: {last} -> {rx}");
            last = rx;
        }
    }

    #[test]
    fn cx_to_rx_matches_render_width() {
        // Walking the whole row must land exactly on the render length.
        let row = Row::new("\tone\ttwo\t");
        assert_eq!(row.cx_to_rx(row.char_len()), row.render_len());
    }

    #[test]
    fn cx_to_rx_past_end_saturates() {
        let row = Row::new("ab");
        assert_eq!(row.cx_to_rx(99), 2);
    }

    // -- insert_char --------------------------------------------------------

    #[test]
    fn insert_into_empty_row() {
        let mut row = Row::new("");
        row.insert_char(0, 'x');
        assert_eq!(row.chars(), "x");
        assert_eq!(row.render(), "x");
    }

    #[test]
    fn insert_in_middle() {
        let mut row = Row::new("hllo");
        row.insert_char(1, 'e');
        assert_eq!(row.chars(), "hello");
    }

    #[test]
    fn insert_past_end_appends() {
        let mut row = Row::new("ab");
        row.insert_char(99, '!');
        assert_eq!(row.chars(), "ab!");
    }

    #[test]
    fn insert_tab_rederives_render() {
        let mut row = Row::new("ab");
        row.insert_char(1, '\t');
        assert_eq!(row.chars(), "a\tb");
        assert_eq!(row.render(), "a       b");
    }

    #[test]
    fn insert_counts_chars_not_bytes() {
        let mut row = Row::new("café");
        assert_eq!(row.char_len(), 4);
        row.insert_char(4, '!');
        assert_eq!(row.chars(), "café!");
    }
}
