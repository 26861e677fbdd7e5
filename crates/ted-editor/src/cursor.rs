//! Cursor — document position with movement rules.
//!
//! The cursor lives in source coordinates: `x` is a char column within a
//! row, `y` a row index. `y` may legally sit one past the last row — the
//! virtual line that typing grows the document into. Movement methods
//! take the document as a parameter; the cursor never owns or borrows it.
//!
//! # Movement rules
//!
//! - Left at column 0 wraps to the end of the previous row.
//! - Right at the row end wraps to the start of the next row.
//! - Up stops at the first row; down stops on the virtual line.
//! - After every arrow move, `x` is re-clamped to the new row's length,
//!   so the cursor can never rest past the end of its line. There is no
//!   sticky column: once clamped by a short row, the old column is gone.

use crate::document::Document;
use crate::row::Row;

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// A cursor position in document coordinates.
///
/// Lightweight value type with public fields — the key dispatcher snaps
/// `y` directly for page movement. Anything that walks row by row should
/// go through the movement methods so the `x` clamp runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Char column within the row (0-based).
    pub x: usize,
    /// Row index (0-based); `row_count` is the legal one-past line.
    pub y: usize,
}

impl Cursor {
    /// Create a cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    // -- Horizontal movement ------------------------------------------------

    /// Move one column left, wrapping to the end of the previous row when
    /// already at column 0.
    pub fn move_left(&mut self, doc: &Document) {
        if self.x > 0 {
            self.x -= 1;
        } else if self.y > 0 {
            self.y -= 1;
            self.x = row_len(doc, self.y);
        }
        self.clamp_x(doc);
    }

    /// Move one column right, wrapping to the start of the next row when
    /// already at the row end. On the virtual line there is nothing to
    /// move over, so the cursor stays put.
    pub fn move_right(&mut self, doc: &Document) {
        if let Some(row) = doc.row(self.y) {
            if self.x < row.char_len() {
                self.x += 1;
            } else {
                self.y += 1;
                self.x = 0;
            }
        }
        self.clamp_x(doc);
    }

    /// Move to column 0 of the current row.
    pub const fn move_to_line_start(&mut self) {
        self.x = 0;
    }

    /// Move one past the last character of the current row. Does nothing
    /// on the virtual line.
    pub fn move_to_line_end(&mut self, doc: &Document) {
        if let Some(row) = doc.row(self.y) {
            self.x = row.char_len();
        }
    }

    // -- Vertical movement --------------------------------------------------

    /// Move one row up, stopping at the first row.
    pub fn move_up(&mut self, doc: &Document) {
        if self.y > 0 {
            self.y -= 1;
        }
        self.clamp_x(doc);
    }

    /// Move one row down, stopping on the virtual line one past the last
    /// row.
    pub fn move_down(&mut self, doc: &Document) {
        if self.y < doc.row_count() {
            self.y += 1;
        }
        self.clamp_x(doc);
    }

    /// Re-clamp `x` to the length of the row the cursor now sits on.
    fn clamp_x(&mut self, doc: &Document) {
        self.x = self.x.min(row_len(doc, self.y));
    }
}

/// Char length of the row at `y`, or 0 on the virtual line.
fn row_len(doc: &Document, y: usize) -> usize {
    doc.row(y).map_or(0, Row::char_len)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_from(lines: &[&str]) -> Document {
        let mut doc = Document::new();
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, line);
        }
        doc
    }

    // -- Horizontal ---------------------------------------------------------

    #[test]
    fn left_at_origin_stays() {
        let doc = doc_from(&["hi"]);
        let mut cursor = Cursor::new();
        cursor.move_left(&doc);
        assert_eq!(cursor, Cursor { x: 0, y: 0 });
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let doc = doc_from(&["hello", "hi"]);
        let mut cursor = Cursor { x: 0, y: 1 };
        cursor.move_left(&doc);
        assert_eq!(cursor, Cursor { x: 5, y: 0 });
    }

    #[test]
    fn right_advances_within_row() {
        let doc = doc_from(&["ab"]);
        let mut cursor = Cursor::new();
        cursor.move_right(&doc);
        assert_eq!(cursor, Cursor { x: 1, y: 0 });
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let doc = doc_from(&["ab", "cd"]);
        let mut cursor = Cursor { x: 2, y: 0 };
        cursor.move_right(&doc);
        assert_eq!(cursor, Cursor { x: 0, y: 1 });
    }

    #[test]
    fn right_at_last_row_end_enters_virtual_line() {
        let doc = doc_from(&["ab"]);
        let mut cursor = Cursor { x: 2, y: 0 };
        cursor.move_right(&doc);
        assert_eq!(cursor, Cursor { x: 0, y: 1 });
    }

    #[test]
    fn right_on_virtual_line_stays() {
        let doc = doc_from(&["ab"]);
        let mut cursor = Cursor { x: 0, y: 1 };
        cursor.move_right(&doc);
        assert_eq!(cursor, Cursor { x: 0, y: 1 });
    }

    #[test]
    fn line_start_and_end() {
        let doc = doc_from(&["hello"]);
        let mut cursor = Cursor { x: 2, y: 0 };
        cursor.move_to_line_end(&doc);
        assert_eq!(cursor.x, 5);
        cursor.move_to_line_start();
        assert_eq!(cursor.x, 0);
    }

    #[test]
    fn line_end_on_virtual_line_is_noop() {
        let doc = doc_from(&["ab"]);
        let mut cursor = Cursor { x: 0, y: 1 };
        cursor.move_to_line_end(&doc);
        assert_eq!(cursor.x, 0);
    }

    // -- Vertical -----------------------------------------------------------

    #[test]
    fn up_stops_at_first_row() {
        let doc = doc_from(&["a", "b"]);
        let mut cursor = Cursor::new();
        cursor.move_up(&doc);
        assert_eq!(cursor.y, 0);
    }

    #[test]
    fn down_stops_on_virtual_line() {
        let doc = doc_from(&["a"]);
        let mut cursor = Cursor { x: 0, y: 1 };
        cursor.move_down(&doc);
        assert_eq!(cursor.y, 1);
    }

    #[test]
    fn down_reaches_virtual_line() {
        let doc = doc_from(&["a", "b"]);
        let mut cursor = Cursor { x: 0, y: 1 };
        cursor.move_down(&doc);
        assert_eq!(cursor.y, 2);
    }

    #[test]
    fn down_down_up_lands_on_middle_row() {
        let doc = doc_from(&["one", "two", "three"]);
        let mut cursor = Cursor::new();
        cursor.move_down(&doc);
        cursor.move_down(&doc);
        cursor.move_up(&doc);
        assert_eq!(cursor.y, 1);
    }

    // -- Clamping -----------------------------------------------------------

    #[test]
    fn vertical_move_clamps_x_to_shorter_row() {
        let doc = doc_from(&["long line", "ab"]);
        let mut cursor = Cursor { x: 7, y: 0 };
        cursor.move_down(&doc);
        assert_eq!(cursor, Cursor { x: 2, y: 1 });
    }

    #[test]
    fn no_sticky_column_after_clamp() {
        // Unlike editors with a sticky column, the clamp is permanent:
        // coming back to the long row keeps the clamped x.
        let doc = doc_from(&["long line", "ab"]);
        let mut cursor = Cursor { x: 7, y: 0 };
        cursor.move_down(&doc);
        cursor.move_up(&doc);
        assert_eq!(cursor, Cursor { x: 2, y: 0 });
    }

    #[test]
    fn moving_onto_virtual_line_zeroes_x() {
        let doc = doc_from(&["hello"]);
        let mut cursor = Cursor { x: 4, y: 0 };
        cursor.move_down(&doc);
        assert_eq!(cursor, Cursor { x: 0, y: 1 });
    }

    #[test]
    fn movement_never_escapes_bounds() {
        let doc = doc_from(&["alpha", "", "tab\there", "zz"]);
        let mut cursor = Cursor::new();
        let pattern: &[fn(&mut Cursor, &Document)] = &[
            Cursor::move_right,
            Cursor::move_down,
            Cursor::move_right,
            Cursor::move_right,
            Cursor::move_up,
            Cursor::move_left,
            Cursor::move_down,
            Cursor::move_down,
        ];
        for step in pattern.iter().cycle().take(200) {
            step(&mut cursor, &doc);
            assert!(cursor.y <= doc.row_count());
            let limit = doc.row(cursor.y).map_or(0, Row::char_len);
            assert!(cursor.x <= limit, "x {} beyond row len {limit}", cursor.x);
        }
    }
}
