//! Document — the ordered row store.
//!
//! A `Document` owns a file's lines as [`Row`]s, in file order, together
//! with the path it was loaded from. It is the single place rows are
//! created, so the row/render invariant holds document-wide: every row's
//! render string is derived before the row becomes visible to callers.
//!
//! # Design choices
//!
//! - **A `Vec` of rows, not a rope.** The editor never splits, joins, or
//!   deletes lines, so indexed access and in-row insertion are the whole
//!   workload. A rope would buy nothing here.
//!
//! - **Line terminators are stripped on load.** Rows never contain `\n`
//!   or `\r\n`; the terminator belongs to the file, not the text. Both
//!   Unix and DOS endings load identically.
//!
//! - **Loading is the only I/O.** There is no save path; the document is
//!   mutated in memory and discarded on exit.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::row::Row;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// An ordered collection of text rows, usually loaded from a file.
///
/// Row indices are 0-based and stable: rows are only ever inserted, never
/// removed or reordered. The cursor may sit on the virtual line one past
/// the last row; [`insert_char`](Self::insert_char) materializes that line
/// on first use.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rows: Vec<Row>,
    filename: Option<PathBuf>,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// Create an empty, unnamed document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            filename: None,
        }
    }

    /// Load a document from a file, one row per line.
    ///
    /// `\n` and `\r\n` terminators are stripped; line order is preserved.
    /// An empty file yields a document with zero rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn open(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let rows: Vec<Row> = text.lines().map(Row::new).collect();
        debug!(file = %path.display(), rows = rows.len(), "loaded document");
        Ok(Self {
            rows,
            filename: Some(path.to_path_buf()),
        })
    }

    // -- Accessors ----------------------------------------------------------

    /// The row at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the document has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The path this document was loaded from, if any.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// The name to show in the status bar: the path as given on the
    /// command line, or `"[No Name]"` for an unnamed document.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .and_then(Path::to_str)
            .unwrap_or("[No Name]")
    }

    // -- Mutation -----------------------------------------------------------

    /// Insert a row at `index`, shifting later rows down. An index past
    /// one-beyond-the-end is ignored.
    pub fn insert_row(&mut self, index: usize, text: &str) {
        if index > self.rows.len() {
            return;
        }
        self.rows.insert(index, Row::new(text));
    }

    /// Insert a character at `(cy, cx)`.
    ///
    /// When the cursor sits on the virtual line one past the last row
    /// (`cy == row_count`), an empty row is appended first, so typing at
    /// the end of a document grows it. Any other out-of-range `cy` is
    /// ignored; `cx` is clamped by the row.
    pub fn insert_char(&mut self, cy: usize, cx: usize, ch: char) {
        if cy == self.rows.len() {
            self.rows.push(Row::default());
        }
        if let Some(row) = self.rows.get_mut(cy) {
            row.insert_char(cx, ch);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
