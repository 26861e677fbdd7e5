//! # ted-editor — Editor core for ted
//!
//! This crate contains the text-side building blocks of the editor:
//!
//! - **[`row`]** — `Row`: source text plus its derived render string (tab expansion)
//! - **[`document`]** — `Document`: an ordered row store with file loading and insertion
//! - **[`cursor`]** — `Cursor`: (x, y) in document coordinates with wrap/clamp movement
//! - **[`view`]** — `View`: viewport offsets, scroll recomputation, frame drawing
//! - **[`message`]** — `StatusMessage`: transient bottom-line text with timed visibility
//!
//! Nothing here talks to the terminal directly. Drawing goes through
//! ted-term's `OutputBuffer` and ANSI emitters, so every frame the view
//! produces can be inspected as plain bytes in tests.

pub mod cursor;
pub mod document;
pub mod message;
pub mod row;
pub mod view;
