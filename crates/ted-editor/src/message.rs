//! StatusMessage — transient bottom-line text.
//!
//! The editor shows one-off notices (the startup help line) on the last
//! screen row. A message is stamped when set and shown for five seconds;
//! expiry is passive — nothing clears the text, the draw path just stops
//! including it once [`visible`](StatusMessage::visible) turns false.

use std::time::{Duration, Instant};

/// How long a status message stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// A status message plus the instant it was set.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    stamp: Instant,
}

impl StatusMessage {
    /// Create an empty message. Never visible until [`set`](Self::set)
    /// is called.
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            stamp: Instant::now(),
        }
    }

    /// The message text, regardless of visibility.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the message and restart its visibility window.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.stamp = Instant::now();
    }

    /// Whether the message should be drawn at `now`: non-empty and
    /// younger than [`MESSAGE_TIMEOUT`].
    #[must_use]
    pub fn visible(&self, now: Instant) -> bool {
        !self.text.is_empty() && now.duration_since(self.stamp) < MESSAGE_TIMEOUT
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
