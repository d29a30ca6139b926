//! Timed status line messages.

use std::time::{Duration, Instant};

const LONGEST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How a status message is styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Outcome or hint.
    Info,
    /// An action is running.
    Progress,
    /// An action or refresh failed.
    Error,
}

/// A message shown in the status bar until `expires_at`.
///
/// Expiry is checked at render time and never affects the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Message text.
    pub text: String,
    /// Styling.
    pub severity: Severity,
    /// When the message stops being shown.
    pub expires_at: Instant,
}

impl StatusMessage {
    /// Create a message that expires `ttl` after `now`.
    ///
    /// A `ttl` too large to represent is clamped to one day.
    pub fn new(text: impl Into<String>, severity: Severity, now: Instant, ttl: Duration) -> Self {
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(LONGEST_TTL))
            .unwrap_or(now);
        Self {
            text: text.into(),
            severity,
            expires_at,
        }
    }

    /// Whether the message should no longer be shown at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
