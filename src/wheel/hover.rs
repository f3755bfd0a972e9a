//! Hover preview debouncing
//!
//! A single pending slot: every new hover target replaces whatever was waiting,
//! and a settled preview equal to the last reported one is swallowed.

use chrono::{DateTime, Duration, Utc};

use crate::types::Sector;

/// Default hover settle time in milliseconds
pub const DEFAULT_HOVER_DEBOUNCE_MS: i64 = 60;

/// Longest accepted hover settle time in milliseconds
pub const MAX_HOVER_DEBOUNCE_MS: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingHover {
    sector: Option<Sector>,
    due: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HoverDebouncer {
    delay: Duration,
    pending: Option<PendingHover>,
    reported: Option<Sector>,
}

impl Default for HoverDebouncer {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_HOVER_DEBOUNCE_MS))
    }
}

impl HoverDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            reported: None,
        }
    }

    /// Replace the pending slot with `sector`, due `delay` after `now`
    pub fn schedule(&mut self, sector: Option<Sector>, now: DateTime<Utc>) {
        self.pending = Some(PendingHover {
            sector,
            due: now
                .checked_add_signed(self.delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    /// Fire the pending slot if it is due.
    ///
    /// Returns `Some(preview)` only when the reported preview changed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Option<Sector>> {
        let pending = self.pending?;
        if pending.due > now {
            return None;
        }
        self.pending = None;
        if pending.sector == self.reported {
            return None;
        }
        self.reported = pending.sector;
        Some(pending.sector)
    }

    /// When the pending slot fires, if any
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        self.pending.map(|p| p.due)
    }

    /// Last preview handed to subscribers
    pub fn reported(&self) -> Option<Sector> {
        self.reported
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Drop the pending slot and forget the reported preview.
    ///
    /// Returns `Some(None)` when a reported preview was withdrawn.
    pub fn clear(&mut self) -> Option<Option<Sector>> {
        self.pending = None;
        self.reported.take().map(|_| None)
    }
}
