//! Classifies activations as first or subsequent against the timing window.

use crate::types::Millis;

/// Time of the most recent activation.
///
/// Starts at 0, so an activation in the first `window` milliseconds after
/// the clock's origin counts as subsequent. It is resolved against the empty
/// candidate store, which never matches, so no route is announced for it; the
/// [`Activation`](crate::Activation) is `Resolved` rather than `First`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PressTimer {
    last: Millis,
}

impl PressTimer {
    /// A timer whose last activation was at 0.
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// True if `now` is strictly inside `window` milliseconds of the last activation.
    pub fn is_subsequent(&self, now: Millis, window: Millis) -> bool {
        now < self.last.saturating_add(window)
    }

    /// Make `now` the time of the last activation.
    pub fn record_now(&mut self, now: Millis) {
        self.last = now;
    }

    /// Time of the last activation.
    pub const fn last(&self) -> Millis {
        self.last
    }
}
