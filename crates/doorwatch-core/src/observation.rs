//! Change detection: suppress notifications for an unchanged set of visitors.

use crate::types::Verdict;

/// The verdict sequence that last triggered a notification.
///
/// Starts empty. Only [`ObservationState::record`] mutates it, and callers
/// invoke that after the notification for `current` has been composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationState {
    last_notified: Vec<Verdict>,
}

impl ObservationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_notified(&self) -> &[Verdict] {
        &self.last_notified
    }

    /// Whether `current` warrants a notification.
    ///
    /// Comparison is on the full ordered sequence, so `[A, B]` and `[B, A]`
    /// differ. An empty frame never notifies and leaves the state alone, so the
    /// same visitors reappearing after a gap are still suppressed.
    pub fn should_notify(&self, current: &[Verdict]) -> bool {
        !current.is_empty() && current != self.last_notified.as_slice()
    }

    /// Remember `current` as the last notified sequence. Empty sequences are
    /// ignored.
    pub fn record(&mut self, current: &[Verdict]) {
        if current.is_empty() {
            return;
        }
        self.last_notified = current.to_vec();
    }
}
