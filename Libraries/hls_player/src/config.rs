use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(330);
pub const DEFAULT_DONE_HISTORY: usize = 10;
pub const DEFAULT_VARIANT_INDEX: usize = 2;

/// Tuning knobs of a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Wait between media playlist refreshes once the pending queue is drained.
    pub poll_interval: Duration,
    /// How many completed segments are remembered for deduplication. Older ones are forgotten.
    pub done_history: usize,
    /// Variant picked by the default [`crate::FixedIndexSelector`].
    pub variant_index: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            done_history: DEFAULT_DONE_HISTORY,
            variant_index: DEFAULT_VARIANT_INDEX,
        }
    }
}

impl PlayerConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_done_history(mut self, done_history: usize) -> Self {
        self.done_history = done_history.max(1);
        self
    }

    pub fn with_variant_index(mut self, variant_index: usize) -> Self {
        self.variant_index = variant_index;
        self
    }
}
