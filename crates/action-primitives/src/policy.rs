use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed pauses around input injection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingPolicy {
    /// Wait after every injected command before the caller proceeds.
    pub settle_ms: u64,
    /// Wait between writing the clipboard and sending the paste chord.
    pub paste_lead_ms: u64,
    pub paste_settle_ms: u64,
    /// Delay before the previous clipboard contents are put back.
    pub clipboard_restore_ms: u64,
}

impl TimingPolicy {
    /// All pauses zeroed.
    pub fn immediate() -> Self {
        Self {
            settle_ms: 0,
            paste_lead_ms: 0,
            paste_settle_ms: 0,
            clipboard_restore_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn paste_lead(&self) -> Duration {
        Duration::from_millis(self.paste_lead_ms)
    }

    pub fn paste_settle(&self) -> Duration {
        Duration::from_millis(self.paste_settle_ms)
    }

    pub fn clipboard_restore(&self) -> Duration {
        Duration::from_millis(self.clipboard_restore_ms)
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            settle_ms: 400,
            paste_lead_ms: 100,
            paste_settle_ms: 200,
            clipboard_restore_ms: 1000,
        }
    }
}
