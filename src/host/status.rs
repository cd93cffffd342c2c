//! Status indicator text.

use tracing::info;

pub fn status_text(enabled: bool) -> &'static str {
    if enabled {
        "VibeCommit: ON"
    } else {
        "VibeCommit: OFF"
    }
}

/// Message shown after the toggle flips.
pub fn toggle_announcement(enabled: bool) -> &'static str {
    if enabled {
        "VibeCommit Enabled"
    } else {
        "VibeCommit Disabled"
    }
}

/// Mirrors the toggle for display.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    enabled: bool,
}

impl StatusIndicator {
    pub fn new(enabled: bool) -> Self {
        let mut indicator = Self::default();
        indicator.update(enabled);
        indicator
    }

    pub fn update(&mut self, enabled: bool) {
        self.enabled = enabled;
        info!("status bar updated: {}", if enabled { "ON" } else { "OFF" });
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn text(&self) -> &'static str {
        status_text(self.enabled)
    }
}
