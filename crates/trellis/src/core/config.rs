use serde::{Deserialize, Serialize};

use crate::{
    core::id::{MAX_VIEWERS, ViewerIndex, check_viewer, viewer_bit},
    error::Result,
};

/// Scene-wide tuning knobs. Every field has a default, so a JSON document only
/// needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Relative tolerance for position comparisons.
    pub epsilon: f32,
    /// Wrap tab navigation from the last control back to the first.
    pub wrap_tab_navigation: bool,
    /// Focus the first control for each active viewer after the first update.
    pub initial_focus: bool,
    /// Bit mask of the viewers currently playing.
    pub active_viewers: u8,
    /// Glyph advance used to auto-size text widgets, in pixels.
    pub glyph_width: f32,
    /// Line height used to auto-size text widgets, in pixels.
    pub line_height: f32,
    /// Maximum number of retained diagnostics. Older entries are dropped.
    pub diagnostic_limit: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-4,
            wrap_tab_navigation: true,
            initial_focus: true,
            active_viewers: 0b0001,
            glyph_width: 8.0,
            line_height: 16.0,
            diagnostic_limit: 64,
        }
    }
}

impl SceneConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Is the viewer in the active set?
    pub fn is_viewer_active(&self, viewer: ViewerIndex) -> bool {
        check_viewer(viewer).is_ok() && self.active_viewers & viewer_bit(viewer) != 0
    }

    /// Iterate over the active viewer indices in ascending order.
    pub fn active_viewer_indices(&self) -> impl Iterator<Item = ViewerIndex> + '_ {
        (0..MAX_VIEWERS).filter(|v| self.is_viewer_active(*v))
    }
}
