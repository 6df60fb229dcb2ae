use slotmap::new_key_type;

use crate::error::{Error, Result};

new_key_type! {
    /// Versioned handle for a widget stored in the scene arena. Handles to
    /// destroyed widgets never alias a live widget.
    pub struct WidgetId;
}

/// Number of independent viewer slots (local split-screen players).
pub const MAX_VIEWERS: usize = 4;

/// Index of a viewer slot, `0..MAX_VIEWERS`.
pub type ViewerIndex = usize;

/// An input mask with every viewer enabled.
pub const ALL_VIEWERS: u8 = (1 << MAX_VIEWERS) - 1;

/// Validate a viewer index.
pub fn check_viewer(viewer: ViewerIndex) -> Result<()> {
    if viewer < MAX_VIEWERS {
        Ok(())
    } else {
        Err(Error::InvalidViewer(viewer))
    }
}

/// The mask bit for a viewer.
pub fn viewer_bit(viewer: ViewerIndex) -> u8 {
    1u8.checked_shl(viewer as u32).unwrap_or(0)
}
