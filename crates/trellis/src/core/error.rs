use std::result::Result as StdResult;

use thiserror::Error;

use crate::{core::id::WidgetId, geom};

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    /// A widget handle does not refer to a live widget.
    #[error("widget not found: {0:?}")]
    WidgetNotFound(WidgetId),

    /// The widget already has a parent.
    #[error("widget {0:?} is already attached to a parent")]
    AlreadyAttached(WidgetId),

    /// Attaching would make a widget its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Requested parent.
        parent: WidgetId,
        /// Requested child.
        child: WidgetId,
    },

    /// A face was docked to its own widget.
    #[error("widget {widget:?} cannot dock its {face} face to itself")]
    SelfDock {
        /// Widget being docked.
        widget: WidgetId,
        /// Face being docked.
        face: geom::Face,
    },

    /// A docking relationship would depend on itself.
    #[error("recursive docking relationship at {widget:?}.{face}")]
    DockingCycle {
        /// Widget owning the face that closes the cycle.
        widget: WidgetId,
        /// Face that closes the cycle.
        face: geom::Face,
    },

    /// A navigation link would point a widget at itself.
    #[error("widget {widget:?} cannot navigate to itself on its {face} face")]
    RecursiveNavigation {
        /// Widget being linked.
        widget: WidgetId,
        /// Face being linked.
        face: geom::Face,
    },

    /// Viewer index out of range.
    #[error("invalid viewer index {0}")]
    InvalidViewer(usize),

    /// A widget name failed validation.
    #[error("invalid widget name: {0}")]
    InvalidName(String),

    /// The operation is not permitted in the current state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Configuration or template parsing failed.
    #[error("config: {0}")]
    Config(String),

    /// Geometry failure.
    #[error("geometry: {0}")]
    Geometry(String),

    /// Internal error.
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors describing an invalid docking or navigation graph.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SelfDock { .. }
                | Self::DockingCycle { .. }
                | Self::RecursiveNavigation { .. }
                | Self::WouldCreateCycle { .. }
        )
    }
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        Self::Geometry(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
