//! Trellis: a retained-mode widget layout and focus engine.
//!
//! Trellis keeps a tree of widgets in an arena owned by a [`Scene`]. Each
//! widget has four faces whose positions are stored in one of several
//! coordinate bases, or docked to a face of another widget. The scene resolves
//! faces lazily, invalidates exactly what a change affects, and tracks an
//! independent focus chain for each of up to four viewers.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Scene`] - The widget arena and tree operations
//! - [`PositionResolver`] - Face position queries and updates
//! - [`FocusManager`] - Per-viewer focus and navigation
//! - [`WidgetTemplate`] - Declarative widget descriptions
//!
//! A frame is driven by [`Scene::update`], which runs the pending pipeline
//! stages in order and then dispatches queued events.
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Face, etc.)
//! - [`widget`] - Widget data, kinds and templates

#![warn(missing_docs)]

// Internal core module - re-export specific items below
mod core;

/// Geometry primitives.
pub use trellis_geom as geom;

pub mod widget;

#[cfg(any(test, feature = "testing"))]
pub use core::testing;
// Re-export core application types
pub use core::{FocusManager, PositionResolver, Scene, ViewerIndex, WidgetId};
pub use core::{
    binding, config, coords, docking, dump, error, event, focus, id, name, navigation, position,
    resolve, scene, state, style, update, viewport,
};

pub use config::SceneConfig;
pub use error::{Error, Result};
pub use update::{Stage, UpdateReport};
pub use widget::{Widget, WidgetKind, WidgetTemplate};
