// Core modules - public
/// Data bindings to external stores.
pub mod binding;
/// Scene configuration.
pub mod config;
/// Coordinate bases and frame conversions.
pub mod coords;
/// Docking links and the docking solver.
pub mod docking;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
/// Deferred event queue.
pub mod event;
/// Multi-viewer focus management.
pub mod focus;
/// Widget and viewer identifiers.
pub mod id;
/// Widget names.
pub mod name;
/// Tab order and directional navigation.
pub mod navigation;
/// Stored and resolved face positions.
pub mod position;
/// Position resolution and invalidation.
pub mod resolve;
/// The scene: widget arena and tree operations.
pub mod scene;
/// Widget states.
pub mod state;
/// Style resolution.
pub mod style;
/// Testing utilities.
#[cfg(any(test, feature = "testing"))]
pub mod testing;
/// The update pipeline.
pub mod update;
/// Viewport metrics.
pub mod viewport;

// Public exports from internal modules
pub use focus::FocusManager;
pub use id::{ViewerIndex, WidgetId};
pub use resolve::PositionResolver;
pub use scene::Scene;
