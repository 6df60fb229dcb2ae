//! Widgets: per-node data held in the scene arena.

/// Widget kinds and their capabilities.
pub mod kind;
/// Declarative widget templates.
pub mod template;

use serde::{Deserialize, Serialize};

pub use kind::WidgetKind;
pub use template::{DockSpec, NavSpec, WidgetTemplate};

use crate::{
    core::{
        binding::Binding,
        docking::DockingSet,
        focus::{FocusControls, FocusPropagation},
        id::{ALL_VIEWERS, MAX_VIEWERS, ViewerIndex, WidgetId},
        name::WidgetName,
        navigation::NavigationTargets,
        position::{Position, RenderBounds},
        state::{StatePool, StateStack},
        style::{StyleHandle, StyleSlot},
    },
    geom::{Point, Transform},
};

/// A rotation about an anchor expressed as fractions of the widget's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Angle in degrees.
    pub degrees: f32,
    /// Pivot, where `(0.5, 0.5)` is the center.
    #[serde(with = "PointDef", default = "center")]
    pub anchor: Point,
}

/// Serde mirror of [`Point`].
#[derive(Serialize, Deserialize)]
#[serde(remote = "Point")]
struct PointDef {
    /// X coordinate.
    x: f32,
    /// Y coordinate.
    y: f32,
}

/// Serde default for a rotation anchor.
fn center() -> Point {
    Point::new(0.5, 0.5)
}

/// Auto-sizing settings for text widgets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextFormat {
    /// Size far faces from the text.
    pub auto_size: bool,
    /// Padding on each side, in pixels.
    pub padding: f32,
    /// Needs re-measurement.
    pub stale: bool,
}

/// A node in the scene's widget tree.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Unique name.
    pub(crate) name: WidgetName,
    /// Kind and payload.
    pub(crate) kind: WidgetKind,
    /// Parent, if attached.
    pub(crate) parent: Option<WidgetId>,
    /// Children in declaration order.
    pub(crate) children: Vec<WidgetId>,
    /// Stored faces.
    pub(crate) position: Position,
    /// Resolved pixel faces.
    pub(crate) bounds: RenderBounds,
    /// Docking links.
    pub(crate) docking: DockingSet,
    /// Directional navigation links.
    pub(crate) navigation: NavigationTargets,
    /// Explicit tab index.
    pub(crate) tab_index: Option<i32>,
    /// Tab index assigned by the last navigation rebuild.
    pub(crate) auto_tab_index: i32,
    /// Own visibility.
    pub(crate) visible: bool,
    /// Viewers this widget accepts input from.
    pub(crate) input_mask: u8,
    /// Own mask combined with every ancestor's, as of the last update.
    pub(crate) effective_mask: u8,
    /// Only takes focus through its children.
    pub(crate) suppress_focus: bool,
    /// Refuses to give up focus.
    pub(crate) focus_lock: bool,
    /// Supported states.
    pub(crate) pool: StatePool,
    /// Active states.
    pub(crate) states: StateStack,
    /// Style reference and handle.
    pub(crate) style: StyleSlot,
    /// Data binding.
    pub(crate) binding: Option<Binding>,
    /// Requested rotation.
    pub(crate) rotation: Option<Rotation>,
    /// Rotation transform computed by the last update.
    pub(crate) transform: Option<Transform>,
    /// Text auto-sizing.
    pub(crate) format: TextFormat,
    /// Per-viewer focus records.
    pub(crate) focus: [FocusControls; MAX_VIEWERS],
    /// Per-viewer tab links.
    pub(crate) propagation: [FocusPropagation; MAX_VIEWERS],
}

impl Widget {
    /// A detached widget with defaults for its kind.
    pub(crate) fn new(name: WidgetName, kind: WidgetKind) -> Self {
        let pool = StatePool::new(kind.default_states());
        let suppress_focus = kind.suppresses_focus();
        Self {
            name,
            kind,
            parent: None,
            children: Vec::new(),
            position: Position::default(),
            bounds: RenderBounds::default(),
            docking: DockingSet::default(),
            navigation: NavigationTargets::default(),
            tab_index: None,
            auto_tab_index: 0,
            visible: true,
            input_mask: ALL_VIEWERS,
            effective_mask: ALL_VIEWERS,
            suppress_focus,
            focus_lock: false,
            pool,
            states: StateStack::default(),
            style: StyleSlot::default(),
            binding: None,
            rotation: None,
            transform: None,
            format: TextFormat::default(),
            focus: [FocusControls::default(); MAX_VIEWERS],
            propagation: [FocusPropagation::default(); MAX_VIEWERS],
        }
    }

    /// A widget configured from a template, without children or links.
    pub(crate) fn from_template(name: WidgetName, t: &WidgetTemplate) -> Self {
        let mut w = Self::new(name, t.kind.clone());
        w.position = t.position;
        w.tab_index = t.tab_index;
        w.visible = t.visible;
        w.input_mask = t.input_mask.unwrap_or(ALL_VIEWERS) & ALL_VIEWERS;
        w.effective_mask = w.input_mask;
        if let Some(s) = t.suppress_focus {
            w.suppress_focus = s;
        }
        w.focus_lock = t.focus_lock;
        w.style = StyleSlot::new(t.style.clone());
        w.binding = t.binding.clone();
        w.rotation = t.rotation;
        w.format = TextFormat {
            auto_size: t.auto_size,
            padding: t.text_padding,
            stale: t.auto_size,
        };
        for nav in &t.navigation {
            if nav.null_override {
                w.navigation.set_null_override(nav.face, true);
            }
        }
        w
    }

    /// Unique name.
    pub fn name(&self) -> &WidgetName {
        &self.name
    }

    /// Kind and payload.
    pub fn kind(&self) -> &WidgetKind {
        &self.kind
    }

    /// Parent widget.
    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    /// Children in order.
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// Stored faces.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Cached pixel faces.
    pub fn bounds(&self) -> &RenderBounds {
        &self.bounds
    }

    /// Docking links.
    pub fn docking(&self) -> &DockingSet {
        &self.docking
    }

    /// Navigation links.
    pub fn navigation(&self) -> &NavigationTargets {
        &self.navigation
    }

    /// Effective tab index: the explicit one, or the assigned one.
    pub fn tab_index(&self) -> i32 {
        self.tab_index.unwrap_or(self.auto_tab_index)
    }

    /// Explicit tab index, if any.
    pub fn explicit_tab_index(&self) -> Option<i32> {
        self.tab_index
    }

    /// Own visibility flag.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Own input mask.
    pub fn input_mask(&self) -> u8 {
        self.input_mask
    }

    /// Input mask combined with ancestors, as of the last update.
    pub fn effective_input_mask(&self) -> u8 {
        self.effective_mask
    }

    /// Does the widget only take focus through its children?
    pub fn suppresses_focus(&self) -> bool {
        self.suppress_focus
    }

    /// Does the widget veto losing focus?
    pub fn is_focus_locked(&self) -> bool {
        self.focus_lock
    }

    /// Supported states.
    pub fn state_pool(&self) -> &StatePool {
        &self.pool
    }

    /// Active states.
    pub fn states(&self) -> &StateStack {
        &self.states
    }

    /// Resolved style handle.
    pub fn style_handle(&self) -> Option<StyleHandle> {
        self.style.handle
    }

    /// Style reference.
    pub fn style_reference(&self) -> Option<&str> {
        self.style.reference.as_deref()
    }

    /// Data binding.
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Requested rotation.
    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    /// Rotation transform from the last update.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Focus record for a viewer.
    pub fn focus_controls(&self, viewer: ViewerIndex) -> Option<&FocusControls> {
        self.focus.get(viewer)
    }

    /// Tab links for a viewer.
    pub fn focus_propagation(&self, viewer: ViewerIndex) -> Option<&FocusPropagation> {
        self.propagation.get(viewer)
    }

    /// Is the widget rotated by a non-zero angle?
    pub fn is_rotated(&self) -> bool {
        self.rotation.is_some_and(|r| r.degrees != 0.0)
    }

    /// Is this widget on the viewer's focus chain?
    pub(crate) fn has_focus(&self, viewer: ViewerIndex) -> bool {
        self.focus.get(viewer).is_some_and(|f| f.has_focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateKind;

    #[test]
    fn template_defaults() {
        let t = WidgetTemplate::new("logo", WidgetKind::Image { uses_primitives: true })
            .input_mask(0b0010)
            .rotation(45.0, Point::new(0.5, 0.5))
            .tab_index(3);
        let w = Widget::from_template(t.name.clone(), &t);
        assert!(w.suppresses_focus());
        assert_eq!(w.input_mask(), 0b0010);
        assert_eq!(w.tab_index(), 3);
        assert!(w.is_rotated());
        assert!(!w.state_pool().supports(StateKind::Pressed));
        assert!(w.state_pool().supports(StateKind::Focused));
    }

    #[test]
    fn rotation_json_default_anchor() {
        let r: Rotation = serde_json::from_str(r#"{"degrees": 90}"#).unwrap();
        assert_eq!(r.anchor, Point::new(0.5, 0.5));
    }
}
