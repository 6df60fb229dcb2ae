use crate::core::{
    id::{ViewerIndex, WidgetId},
    state::StateKind,
};

/// Opaque handle to a concrete style owned by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleHandle(pub u64);

/// A request to resolve a style reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleQuery<'a> {
    /// Widget being styled.
    pub widget: WidgetId,
    /// Kind name of the widget.
    pub kind: &'static str,
    /// Style reference string from the widget.
    pub reference: &'a str,
    /// Current state used for the lookup.
    pub state: Option<StateKind>,
    /// Viewer whose state was used.
    pub viewer: ViewerIndex,
}

/// Maps style references to concrete styles.
pub trait StyleResolver {
    /// Resolve a reference. `None` means the reference is unknown.
    fn resolve_style(&self, query: &StyleQuery<'_>) -> Option<StyleHandle>;
}

/// A widget's style reference and its last resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleSlot {
    /// Reference string, if the widget is styled.
    pub reference: Option<String>,
    /// Last resolved handle.
    pub handle: Option<StyleHandle>,
    /// Needs re-resolution.
    pub stale: bool,
}

impl StyleSlot {
    /// A slot for a reference, pending resolution.
    pub fn new(reference: Option<String>) -> Self {
        let stale = reference.is_some();
        Self {
            reference,
            handle: None,
            stale,
        }
    }

    /// Mark for re-resolution if styled. Returns true if the slot changed.
    pub fn mark_stale(&mut self) -> bool {
        if self.reference.is_some() && !self.stale {
            self.stale = true;
            true
        } else {
            false
        }
    }
}
