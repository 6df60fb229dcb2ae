//! Collaborators that record what the scene asks of them.
//!
//! Each one is a cheap handle over shared state, so a test can keep a clone
//! after boxing the original into the scene.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::core::{
    binding::{Binding, DataSource, DataValue},
    event::{EventActivator, EventTag, PendingEvent},
    id::{ViewerIndex, WidgetId},
    state::StateKind,
    style::{StyleHandle, StyleQuery, StyleResolver},
};

/// An event activator that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingActivator {
    /// Events in delivery order.
    events: Rc<RefCell<Vec<PendingEvent>>>,
}

impl RecordingActivator {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event delivered so far.
    pub fn events(&self) -> Vec<PendingEvent> {
        self.events.borrow().clone()
    }

    /// Tags delivered for one widget, in order.
    pub fn tags_for(&self, widget: WidgetId) -> Vec<EventTag> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.activator == widget)
            .map(|e| e.tag)
            .collect()
    }

    /// Was this event delivered for this widget on any viewer?
    pub fn contains(&self, tag: EventTag, widget: WidgetId) -> bool {
        self.events
            .borrow()
            .iter()
            .any(|e| e.tag == tag && e.activator == widget)
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventActivator for RecordingActivator {
    fn activate_event(&mut self, viewer: ViewerIndex, tag: EventTag, activator: WidgetId) {
        self.events.borrow_mut().push(PendingEvent {
            viewer,
            tag,
            activator,
        });
    }
}

/// A style resolver backed by a map of references. A state-specific entry
/// wins over the plain one.
#[derive(Debug, Clone, Default)]
pub struct MapStyleResolver {
    /// Plain references.
    plain: HashMap<String, StyleHandle>,
    /// References qualified by state.
    by_state: HashMap<(String, StateKind), StyleHandle>,
    /// Number of lookups served.
    lookups: Rc<RefCell<usize>>,
}

impl MapStyleResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a reference to a handle for every state.
    pub fn with(mut self, reference: &str, handle: u64) -> Self {
        self.plain.insert(reference.to_string(), StyleHandle(handle));
        self
    }

    /// Map a reference to a handle while a state is current.
    pub fn with_state(mut self, reference: &str, state: StateKind, handle: u64) -> Self {
        self.by_state
            .insert((reference.to_string(), state), StyleHandle(handle));
        self
    }

    /// Lookups served so far, shared between clones.
    pub fn lookups(&self) -> usize {
        *self.lookups.borrow()
    }
}

impl StyleResolver for MapStyleResolver {
    fn resolve_style(&self, query: &StyleQuery<'_>) -> Option<StyleHandle> {
        *self.lookups.borrow_mut() += 1;
        query
            .state
            .and_then(|s| self.by_state.get(&(query.reference.to_string(), s)))
            .or_else(|| self.plain.get(query.reference))
            .copied()
    }
}

/// A data store held in a shared map.
#[derive(Debug, Clone, Default)]
pub struct MapDataSource {
    /// Stored values.
    values: Rc<RefCell<HashMap<Binding, DataValue>>>,
    /// Bindings that refuse writes.
    read_only: Rc<RefCell<Vec<Binding>>>,
}

impl MapDataSource {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value directly, bypassing the scene.
    pub fn insert(&self, binding: Binding, value: DataValue) {
        self.values.borrow_mut().insert(binding, value);
    }

    /// Read a value directly.
    pub fn get(&self, binding: &Binding) -> Option<DataValue> {
        self.values.borrow().get(binding).cloned()
    }

    /// Refuse writes to a binding.
    pub fn lock(&self, binding: Binding) {
        self.read_only.borrow_mut().push(binding);
    }
}

impl DataSource for MapDataSource {
    fn bound_value(&self, binding: &Binding) -> Option<DataValue> {
        self.get(binding)
    }

    fn set_bound_value(&mut self, binding: &Binding, value: DataValue) -> bool {
        if self.read_only.borrow().contains(binding) {
            return false;
        }
        self.insert(binding.clone(), value);
        true
    }
}
