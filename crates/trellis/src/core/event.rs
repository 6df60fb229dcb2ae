//! Deferred notifications for the scripting layer.
//!
//! Layout and focus code never calls out while it runs. It appends
//! [`PendingEvent`]s to the scene's [`EventQueue`], and the update pipeline
//! hands them to the [`EventActivator`] once the frame's work is done.

use std::{fmt, mem};

use crate::core::{
    id::{ViewerIndex, WidgetId},
    state::StateKind,
};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTag {
    /// A widget joined a viewer's focus chain.
    FocusReceived,
    /// A widget left a viewer's focus chain.
    FocusLost,
    /// A state became active.
    StateActivated(StateKind),
    /// A state was removed.
    StateDeactivated(StateKind),
    /// A widget's value changed.
    ValueChanged,
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FocusReceived => f.write_str("focus_received"),
            Self::FocusLost => f.write_str("focus_lost"),
            Self::StateActivated(k) => write!(f, "state_activated:{k}"),
            Self::StateDeactivated(k) => write!(f, "state_deactivated:{k}"),
            Self::ValueChanged => f.write_str("value_changed"),
        }
    }
}

/// An event waiting to be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEvent {
    /// Viewer the event belongs to.
    pub viewer: ViewerIndex,
    /// What happened.
    pub tag: EventTag,
    /// The widget the event is about.
    pub activator: WidgetId,
}

/// Receives events when the queue is drained.
pub trait EventActivator {
    /// Fire an event. The return value of the scripting layer is not used.
    fn activate_event(&mut self, viewer: ViewerIndex, tag: EventTag, activator: WidgetId);
}

/// FIFO of pending events.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    /// Events in arrival order.
    events: Vec<PendingEvent>,
}

impl EventQueue {
    /// Queue an event.
    pub fn push(&mut self, viewer: ViewerIndex, tag: EventTag, activator: WidgetId) {
        self.events.push(PendingEvent {
            viewer,
            tag,
            activator,
        });
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEvent> {
        self.events.iter()
    }

    /// Remove and return every pending event.
    pub fn take(&mut self) -> Vec<PendingEvent> {
        mem::take(&mut self.events)
    }

    /// Deliver every pending event to an activator. Returns the count.
    pub fn dispatch(&mut self, activator: &mut dyn EventActivator) -> usize {
        let events = self.take();
        for e in &events {
            activator.activate_event(e.viewer, e.tag, e.activator);
        }
        events.len()
    }

    /// Drop pending events about a widget.
    pub fn forget(&mut self, widget: WidgetId) {
        self.events.retain(|e| e.activator != widget);
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    #[derive(Default)]
    struct Collect(Vec<(ViewerIndex, EventTag, WidgetId)>);

    impl EventActivator for Collect {
        fn activate_event(&mut self, viewer: ViewerIndex, tag: EventTag, activator: WidgetId) {
            self.0.push((viewer, tag, activator));
        }
    }

    #[test]
    fn dispatch_in_order() {
        let mut sm: SlotMap<WidgetId, ()> = SlotMap::with_key();
        let a = sm.insert(());
        let b = sm.insert(());
        let mut q = EventQueue::default();
        q.push(0, EventTag::FocusLost, a);
        q.push(1, EventTag::FocusReceived, b);
        q.push(0, EventTag::StateActivated(StateKind::Focused), a);
        q.forget(a);
        assert_eq!(q.len(), 1);
        let mut c = Collect::default();
        assert_eq!(q.dispatch(&mut c), 1);
        assert!(q.is_empty());
        assert_eq!(c.0, vec![(1, EventTag::FocusReceived, b)]);
    }

    #[test]
    fn tag_display() {
        assert_eq!(
            EventTag::StateDeactivated(StateKind::Pressed).to_string(),
            "state_deactivated:pressed"
        );
    }
}
