use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::id::{MAX_VIEWERS, ViewerIndex};

/// A widget state. Several states can be active at once for each viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// Accepts input.
    Enabled,
    /// Ignores input and cannot hold focus.
    Disabled,
    /// On the viewer's focus chain.
    Focused,
    /// Hovered or otherwise highlighted.
    Active,
    /// Held down.
    Pressed,
}

impl StateKind {
    /// Every state kind.
    pub const ALL: [Self; 5] = [
        Self::Enabled,
        Self::Disabled,
        Self::Focused,
        Self::Active,
        Self::Pressed,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Focused => "focused",
            Self::Active => "active",
            Self::Pressed => "pressed",
        }
    }

    /// States removed when this one is activated.
    pub fn displaces(self) -> &'static [Self] {
        match self {
            Self::Enabled => &[Self::Disabled],
            Self::Disabled => &[Self::Enabled, Self::Focused, Self::Active, Self::Pressed],
            Self::Focused | Self::Active | Self::Pressed => &[],
        }
    }

    /// States that must not be active for this one to activate.
    pub fn blocked_by(self) -> Option<Self> {
        match self {
            Self::Focused | Self::Active | Self::Pressed => Some(Self::Disabled),
            Self::Enabled | Self::Disabled => None,
        }
    }

    /// Bit for pool membership.
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of state kinds a widget supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatePool {
    /// One bit per [`StateKind`].
    bits: u8,
}

impl StatePool {
    /// A pool holding the given kinds.
    pub fn new(kinds: &[StateKind]) -> Self {
        Self {
            bits: kinds.iter().fold(0, |b, k| b | k.bit()),
        }
    }

    /// Does the pool hold this kind?
    pub fn supports(&self, kind: StateKind) -> bool {
        self.bits & kind.bit() != 0
    }

    /// Add a kind to the pool.
    pub fn insert(&mut self, kind: StateKind) {
        self.bits |= kind.bit();
    }

    /// The supported kinds in declaration order.
    pub fn kinds(&self) -> Vec<StateKind> {
        StateKind::ALL
            .into_iter()
            .filter(|k| self.supports(*k))
            .collect()
    }
}

/// The result of a state activation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateChange {
    /// True if the requested state became active.
    pub activated: bool,
    /// States removed as a consequence.
    pub removed: Vec<StateKind>,
}

/// Per-viewer stacks of active states. The top of a stack is the viewer's
/// current state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStack {
    /// Active states per viewer, oldest first.
    stacks: [Vec<StateKind>; MAX_VIEWERS],
}

impl StateStack {
    /// Is the state active for the viewer?
    pub fn is_active(&self, viewer: ViewerIndex, kind: StateKind) -> bool {
        self.active(viewer).contains(&kind)
    }

    /// The most recently activated state for the viewer.
    pub fn current(&self, viewer: ViewerIndex) -> Option<StateKind> {
        self.active(viewer).last().copied()
    }

    /// Active states for the viewer, oldest first.
    pub fn active(&self, viewer: ViewerIndex) -> &[StateKind] {
        self.stacks.get(viewer).map_or(&[], Vec::as_slice)
    }

    /// Activate a state, removing any states it displaces. Activation is
    /// refused if a blocking state is active.
    pub fn activate(&mut self, viewer: ViewerIndex, kind: StateKind) -> StateChange {
        let mut change = StateChange::default();
        let Some(stack) = self.stacks.get_mut(viewer) else {
            return change;
        };
        if stack.contains(&kind) {
            return change;
        }
        if kind.blocked_by().is_some_and(|b| stack.contains(&b)) {
            return change;
        }
        let displaced = kind.displaces();
        stack.retain(|k| {
            let keep = !displaced.contains(k);
            if !keep {
                change.removed.push(*k);
            }
            keep
        });
        stack.push(kind);
        change.activated = true;
        change
    }

    /// Deactivate a state. Returns true if it was active.
    pub fn deactivate(&mut self, viewer: ViewerIndex, kind: StateKind) -> bool {
        let Some(stack) = self.stacks.get_mut(viewer) else {
            return false;
        };
        let before = stack.len();
        stack.retain(|k| *k != kind);
        stack.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_disabled_exclusive() {
        let mut s = StateStack::default();
        assert!(s.activate(0, StateKind::Enabled).activated);
        assert!(s.activate(0, StateKind::Focused).activated);
        assert!(s.activate(0, StateKind::Pressed).activated);
        assert_eq!(s.current(0), Some(StateKind::Pressed));

        let c = s.activate(0, StateKind::Disabled);
        assert!(c.activated);
        assert_eq!(
            c.removed,
            vec![StateKind::Enabled, StateKind::Focused, StateKind::Pressed]
        );
        assert_eq!(s.active(0), &[StateKind::Disabled]);

        assert!(!s.activate(0, StateKind::Focused).activated);
        let c = s.activate(0, StateKind::Enabled);
        assert_eq!(c.removed, vec![StateKind::Disabled]);
        assert!(s.activate(0, StateKind::Focused).activated);
    }

    #[test]
    fn viewers_are_independent() {
        let mut s = StateStack::default();
        s.activate(1, StateKind::Active);
        assert!(s.is_active(1, StateKind::Active));
        assert!(!s.is_active(0, StateKind::Active));
        assert!(!s.activate(MAX_VIEWERS, StateKind::Active).activated);
        assert!(s.deactivate(1, StateKind::Active));
        assert!(!s.deactivate(1, StateKind::Active));
    }

    #[test]
    fn pool() {
        let p = StatePool::new(&[StateKind::Enabled, StateKind::Focused]);
        assert!(p.supports(StateKind::Focused));
        assert!(!p.supports(StateKind::Pressed));
        assert_eq!(p.kinds(), vec![StateKind::Enabled, StateKind::Focused]);
    }
}
