//! Multi-viewer focus.
//!
//! Every viewer has its own focus chain: a path from the scene root down to
//! the innermost focused widget, recorded in each widget's [`FocusControls`].
//! Focus requests travel down the tree (a parent delegating to a child) or up
//! it (a child asking its parent to point at it), and the direction is given
//! by the `sender` argument: the parent or `None` for downward requests, a
//! child for upward ones.

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::{
    core::{
        event::EventTag,
        id::{ViewerIndex, WidgetId, check_viewer},
        navigation,
        scene::Scene,
        state::StateKind,
        update::Stage,
    },
    error::{Error, Result},
    geom::Face,
};

/// One viewer's focus record on a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusControls {
    /// The child currently on the focus chain.
    pub focused: Option<WidgetId>,
    /// The child that most recently held focus.
    pub last_focused: Option<WidgetId>,
    /// Is this widget on the focus chain?
    pub has_focus: bool,
}

impl FocusControls {
    /// Drop references to removed widgets.
    pub(crate) fn sever(&mut self, doomed: &HashSet<WidgetId>) {
        if self.focused.is_some_and(|f| doomed.contains(&f)) {
            self.focused = None;
        }
        if self.last_focused.is_some_and(|f| doomed.contains(&f)) {
            self.last_focused = None;
        }
    }
}

/// One viewer's tab-order links on a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusPropagation {
    /// First child in tab order.
    pub first: Option<WidgetId>,
    /// Last child in tab order.
    pub last: Option<WidgetId>,
    /// Next sibling in tab order.
    pub next: Option<WidgetId>,
    /// Previous sibling in tab order.
    pub prev: Option<WidgetId>,
    /// A focus request is being handled here.
    pub pending: bool,
}

impl FocusPropagation {
    /// Drop references to removed widgets.
    pub(crate) fn sever(&mut self, doomed: &HashSet<WidgetId>) {
        for link in [&mut self.first, &mut self.last, &mut self.next, &mut self.prev] {
            if link.is_some_and(|l| doomed.contains(&l)) {
                *link = None;
            }
        }
    }
}

/// Focus operations on a scene.
pub trait FocusManager {
    /// Request focus for `widget`. A `sender` of `None` or the widget's parent
    /// delegates downward to the preferred descendant; a child as sender
    /// makes the widget point at that child. Returns true if the chain now
    /// passes through the widget.
    fn set_focus(
        &mut self,
        widget: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool>;

    /// Remove `widget` from the viewer's focus chain. A `sender` of the
    /// parent clears the widget and its focused descendants; a child as
    /// sender continues upward; `None` does both. Returns false if a focus
    /// lock vetoed the change.
    fn kill_focus(
        &mut self,
        widget: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool>;

    /// Can the widget currently join the viewer's focus chain?
    fn can_accept_focus(&self, widget: WidgetId, viewer: ViewerIndex) -> bool;

    /// Is the widget on the viewer's focus chain?
    fn is_focused(&self, widget: WidgetId, viewer: ViewerIndex) -> bool;

    /// The innermost widget on the viewer's focus chain.
    fn focused_control(&self, viewer: ViewerIndex) -> Option<WidgetId>;

    /// The viewer's focus chain, root first.
    fn focus_chain(&self, viewer: ViewerIndex) -> Vec<WidgetId>;

    /// Focus the first eligible control under `container` in tab order.
    fn focus_first_control(&mut self, container: WidgetId, viewer: ViewerIndex) -> Result<bool>;

    /// Focus the last eligible control under `container` in tab order.
    fn focus_last_control(&mut self, container: WidgetId, viewer: ViewerIndex) -> Result<bool>;

    /// Move the viewer's focus to the next control in tab order.
    fn next_control(&mut self, viewer: ViewerIndex) -> Result<bool>;

    /// Move the viewer's focus to the previous control in tab order.
    fn prev_control(&mut self, viewer: ViewerIndex) -> Result<bool>;

    /// Focus the next control in `container` after `sender`, or from the
    /// start when `sender` is `None`. Exhausted containers hand the request to
    /// their parent.
    fn next_control_from(
        &mut self,
        container: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool>;

    /// Mirror of [`FocusManager::next_control_from`].
    fn prev_control_from(
        &mut self,
        container: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool>;

    /// Move the viewer's focus in a direction.
    fn navigate_focus(&mut self, direction: Face, viewer: ViewerIndex) -> Result<bool>;

    /// Move focus in a direction starting from `sender`.
    fn navigate_focus_from(
        &mut self,
        sender: WidgetId,
        direction: Face,
        viewer: ViewerIndex,
    ) -> Result<bool>;

    /// Recompute tab indices, tab links and automatic directional links.
    fn rebuild_navigation_links(&mut self);

    /// Force a directional link, or clear it with `None`.
    fn set_forced_navigation_target(
        &mut self,
        widget: WidgetId,
        face: Face,
        target: Option<WidgetId>,
    ) -> Result<()>;

    /// Swallow navigation in a direction when no target is found.
    fn set_null_override(&mut self, widget: WidgetId, face: Face, enabled: bool) -> Result<()>;
}

impl FocusManager for Scene {
    fn set_focus(
        &mut self,
        widget: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool> {
        check_viewer(viewer)?;
        let parent = self.widget(widget)?.parent;
        match sender {
            None => Ok(focus_down(self, widget, viewer)),
            Some(s) if Some(s) == parent => Ok(focus_down(self, widget, viewer)),
            Some(s) if self.widget(s)?.parent == Some(widget) => {
                Ok(focus_up(self, widget, s, viewer))
            }
            Some(s) => Err(Error::InvalidOperation(format!(
                "focus sender {s:?} is neither parent nor child of {widget:?}"
            ))),
        }
    }

    fn kill_focus(
        &mut self,
        widget: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool> {
        check_viewer(viewer)?;
        let parent = self.widget(widget)?.parent;
        match sender {
            None => {
                if !self.widgets[widget].has_focus(viewer) {
                    return Ok(true);
                }
                if !kill_down(self, widget, viewer) {
                    return Ok(false);
                }
                Ok(parent.is_none_or(|p| kill_up(self, p, widget, viewer)))
            }
            Some(s) if Some(s) == parent => Ok(kill_down(self, widget, viewer)),
            Some(s) if self.widget(s)?.parent == Some(widget) => {
                Ok(kill_up(self, widget, s, viewer))
            }
            Some(s) => Err(Error::InvalidOperation(format!(
                "focus sender {s:?} is neither parent nor child of {widget:?}"
            ))),
        }
    }

    fn can_accept_focus(&self, widget: WidgetId, viewer: ViewerIndex) -> bool {
        if check_viewer(viewer).is_err() {
            return false;
        }
        let Some(w) = self.widgets.get(widget) else {
            return false;
        };
        if widget == self.root {
            return w.visible;
        }
        if !self.is_displayed(widget)
            || w.states.is_active(viewer, StateKind::Disabled)
            || !self.accepts_input(widget, viewer)
        {
            return false;
        }
        !w.suppress_focus || w.children.iter().any(|c| self.can_accept_focus(*c, viewer))
    }

    fn is_focused(&self, widget: WidgetId, viewer: ViewerIndex) -> bool {
        self.widgets.get(widget).is_some_and(|w| w.has_focus(viewer))
    }

    fn focused_control(&self, viewer: ViewerIndex) -> Option<WidgetId> {
        self.focus_chain(viewer).last().copied()
    }

    fn focus_chain(&self, viewer: ViewerIndex) -> Vec<WidgetId> {
        let mut chain = Vec::new();
        if !self.is_focused(self.root, viewer) {
            return chain;
        }
        let mut cur = Some(self.root);
        while let Some(id) = cur {
            if chain.len() > self.widgets.len() || !self.is_focused(id, viewer) {
                break;
            }
            chain.push(id);
            cur = self.widgets[id].focus[viewer].focused;
        }
        chain
    }

    fn focus_first_control(&mut self, container: WidgetId, viewer: ViewerIndex) -> Result<bool> {
        check_viewer(viewer)?;
        self.widget(container)?;
        Ok(enter_container(self, container, viewer, true))
    }

    fn focus_last_control(&mut self, container: WidgetId, viewer: ViewerIndex) -> Result<bool> {
        check_viewer(viewer)?;
        self.widget(container)?;
        Ok(enter_container(self, container, viewer, false))
    }

    fn next_control(&mut self, viewer: ViewerIndex) -> Result<bool> {
        step_control(self, viewer, true)
    }

    fn prev_control(&mut self, viewer: ViewerIndex) -> Result<bool> {
        step_control(self, viewer, false)
    }

    fn next_control_from(
        &mut self,
        container: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool> {
        step_from(self, container, sender, viewer, true)
    }

    fn prev_control_from(
        &mut self,
        container: WidgetId,
        sender: Option<WidgetId>,
        viewer: ViewerIndex,
    ) -> Result<bool> {
        step_from(self, container, sender, viewer, false)
    }

    fn navigate_focus(&mut self, direction: Face, viewer: ViewerIndex) -> Result<bool> {
        check_viewer(viewer)?;
        match self.focused_control(viewer) {
            Some(cur) if cur != self.root => self.navigate_focus_from(cur, direction, viewer),
            _ => Ok(false),
        }
    }

    fn navigate_focus_from(
        &mut self,
        sender: WidgetId,
        direction: Face,
        viewer: ViewerIndex,
    ) -> Result<bool> {
        check_viewer(viewer)?;
        let w = self.widget(sender)?;
        let (null_override, parent) = (w.navigation.is_null_override(direction), w.parent);
        if let Some(target) = navigation::walk_direction(self, sender, direction, viewer) {
            debug!(viewer, %direction, target = %self.widgets[target].name, "navigating");
            return Ok(focus_down(self, target, viewer));
        }
        if null_override {
            trace!(viewer, %direction, "navigation swallowed");
            return Ok(false);
        }
        match parent {
            Some(p) if p != self.root => self.navigate_focus_from(p, direction, viewer),
            _ => Ok(false),
        }
    }

    fn rebuild_navigation_links(&mut self) {
        navigation::rebuild_links(self);
    }

    fn set_forced_navigation_target(
        &mut self,
        widget: WidgetId,
        face: Face,
        target: Option<WidgetId>,
    ) -> Result<()> {
        self.widget(widget)?;
        if let Some(t) = target {
            self.widget(t)?;
            if t == widget {
                let err = Error::RecursiveNavigation { widget, face };
                warn!(%err, "refused");
                self.record_diagnostic(err.clone());
                return Err(err);
            }
        }
        self.widget_mut(widget)?.navigation.set_forced(face, target);
        self.request_update(Stage::Navigation);
        Ok(())
    }

    fn set_null_override(&mut self, widget: WidgetId, face: Face, enabled: bool) -> Result<()> {
        self.widget_mut(widget)?.navigation.set_null_override(face, enabled);
        self.request_update(Stage::Navigation);
        Ok(())
    }
}

/// Focus a widget from above: prefer the child that last held focus, then
/// the first eligible child in tab order, then the widget itself.
pub(crate) fn focus_down(scene: &mut Scene, w: WidgetId, v: ViewerIndex) -> bool {
    if !scene.can_accept_focus(w, v) {
        trace!(viewer = v, "widget cannot accept focus");
        return false;
    }
    let last = scene.widgets[w].focus[v]
        .last_focused
        .filter(|c| scene.widgets.get(*c).is_some_and(|cw| cw.parent == Some(w)))
        .filter(|c| scene.can_accept_focus(*c, v));
    if let Some(c) = last
        && focus_down(scene, c, v)
    {
        return true;
    }
    for c in navigation::tab_order(scene, w, v, true) {
        if Some(c) != last && scene.can_accept_focus(c, v) && focus_down(scene, c, v) {
            return true;
        }
    }
    if scene.widgets[w].suppress_focus && w != scene.root {
        return false;
    }
    gain_focus(scene, w, None, v)
}

/// A child asks `w` to point the focus chain at it.
fn focus_up(scene: &mut Scene, w: WidgetId, child: WidgetId, v: ViewerIndex) -> bool {
    scene.can_accept_focus(w, v) && gain_focus(scene, w, Some(child), v)
}

/// Put `w` on the focus chain with `child` as its focused child, guarding
/// against re-entrant requests on the same widget.
fn gain_focus(scene: &mut Scene, w: WidgetId, child: Option<WidgetId>, v: ViewerIndex) -> bool {
    if scene.widgets[w].propagation[v].pending {
        debug!(viewer = v, widget = %scene.widgets[w].name, "re-entrant focus request ignored");
        return false;
    }
    scene.widgets[w].propagation[v].pending = true;
    let ok = link_focus(scene, w, child, v);
    scene.widgets[w].propagation[v].pending = false;
    ok
}

/// Body of [`gain_focus`].
fn link_focus(scene: &mut Scene, w: WidgetId, child: Option<WidgetId>, v: ViewerIndex) -> bool {
    if let Some(old) = scene.widgets[w].focus[v].focused.filter(|o| Some(*o) != child) {
        if !kill_down(scene, old, v) {
            debug!(viewer = v, "focus change vetoed by a lock");
            return false;
        }
        scene.widgets[w].focus[v].focused = None;
    }
    if let Some(p) = scene.widgets[w].parent {
        let rec = scene.widgets[p].focus[v];
        if !(rec.has_focus && rec.focused == Some(w)) && !focus_up(scene, p, w, v) {
            return false;
        }
    }
    let rec = &mut scene.widgets[w].focus[v];
    rec.focused = child;
    if child.is_some() {
        rec.last_focused = child;
    }
    if !rec.has_focus {
        rec.has_focus = true;
        scene.set_state(w, v, StateKind::Focused, true);
        scene.queue_event(v, EventTag::FocusReceived, w);
        debug!(viewer = v, widget = %scene.widgets[w].name, "focus received");
    }
    true
}

/// Clear `w` and its focused descendants. Nothing changes if any of them is
/// locked.
fn kill_down(scene: &mut Scene, w: WidgetId, v: ViewerIndex) -> bool {
    let Some(widget) = scene.widgets.get(w) else {
        return true;
    };
    let rec = widget.focus[v];
    if !rec.has_focus {
        return true;
    }
    if widget.focus_lock {
        warn!(viewer = v, widget = %widget.name, "focus loss vetoed by lock");
        return false;
    }
    if let Some(c) = rec.focused
        && !kill_down(scene, c, v)
    {
        return false;
    }
    lose_focus(scene, w, v);
    true
}

/// A child left the chain: detach it from `w`, then take `w` and its
/// ancestors off the chain. A locked widget stops the walk and becomes the
/// innermost focused widget.
fn kill_up(scene: &mut Scene, w: WidgetId, child: WidgetId, v: ViewerIndex) -> bool {
    let rec = scene.widgets[w].focus[v];
    if rec.focused == Some(child) {
        scene.widgets[w].focus[v].focused = None;
    } else if let Some(other) = rec.focused
        && !kill_down(scene, other, v)
    {
        return false;
    }
    if !rec.has_focus {
        return true;
    }
    if scene.widgets[w].focus_lock {
        warn!(viewer = v, widget = %scene.widgets[w].name, "focus loss vetoed by lock");
        return false;
    }
    lose_focus(scene, w, v);
    match scene.widgets[w].parent {
        Some(p) => kill_up(scene, p, w, v),
        None => true,
    }
}

/// Take a single widget off the chain.
fn lose_focus(scene: &mut Scene, w: WidgetId, v: ViewerIndex) {
    let rec = &mut scene.widgets[w].focus[v];
    rec.has_focus = false;
    rec.focused = None;
    scene.set_state(w, v, StateKind::Focused, false);
    scene.queue_event(v, EventTag::FocusLost, w);
    debug!(viewer = v, widget = %scene.widgets[w].name, "focus lost");
}

/// Focus the first (or last) eligible control under a container, descending
/// through nested containers.
fn enter_container(scene: &mut Scene, container: WidgetId, v: ViewerIndex, forward: bool) -> bool {
    for c in navigation::tab_order(scene, container, v, forward) {
        if scene.can_accept_focus(c, v) && enter_control(scene, c, v, forward) {
            return true;
        }
    }
    false
}

/// Focus a control reached by tabbing. Containers with eligible children are
/// entered at their first (or last) control.
fn enter_control(scene: &mut Scene, c: WidgetId, v: ViewerIndex, forward: bool) -> bool {
    let has_eligible = scene.widgets[c]
        .children
        .iter()
        .any(|gc| scene.can_accept_focus(*gc, v));
    if has_eligible && enter_container(scene, c, v, forward) {
        return true;
    }
    if scene.widgets[c].suppress_focus {
        return false;
    }
    gain_focus(scene, c, None, v)
}

/// Shared body of next and previous control.
fn step_control(scene: &mut Scene, v: ViewerIndex, forward: bool) -> Result<bool> {
    check_viewer(v)?;
    let root = scene.root;
    let cur = scene.focused_control(v).filter(|c| *c != root);
    match cur.and_then(|c| scene.widgets[c].parent) {
        Some(p) => step_from(scene, p, cur, v, forward),
        None => Ok(enter_container(scene, root, v, forward)),
    }
}

/// Shared body of next and previous control from a container.
fn step_from(
    scene: &mut Scene,
    container: WidgetId,
    sender: Option<WidgetId>,
    v: ViewerIndex,
    forward: bool,
) -> Result<bool> {
    check_viewer(v)?;
    scene.widget(container)?;
    if let Some(s) = sender {
        scene.widget(s)?;
    }
    let step = |scene: &Scene, id: WidgetId| {
        let link = scene.widgets[id].propagation[v];
        if forward { link.next } else { link.prev }
    };
    let mut cur = match sender {
        Some(s) => step(&*scene, s),
        None => navigation::tab_order(scene, container, v, forward).first().copied(),
    };
    let mut seen = HashSet::new();
    while let Some(c) = cur {
        if !seen.insert(c) {
            break;
        }
        if scene.can_accept_focus(c, v) && enter_control(scene, c, v, forward) {
            return Ok(true);
        }
        cur = step(&*scene, c);
    }
    match scene.widgets[container].parent {
        Some(p) => step_from(scene, p, Some(container), v, forward),
        None if scene.config.wrap_tab_navigation => {
            Ok(enter_container(scene, container, v, forward))
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::SceneConfig, viewport::FixedViewport},
        widget::{WidgetKind, WidgetTemplate},
    };

    fn button(name: &str) -> WidgetTemplate {
        WidgetTemplate::new(name, WidgetKind::Button { caption: name.into() })
    }

    fn setup(t: WidgetTemplate) -> Scene {
        let mut s = Scene::new(SceneConfig::default()).with_viewport(FixedViewport::new(100.0, 100.0));
        let id = s.create_widget(&t).unwrap();
        let root = s.root();
        s.insert_child(root, id).unwrap();
        s.rebuild_navigation_links();
        s
    }

    fn id(s: &Scene, name: &str) -> WidgetId {
        s.find_widget(name).unwrap()
    }

    #[test]
    fn focus_delegates_down() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a"))
                .child(button("b")),
        );
        assert!(s.set_focus(s.root(), None, 0).unwrap());
        assert_eq!(s.focused_control(0), Some(id(&s, "a")));
        assert_eq!(s.focus_chain(0), vec![s.root(), id(&s, "menu"), id(&s, "a")]);
        assert!(s.widget(id(&s, "a")).unwrap().states().is_active(0, StateKind::Focused));
        assert_eq!(s.focused_control(1), None);
    }

    #[test]
    fn last_focused_is_remembered() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a"))
                .child(button("b")),
        );
        let b = id(&s, "b");
        let menu = id(&s, "menu");
        assert!(s.set_focus(b, Some(menu), 0).unwrap());
        assert!(!s.is_focused(id(&s, "a"), 0));
        assert!(s.kill_focus(s.root(), None, 0).unwrap());
        assert_eq!(s.focused_control(0), None);
        assert!(s.set_focus(s.root(), None, 0).unwrap());
        assert_eq!(s.focused_control(0), Some(b));
    }

    #[test]
    fn lock_vetoes() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a").focus_lock())
                .child(button("b")),
        );
        let (a, b, menu) = (id(&s, "a"), id(&s, "b"), id(&s, "menu"));
        assert!(s.set_focus(a, Some(menu), 0).unwrap());
        s.take_events();
        assert!(!s.set_focus(b, Some(menu), 0).unwrap());
        assert_eq!(s.focused_control(0), Some(a));
        assert!(s.take_events().is_empty());
        assert!(!s.kill_focus(a, None, 0).unwrap());
        assert!(s.is_focused(a, 0));
    }

    #[test]
    fn bad_sender() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a"))
                .child(button("b")),
        );
        let (a, b) = (id(&s, "a"), id(&s, "b"));
        assert!(matches!(s.set_focus(a, Some(b), 0), Err(Error::InvalidOperation(_))));
        assert_eq!(s.set_focus(a, None, 9), Err(Error::InvalidViewer(9)));
    }

    #[test]
    fn eligibility() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a").input_mask(0b0010))
                .child(button("b").hidden())
                .child(WidgetTemplate::new("label", WidgetKind::Label { text: "x".into() }))
                .child(WidgetTemplate::new("empty", WidgetKind::Panel)),
        );
        let (a, b) = (id(&s, "a"), id(&s, "b"));
        assert!(!s.can_accept_focus(a, 0));
        assert!(s.can_accept_focus(a, 1));
        assert!(!s.can_accept_focus(b, 1));
        assert!(!s.can_accept_focus(id(&s, "label"), 1));
        assert!(!s.can_accept_focus(id(&s, "empty"), 1));
        assert!(s.can_accept_focus(id(&s, "menu"), 1));
        assert!(!s.can_accept_focus(id(&s, "menu"), 0));
        s.activate_state(a, 1, StateKind::Disabled).unwrap();
        assert!(!s.can_accept_focus(a, 1));
    }

    #[test]
    fn disabling_kills_focus() {
        let mut s = setup(WidgetTemplate::new("menu", WidgetKind::Panel).child(button("a")));
        let a = id(&s, "a");
        s.set_focus(s.root(), None, 0).unwrap();
        assert!(s.is_focused(a, 0));
        s.activate_state(a, 0, StateKind::Disabled).unwrap();
        assert!(!s.is_focused(a, 0));
        assert!(!s.widget(a).unwrap().states().is_active(0, StateKind::Focused));
    }

    #[test]
    fn tab_wraps() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a"))
                .child(button("b")),
        );
        let (a, b) = (id(&s, "a"), id(&s, "b"));
        assert!(s.next_control(0).unwrap());
        assert_eq!(s.focused_control(0), Some(a));
        assert!(s.next_control(0).unwrap());
        assert_eq!(s.focused_control(0), Some(b));
        assert!(s.next_control(0).unwrap());
        assert_eq!(s.focused_control(0), Some(a));
        assert!(s.prev_control(0).unwrap());
        assert_eq!(s.focused_control(0), Some(b));
    }

    #[test]
    fn tab_without_wrap() {
        let mut s = setup(WidgetTemplate::new("menu", WidgetKind::Panel).child(button("a")));
        s.config.wrap_tab_navigation = false;
        assert!(s.next_control(0).unwrap());
        assert!(!s.next_control(0).unwrap());
        assert_eq!(s.focused_control(0), Some(id(&s, "a")));
    }

    #[test]
    fn viewers_are_independent() {
        let mut s = setup(
            WidgetTemplate::new("menu", WidgetKind::Panel)
                .child(button("a"))
                .child(button("b")),
        );
        let (a, b, menu) = (id(&s, "a"), id(&s, "b"), id(&s, "menu"));
        s.set_focus(a, Some(menu), 0).unwrap();
        s.set_focus(b, Some(menu), 1).unwrap();
        assert_eq!(s.focused_control(0), Some(a));
        assert_eq!(s.focused_control(1), Some(b));
        s.kill_focus(a, None, 0).unwrap();
        assert_eq!(s.focused_control(1), Some(b));
    }

    #[test]
    fn self_navigation_refused() {
        let mut s = setup(WidgetTemplate::new("menu", WidgetKind::Panel).child(button("a")));
        let a = id(&s, "a");
        assert_eq!(
            s.set_forced_navigation_target(a, Face::Left, Some(a)),
            Err(Error::RecursiveNavigation {
                widget: a,
                face: Face::Left
            })
        );
    }
}
