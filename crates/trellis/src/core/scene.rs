use std::{
    collections::{BTreeSet, HashMap, HashSet, VecDeque},
    mem,
};

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::{
    core::{
        binding::{DataSource, DataValue},
        config::SceneConfig,
        coords::PositionBase,
        docking::{
            self, DockPadding, DockTarget, DockedIndex, DockingGraph, DockingNode, DockingSolver,
            DockingStack,
        },
        event::{EventActivator, EventQueue, EventTag, PendingEvent},
        focus::FocusManager,
        id::{ALL_VIEWERS, MAX_VIEWERS, ViewerIndex, WidgetId, check_viewer, viewer_bit},
        name::WidgetName,
        position::{FaceValue, Position},
        resolve::PositionResolver,
        state::StateKind,
        style::{StyleResolver, StyleSlot},
        update::{self, Stage, UpdateFlags, UpdateReport},
        viewport::{ViewportMetrics, ViewportProvider},
    },
    error::{Error, Result},
    geom::Face,
    widget::{Rotation, Widget, WidgetKind, WidgetTemplate},
};

/// Name of the root widget.
const ROOT_NAME: &str = "scene";

/// The root of a widget tree and the owner of every widget in it.
///
/// Widgets live in an arena addressed by [`WidgetId`]. Handles to destroyed
/// widgets are detected rather than dereferenced: every public operation
/// taking a handle returns [`Error::WidgetNotFound`] for a stale one.
pub struct Scene {
    /// Widget arena.
    pub(crate) widgets: SlotMap<WidgetId, Widget>,
    /// The root widget, of kind [`WidgetKind::Scene`].
    pub(crate) root: WidgetId,
    /// Name index.
    pub(crate) names: HashMap<WidgetName, WidgetId>,
    /// Evaluation order from the last docking rebuild.
    pub(crate) docking_stack: DockingStack,
    /// Faces on a docking cycle as of the last rebuild.
    pub(crate) cyclic: BTreeSet<DockingNode>,
    /// Faces docked to each widget.
    pub(crate) docked: DockedIndex,
    /// Pending pipeline stages.
    pub(crate) flags: UpdateFlags,
    /// Events waiting for dispatch.
    pub(crate) events: EventQueue,
    /// Recent structural errors, oldest first.
    pub(crate) diagnostics: VecDeque<Error>,
    /// Configuration.
    pub(crate) config: SceneConfig,
    /// Viewport collaborator.
    pub(crate) viewport: Option<Box<dyn ViewportProvider>>,
    /// Viewport metrics the cached faces were resolved against.
    pub(crate) last_viewport: Option<ViewportMetrics>,
    /// Style collaborator.
    pub(crate) styles: Option<Box<dyn StyleResolver>>,
    /// Event collaborator.
    pub(crate) activator: Option<Box<dyn EventActivator>>,
    /// Data store collaborator.
    pub(crate) data: Option<Box<dyn DataSource>>,
    /// The first update has run.
    pub(crate) initialized: bool,
    /// Faces whose resolution is in progress.
    pub(crate) resolving: HashSet<DockingNode>,
    /// Result of the last primitive-usage stage.
    pub(crate) uses_primitives: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl DockingGraph for Scene {
    fn dock_dependency(&self, node: DockingNode) -> Option<DockingNode> {
        let link = self.widgets.get(node.widget)?.docking.get(node.face)?;
        let target = link
            .target
            .filter(|t| *t != self.root && self.widgets.contains_key(*t))?;
        Some(DockingNode::new(target, link.face))
    }
}

impl Scene {
    /// An empty scene covering the whole viewport.
    pub fn new(config: SceneConfig) -> Self {
        let mut widgets = SlotMap::with_key();
        let name = WidgetName::convert(ROOT_NAME);
        let mut root_widget = Widget::new(name.clone(), WidgetKind::Scene);
        root_widget.position = Position {
            left: FaceValue::new(0.0, PositionBase::PercentageViewport),
            top: FaceValue::new(0.0, PositionBase::PercentageViewport),
            right: FaceValue::new(1.0, PositionBase::PercentageViewport),
            bottom: FaceValue::new(1.0, PositionBase::PercentageViewport),
        };
        let root = widgets.insert(root_widget);
        let mut names = HashMap::new();
        names.insert(name, root);
        Self {
            widgets,
            root,
            names,
            docking_stack: DockingStack::new(),
            cyclic: BTreeSet::new(),
            docked: DockedIndex::default(),
            flags: UpdateFlags::all(),
            events: EventQueue::default(),
            diagnostics: VecDeque::new(),
            config,
            viewport: None,
            last_viewport: None,
            styles: None,
            activator: None,
            data: None,
            initialized: false,
            resolving: HashSet::new(),
            uses_primitives: false,
        }
    }

    /// Builder form of [`Scene::set_viewport`].
    pub fn with_viewport(mut self, viewport: impl ViewportProvider + 'static) -> Self {
        self.set_viewport(Box::new(viewport));
        self
    }

    /// Install the viewport. Every position is re-resolved.
    pub fn set_viewport(&mut self, viewport: Box<dyn ViewportProvider>) {
        self.viewport = Some(viewport);
        self.invalidate_all_positions();
    }

    /// Install the style resolver. Every styled widget is re-resolved.
    pub fn set_style_resolver(&mut self, styles: Box<dyn StyleResolver>) {
        self.styles = Some(styles);
        for w in self.widgets.values_mut() {
            w.style.mark_stale();
        }
        self.flags.request(Stage::Styles);
    }

    /// Install the event activator. Without one, events accumulate until
    /// [`Scene::take_events`].
    pub fn set_event_activator(&mut self, activator: Box<dyn EventActivator>) {
        self.activator = Some(activator);
    }

    /// Install the data store.
    pub fn set_data_source(&mut self, data: Box<dyn DataSource>) {
        self.data = Some(data);
    }

    /// Run one frame of the update pipeline.
    pub fn update(&mut self) -> Result<UpdateReport> {
        update::run(self)
    }

    /// The root widget.
    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Scene configuration.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of live widgets, including the root.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// True if the scene holds only its root.
    pub fn is_empty(&self) -> bool {
        self.widgets.len() <= 1
    }

    /// Borrow a widget.
    pub fn widget(&self, id: WidgetId) -> Result<&Widget> {
        self.widgets.get(id).ok_or(Error::WidgetNotFound(id))
    }

    /// Mutable access for crate internals.
    pub(crate) fn widget_mut(&mut self, id: WidgetId) -> Result<&mut Widget> {
        self.widgets.get_mut(id).ok_or(Error::WidgetNotFound(id))
    }

    /// Does the handle refer to a live widget?
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Look a widget up by name.
    pub fn find_widget(&self, name: &str) -> Option<WidgetId> {
        self.names.get(&WidgetName::convert(name)).copied()
    }

    /// Parent of a widget.
    pub fn parent(&self, id: WidgetId) -> Result<Option<WidgetId>> {
        Ok(self.widget(id)?.parent)
    }

    /// Children of a widget.
    pub fn children(&self, id: WidgetId) -> Result<&[WidgetId]> {
        Ok(&self.widget(id)?.children)
    }

    /// A widget and its descendants in pre-order.
    pub fn preorder(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(w) = self.widgets.get(n) {
                out.push(n);
                stack.extend(w.children.iter().rev());
            }
        }
        out
    }

    /// Is `ancestor` a strict ancestor of `node`?
    pub fn is_ancestor(&self, ancestor: WidgetId, node: WidgetId) -> bool {
        let mut cur = self.widgets.get(node).and_then(|w| w.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.widgets.get(p).and_then(|w| w.parent);
        }
        false
    }

    /// Is the widget in the tree under the root?
    pub fn is_attached(&self, id: WidgetId) -> bool {
        id == self.root || (self.widgets.contains_key(id) && self.is_ancestor(self.root, id))
    }

    /// Is the widget and every ancestor visible, up to the root?
    pub fn is_displayed(&self, id: WidgetId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let Some(w) = self.widgets.get(n) else {
                return false;
            };
            if !w.visible {
                return false;
            }
            if n == self.root {
                return true;
            }
            cur = w.parent;
        }
        false
    }

    /// The widget's input mask combined with every ancestor's, computed now.
    pub fn live_input_mask(&self, id: WidgetId) -> u8 {
        let mut mask = u8::MAX;
        let mut cur = Some(id);
        while let Some(n) = cur {
            let Some(w) = self.widgets.get(n) else {
                return 0;
            };
            mask &= w.input_mask;
            cur = w.parent;
        }
        mask
    }

    /// Create a widget subtree from a template. The result is detached; use
    /// [`Scene::insert_child`] to place it. Names already in use get a
    /// numeric suffix. Docking and navigation links name their targets, which
    /// are looked up in the new subtree first and then in the scene. Links
    /// that cannot be made are skipped and recorded as diagnostics.
    pub fn create_widget(&mut self, template: &WidgetTemplate) -> Result<WidgetId> {
        if template
            .descendants()
            .iter()
            .any(|t| t.kind == WidgetKind::Scene)
        {
            return Err(Error::InvalidOperation(
                "scene widgets cannot be created from templates".into(),
            ));
        }
        let mut created = Vec::new();
        let id = self.instantiate(template, &mut created);
        let local: HashMap<&WidgetName, WidgetId> =
            created.iter().map(|(t, id)| (&t.name, *id)).collect();
        for (t, wid) in &created {
            self.link_template(t, *wid, &local);
        }
        self.request_structure_update();
        self.flags.request(Stage::Formatting);
        self.flags.request(Stage::Styles);
        debug!(widget = %self.widgets[id].name, count = created.len(), "created widgets");
        Ok(id)
    }

    /// Allocate a template's widget and its children.
    fn instantiate<'t>(
        &mut self,
        t: &'t WidgetTemplate,
        created: &mut Vec<(&'t WidgetTemplate, WidgetId)>,
    ) -> WidgetId {
        let name = self.unique_name(&t.name);
        let id = self.widgets.insert(Widget::from_template(name.clone(), t));
        self.names.insert(name, id);
        created.push((t, id));
        for c in &t.children {
            let cid = self.instantiate(c, created);
            self.widgets[cid].parent = Some(id);
            self.widgets[id].children.push(cid);
        }
        id
    }

    /// The requested name, or the first free suffixed variant.
    fn unique_name(&self, name: &WidgetName) -> WidgetName {
        if !self.names.contains_key(name) {
            return name.clone();
        }
        (1..)
            .map(|n| name.with_suffix(n))
            .find(|n| !self.names.contains_key(n))
            .unwrap_or_else(|| name.clone())
    }

    /// Connect the named docking and navigation links of a new widget.
    fn link_template(
        &mut self,
        t: &WidgetTemplate,
        id: WidgetId,
        local: &HashMap<&WidgetName, WidgetId>,
    ) {
        let lookup = |scene: &Self, name: &WidgetName| {
            local
                .get(name)
                .copied()
                .or_else(|| scene.names.get(name).copied())
        };
        for d in &t.docking {
            let target = match &d.target {
                None => None,
                Some(n) => match lookup(self, n) {
                    Some(tid) => Some(tid),
                    None => {
                        self.refuse(Error::InvalidOperation(format!(
                            "unknown docking target `{n}`"
                        )));
                        continue;
                    }
                },
            };
            let target = self.normalize_dock_target(target);
            if target == Some(id) {
                self.refuse(Error::SelfDock {
                    widget: id,
                    face: d.face,
                });
                continue;
            }
            self.store_dock(
                id,
                d.face,
                Some(DockTarget {
                    target,
                    face: d.target_face,
                    padding: d.padding,
                }),
            );
        }
        for n in &t.navigation {
            let Some(name) = &n.target else {
                continue;
            };
            match lookup(self, name) {
                Some(tid) if tid == id => {
                    self.refuse(Error::RecursiveNavigation {
                        widget: id,
                        face: n.face,
                    });
                }
                Some(tid) => self.widgets[id].navigation.set_forced(n.face, Some(tid)),
                None => {
                    self.refuse(Error::InvalidOperation(format!(
                        "unknown navigation target `{name}`"
                    )));
                }
            }
        }
    }

    /// Attach a detached widget as the last child of `parent`.
    pub fn insert_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.widget(parent)?;
        let c = self.widget(child)?;
        if child == self.root {
            return Err(Error::InvalidOperation(
                "the scene root cannot be a child".into(),
            ));
        }
        if c.parent.is_some() {
            return Err(Error::AlreadyAttached(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }
        self.widgets[parent].children.push(child);
        self.widgets[child].parent = Some(parent);
        for id in self.preorder(child) {
            for f in Face::ALL {
                self.invalidate_position_dependencies(id, f);
            }
        }
        self.request_structure_update();
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Detach `child` from `parent`. Focus held inside the child's subtree is
    /// released first.
    pub fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        self.widget(parent)?;
        if self.widget(child)?.parent != Some(parent) {
            return Err(Error::InvalidOperation(format!(
                "{child:?} is not a child of {parent:?}"
            )));
        }
        self.release_focus(parent, child);
        self.unlink_tab_order(parent, child);
        for f in Face::ALL {
            self.invalidate_position_dependencies(child, f);
        }
        self.widgets[parent].children.retain(|c| *c != child);
        self.widgets[child].parent = None;
        self.request_structure_update();
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Remove a widget and its subtree from the scene, severing every docking,
    /// navigation, and focus reference to them.
    pub fn destroy_widget(&mut self, id: WidgetId) -> Result<()> {
        if id == self.root {
            return Err(Error::InvalidOperation(
                "the scene root cannot be destroyed".into(),
            ));
        }
        if let Some(parent) = self.widget(id)?.parent {
            self.remove_child(parent, id)?;
        }
        let doomed: HashSet<WidgetId> = self.preorder(id).into_iter().collect();
        for d in &doomed {
            if let Some(w) = self.widgets.remove(*d) {
                for (f, link) in w.docking.iter() {
                    self.docked
                        .unlink(link.target.unwrap_or(self.root), DockingNode::new(*d, f));
                }
                self.names.remove(&w.name);
            }
            self.events.forget(*d);
        }
        let mut undocked = Vec::new();
        for d in &doomed {
            for node in self.docked.take(*d) {
                if let Some(w) = self.widgets.get_mut(node.widget) {
                    w.docking.set(node.face, None);
                    undocked.push(node);
                }
            }
        }
        for w in self.widgets.values_mut() {
            for d in &doomed {
                w.navigation.sever(*d);
            }
            for v in 0..MAX_VIEWERS {
                w.focus[v].sever(&doomed);
                w.propagation[v].sever(&doomed);
            }
        }
        for node in undocked {
            self.invalidate_position_dependencies(node.widget, node.face);
        }
        self.cyclic.retain(|n| !doomed.contains(&n.widget));
        self.resolving.retain(|n| !doomed.contains(&n.widget));
        self.request_structure_update();
        debug!(count = doomed.len(), "destroyed widgets");
        self.debug_assert_tree_invariants();
        Ok(())
    }

    /// Release every viewer's focus inside `child` before it is detached.
    fn release_focus(&mut self, parent: WidgetId, child: WidgetId) {
        for v in 0..MAX_VIEWERS {
            if self.widgets[parent].focus[v].focused == Some(child)
                && !self.kill_focus(child, Some(parent), v).unwrap_or(false)
            {
                warn!(viewer = v, "focus lock overridden by widget removal");
                for id in self.preorder(child) {
                    self.drop_focus_record(id, v);
                }
            }
            let rec = &mut self.widgets[parent].focus[v];
            if rec.focused == Some(child) {
                rec.focused = None;
            }
            if rec.last_focused == Some(child) {
                rec.last_focused = None;
            }
        }
    }

    /// Clear a focus record without consulting focus locks.
    pub(crate) fn drop_focus_record(&mut self, id: WidgetId, viewer: ViewerIndex) {
        let Some(rec) = self.widgets.get_mut(id).map(|w| &mut w.focus[viewer]) else {
            return;
        };
        if !rec.has_focus {
            return;
        }
        rec.has_focus = false;
        rec.focused = None;
        self.set_state(id, viewer, StateKind::Focused, false);
        self.events.push(viewer, EventTag::FocusLost, id);
    }

    /// Splice a child out of its parent's tab chains.
    fn unlink_tab_order(&mut self, parent: WidgetId, child: WidgetId) {
        for v in 0..MAX_VIEWERS {
            let link = mem::take(&mut self.widgets[child].propagation[v]);
            if let Some(prev) = link.prev.and_then(|p| self.widgets.get_mut(p)) {
                prev.propagation[v].next = link.next;
            }
            if let Some(next) = link.next.and_then(|n| self.widgets.get_mut(n)) {
                next.propagation[v].prev = link.prev;
            }
            let p = &mut self.widgets[parent].propagation[v];
            if p.first == Some(child) {
                p.first = link.next;
            }
            if p.last == Some(child) {
                p.last = link.prev;
            }
            self.widgets[child].propagation[v].pending = link.pending;
            self.widgets[child].propagation[v].first = link.first;
            self.widgets[child].propagation[v].last = link.last;
        }
    }

    /// Map a dock on the root to a scene dock.
    fn normalize_dock_target(&self, target: Option<WidgetId>) -> Option<WidgetId> {
        target.filter(|t| *t != self.root)
    }

    /// Dock a face of `widget` to `target_face` of `target`, or to the scene
    /// when `target` is `None`. Self-docks and links that would close a
    /// docking cycle are refused, leaving any existing link in place.
    pub fn set_docking_target(
        &mut self,
        widget: WidgetId,
        face: Face,
        target: Option<WidgetId>,
        target_face: Face,
        padding: DockPadding,
    ) -> Result<()> {
        self.widget(widget)?;
        if let Some(t) = target {
            self.widget(t)?;
        }
        let target = self.normalize_dock_target(target);
        if target == Some(widget) || (target.is_none() && widget == self.root) {
            return Err(self.refuse(Error::SelfDock { widget, face }));
        }
        if let Some(t) = target
            && docking::depends_on(
                self,
                DockingNode::new(t, target_face),
                DockingNode::new(widget, face),
            )
        {
            return Err(self.refuse(Error::DockingCycle { widget, face }));
        }
        self.store_dock(
            widget,
            face,
            Some(DockTarget {
                target,
                face: target_face,
                padding,
            }),
        );
        self.docking_changed(widget, face);
        Ok(())
    }

    /// Remove a face's docking link. Returns true if there was one. The face
    /// keeps its last resolved position.
    pub fn clear_docking_target(&mut self, widget: WidgetId, face: Face) -> Result<bool> {
        self.widget(widget)?;
        let had = self.store_dock(widget, face, None).is_some();
        if had {
            self.docking_changed(widget, face);
        }
        Ok(had)
    }

    /// Replace a face's docking link, keeping the reverse index in step.
    fn store_dock(
        &mut self,
        widget: WidgetId,
        face: Face,
        link: Option<DockTarget>,
    ) -> Option<DockTarget> {
        let node = DockingNode::new(widget, face);
        let root = self.root;
        if let Some(l) = &link {
            self.docked.link(l.target.unwrap_or(root), node);
        }
        let old = self.widgets[widget].docking.set(face, link);
        if let Some(o) = &old
            && link.is_none_or(|l| l.target != o.target)
        {
            self.docked.unlink(o.target.unwrap_or(root), node);
        }
        old
    }

    /// Bookkeeping after a docking link changes.
    fn docking_changed(&mut self, widget: WidgetId, face: Face) {
        self.flags.request(Stage::Docking);
        self.invalidate_position_dependencies(widget, face);
        self.flags.request(Stage::Positions);
    }

    /// Rebuild the docking stack for the whole tree. Returns the number of
    /// cycles found.
    pub fn rebuild_docking_stack(&mut self) -> usize {
        let order = self.preorder(self.root);
        let mut stack = DockingStack::new();
        let outcome = {
            let mut solver = DockingSolver::new(&*self, &mut stack);
            for id in &order {
                solver.add_docking_link(*id);
            }
            solver.finish()
        };
        for node in &outcome.cycles {
            warn!(
                widget = %self.widgets[node.widget].name,
                face = %node.face,
                "docking cycle; using last known position"
            );
            self.record_diagnostic(Error::DockingCycle {
                widget: node.widget,
                face: node.face,
            });
        }
        debug!(
            nodes = stack.len(),
            cycles = outcome.cycles.len(),
            "rebuilt docking stack"
        );
        self.docking_stack = stack;
        self.cyclic = outcome.cyclic;
        self.flags.request(Stage::Positions);
        outcome.cycles.len()
    }

    /// The docking stack from the last rebuild.
    pub fn docking_stack(&self) -> &DockingStack {
        &self.docking_stack
    }

    /// Faces on a docking cycle as of the last rebuild.
    pub fn cyclic_nodes(&self) -> &BTreeSet<DockingNode> {
        &self.cyclic
    }

    /// Show or hide a widget. Hiding kills focus held on the widget first.
    /// Returns false, leaving the widget shown, if a focus lock refuses.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> Result<bool> {
        if self.widget(id)?.visible == visible {
            return Ok(true);
        }
        if !visible {
            for v in 0..MAX_VIEWERS {
                if self.widgets[id].has_focus(v) && !self.kill_focus(id, None, v)? {
                    warn!(viewer = v, "focus lock refused hiding a focused widget");
                    return Ok(false);
                }
            }
        }
        self.widgets[id].visible = visible;
        self.flags.request(Stage::Navigation);
        self.flags.request(Stage::Primitives);
        Ok(true)
    }

    /// Set the viewers a widget accepts input from.
    pub fn set_input_mask(&mut self, id: WidgetId, mask: u8) -> Result<()> {
        self.widget_mut(id)?.input_mask = mask & ALL_VIEWERS;
        self.flags.request(Stage::InputMasks);
        Ok(())
    }

    /// Set or clear a widget's explicit tab index.
    pub fn set_tab_index(&mut self, id: WidgetId, index: Option<i32>) -> Result<()> {
        self.widget_mut(id)?.tab_index = index;
        self.flags.request(Stage::Navigation);
        Ok(())
    }

    /// Make a widget take focus only through its children.
    pub fn set_suppress_focus(&mut self, id: WidgetId, suppress: bool) -> Result<()> {
        self.widget_mut(id)?.suppress_focus = suppress;
        self.flags.request(Stage::Navigation);
        Ok(())
    }

    /// Make a widget veto losing focus.
    pub fn set_focus_lock(&mut self, id: WidgetId, lock: bool) -> Result<()> {
        self.widget_mut(id)?.focus_lock = lock;
        Ok(())
    }

    /// Set or clear a widget's rotation.
    pub fn set_rotation(&mut self, id: WidgetId, rotation: Option<Rotation>) -> Result<()> {
        self.widget_mut(id)?.rotation = rotation;
        self.flags.request(Stage::Rotation);
        self.flags.request(Stage::Primitives);
        Ok(())
    }

    /// Enable auto-sizing from text with the given padding.
    pub fn set_auto_size(&mut self, id: WidgetId, auto_size: bool, padding: f32) -> Result<()> {
        let w = self.widget_mut(id)?;
        w.format.auto_size = auto_size;
        w.format.padding = padding;
        w.format.stale = auto_size;
        self.flags.request(Stage::Formatting);
        Ok(())
    }

    /// Replace a widget's text. Returns false for kinds without text.
    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<bool> {
        let w = self.widget_mut(id)?;
        if w.kind.text() == Some(text) {
            return Ok(true);
        }
        if !w.kind.set_text(text) {
            return Ok(false);
        }
        if w.format.auto_size {
            w.format.stale = true;
            self.flags.request(Stage::Formatting);
        }
        self.events.push(0, EventTag::ValueChanged, id);
        Ok(true)
    }

    /// Set or clear a widget's style reference.
    pub fn set_style_reference(&mut self, id: WidgetId, reference: Option<&str>) -> Result<()> {
        self.widget_mut(id)?.style = StyleSlot::new(reference.map(str::to_string));
        self.flags.request(Stage::Styles);
        Ok(())
    }

    /// Apply a value to a widget and publish it to its binding. Returns true
    /// if the widget changed.
    pub fn set_value(&mut self, id: WidgetId, value: &DataValue) -> Result<bool> {
        let w = self.widget_mut(id)?;
        if !w.kind.apply_value(value) {
            return Ok(false);
        }
        if w.format.auto_size {
            w.format.stale = true;
            self.flags.request(Stage::Formatting);
        }
        self.events.push(0, EventTag::ValueChanged, id);
        self.publish_value(id)?;
        Ok(true)
    }

    /// Push a widget's value to its bound data store field. Returns false if
    /// there is no binding, no store, or the store refused.
    pub fn publish_value(&mut self, id: WidgetId) -> Result<bool> {
        let w = self.widget(id)?;
        let (Some(binding), Some(value)) = (w.binding.clone(), w.kind.value()) else {
            return Ok(false);
        };
        Ok(self
            .data
            .as_mut()
            .is_some_and(|d| d.set_bound_value(&binding, value)))
    }

    /// Pull bound values from the data store. Returns the number of widgets
    /// that changed.
    pub fn refresh_bound_values(&mut self) -> usize {
        let Some(data) = self.data.as_ref() else {
            return 0;
        };
        let mut changed = Vec::new();
        for (id, w) in &mut self.widgets {
            let Some(value) = w.binding.as_ref().and_then(|b| data.bound_value(b)) else {
                continue;
            };
            if w.kind.apply_value(&value) {
                if w.format.auto_size {
                    w.format.stale = true;
                }
                changed.push(id);
            }
        }
        for id in &changed {
            self.events.push(0, EventTag::ValueChanged, *id);
        }
        if !changed.is_empty() {
            self.flags.request(Stage::Formatting);
        }
        changed.len()
    }

    /// Activate a state for a viewer. Returns false if the widget's pool
    /// lacks the state, it is already active, or it is blocked. Disabling a
    /// focused widget kills its focus first; a focus lock refuses the change.
    pub fn activate_state(
        &mut self,
        id: WidgetId,
        viewer: ViewerIndex,
        kind: StateKind,
    ) -> Result<bool> {
        check_viewer(viewer)?;
        let w = self.widget(id)?;
        if kind == StateKind::Disabled && w.has_focus(viewer) && !self.kill_focus(id, None, viewer)? {
            warn!(viewer, "focus lock refused disabling a focused widget");
            return Ok(false);
        }
        Ok(self.set_state(id, viewer, kind, true))
    }

    /// Deactivate a state for a viewer. Returns true if it was active.
    /// Lifting Disabled restores Enabled when the pool supports it.
    pub fn deactivate_state(
        &mut self,
        id: WidgetId,
        viewer: ViewerIndex,
        kind: StateKind,
    ) -> Result<bool> {
        check_viewer(viewer)?;
        self.widget(id)?;
        Ok(self.set_state(id, viewer, kind, false))
    }

    /// Change a state, queueing events and requesting a style refresh.
    pub(crate) fn set_state(
        &mut self,
        id: WidgetId,
        viewer: ViewerIndex,
        kind: StateKind,
        on: bool,
    ) -> bool {
        let Some(w) = self.widgets.get_mut(id) else {
            return false;
        };
        if !w.pool.supports(kind) {
            return false;
        }
        if on {
            let change = w.states.activate(viewer, kind);
            if !change.activated {
                return false;
            }
            for r in change.removed {
                self.events.push(viewer, EventTag::StateDeactivated(r), id);
            }
            self.events.push(viewer, EventTag::StateActivated(kind), id);
        } else {
            if !w.states.deactivate(viewer, kind) {
                return false;
            }
            self.events.push(viewer, EventTag::StateDeactivated(kind), id);
            if kind == StateKind::Disabled
                && w.pool.supports(StateKind::Enabled)
                && w.states.activate(viewer, StateKind::Enabled).activated
            {
                self.events.push(viewer, EventTag::StateActivated(StateKind::Enabled), id);
            }
        }
        if w.style.mark_stale() {
            self.flags.request(Stage::Styles);
        }
        true
    }

    /// Give every widget its Enabled state for each viewer, without events.
    pub(crate) fn initialize_default_states(&mut self) {
        for w in self.widgets.values_mut() {
            for v in 0..MAX_VIEWERS {
                if w.pool.supports(StateKind::Enabled) && !w.states.is_active(v, StateKind::Disabled) {
                    w.states.activate(v, StateKind::Enabled);
                }
            }
            w.style.mark_stale();
        }
    }

    /// Queue an event.
    pub(crate) fn queue_event(&mut self, viewer: ViewerIndex, tag: EventTag, id: WidgetId) {
        self.events.push(viewer, tag, id);
    }

    /// Events not yet dispatched.
    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }

    /// Remove and return every pending event.
    pub fn take_events(&mut self) -> Vec<PendingEvent> {
        self.events.take()
    }

    /// Deliver pending events to the activator, if one is installed.
    pub(crate) fn dispatch_events(&mut self) -> usize {
        match self.activator.as_mut() {
            Some(a) => self.events.dispatch(a.as_mut()),
            None => 0,
        }
    }

    /// Record a refused operation and hand the error back.
    fn refuse(&mut self, err: Error) -> Error {
        warn!(%err, "refused");
        self.record_diagnostic(err.clone());
        err
    }

    /// Append to the diagnostics log, dropping the oldest entries past the
    /// configured limit.
    pub(crate) fn record_diagnostic(&mut self, err: Error) {
        self.diagnostics.push_back(err);
        while self.diagnostics.len() > self.config.diagnostic_limit {
            self.diagnostics.pop_front();
        }
    }

    /// Recent structural errors, oldest first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Error> {
        self.diagnostics.iter()
    }

    /// Current viewport metrics; a missing viewport measures zero.
    pub(crate) fn viewport_metrics(&self) -> ViewportMetrics {
        match &self.viewport {
            Some(v) => ViewportMetrics::from_provider(v.as_ref()),
            None => ViewportMetrics::empty(),
        }
    }

    /// Was any visible widget drawn with primitives at the last update?
    pub fn uses_primitives(&self) -> bool {
        self.uses_primitives
    }

    /// Stages waiting to run.
    pub fn pending_stages(&self) -> UpdateFlags {
        self.flags
    }

    /// Ask for a stage to run on the next update.
    pub fn request_update(&mut self, stage: Stage) {
        self.flags.request(stage);
    }

    /// Has the first update run?
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Stages affected by a change in tree shape.
    fn request_structure_update(&mut self) {
        for stage in [
            Stage::Docking,
            Stage::Positions,
            Stage::InputMasks,
            Stage::Navigation,
            Stage::Primitives,
        ] {
            self.flags.request(stage);
        }
    }

    /// Is the viewer bit set in a widget's live mask?
    pub fn accepts_input(&self, id: WidgetId, viewer: ViewerIndex) -> bool {
        self.live_input_mask(id) & viewer_bit(viewer) != 0
    }

    /// Check parent and child links agree, and no face is docked to its own
    /// widget. Compiled out of release builds.
    pub fn debug_assert_tree_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        debug_assert!(self.widgets[self.root].parent.is_none(), "root has a parent");
        for (id, w) in &self.widgets {
            if let Some(p) = w.parent {
                debug_assert!(
                    self.widgets.get(p).is_some_and(|pw| pw.children.contains(&id)),
                    "{id:?} missing from its parent's children"
                );
            }
            for c in &w.children {
                debug_assert!(
                    self.widgets.get(*c).is_some_and(|cw| cw.parent == Some(id)),
                    "{c:?} has the wrong parent"
                );
            }
            for (f, link) in w.docking.iter() {
                debug_assert!(link.target != Some(id), "{id:?}.{f} docked to itself");
                debug_assert!(
                    self.docked
                        .contains(link.target.unwrap_or(self.root), DockingNode::new(id, f)),
                    "{id:?}.{f} missing from the docked index"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::viewport::FixedViewport;

    fn scene() -> Scene {
        Scene::default().with_viewport(FixedViewport::new(800.0, 600.0))
    }

    fn panel(s: &mut Scene, name: &str) -> WidgetId {
        let id = s
            .create_widget(&WidgetTemplate::new(name, WidgetKind::Panel))
            .unwrap();
        let root = s.root();
        s.insert_child(root, id).unwrap();
        id
    }

    #[test]
    fn insert_rules() {
        let mut s = scene();
        let a = panel(&mut s, "a");
        let b = panel(&mut s, "b");
        assert_eq!(s.insert_child(a, b), Err(Error::AlreadyAttached(b)));
        s.remove_child(s.root(), b).unwrap();
        s.insert_child(a, b).unwrap();
        s.remove_child(s.root(), a).unwrap();
        assert_eq!(
            s.insert_child(b, a),
            Err(Error::WouldCreateCycle { parent: b, child: a })
        );
        assert!(s.insert_child(a, s.root()).is_err());
        assert!(s.remove_child(a, s.root()).is_err());
    }

    #[test]
    fn names_are_unique() {
        let mut s = scene();
        let a = panel(&mut s, "box");
        let b = panel(&mut s, "box");
        assert_eq!(s.widget(a).unwrap().name(), &"box");
        assert_eq!(s.widget(b).unwrap().name(), &"box_1");
        assert_eq!(s.find_widget("box_1"), Some(b));
        assert_eq!(s.find_widget("Box"), Some(a));
    }

    #[test]
    fn stale_handles() {
        let mut s = scene();
        let a = panel(&mut s, "a");
        s.destroy_widget(a).unwrap();
        assert_eq!(s.widget(a).err(), Some(Error::WidgetNotFound(a)));
        assert_eq!(s.destroy_widget(a), Err(Error::WidgetNotFound(a)));
        assert!(s.find_widget("a").is_none());
        assert!(s.destroy_widget(s.root()).is_err());
        let b = panel(&mut s, "b");
        assert_ne!(a, b);
    }

    #[test]
    fn destroy_severs_docking() {
        let mut s = scene();
        let a = panel(&mut s, "a");
        let b = panel(&mut s, "b");
        s.set_docking_target(a, Face::Right, Some(b), Face::Left, DockPadding::pixels(1.0))
            .unwrap();
        s.destroy_widget(b).unwrap();
        assert!(!s.widget(a).unwrap().docking().is_docked(Face::Right));
    }

    #[test]
    fn docking_refusals_keep_old_link() {
        let mut s = scene();
        let a = panel(&mut s, "a");
        let b = panel(&mut s, "b");
        assert_eq!(
            s.set_docking_target(a, Face::Left, Some(a), Face::Right, DockPadding::default()),
            Err(Error::SelfDock {
                widget: a,
                face: Face::Left
            })
        );
        s.set_docking_target(a, Face::Right, Some(b), Face::Left, DockPadding::pixels(10.0))
            .unwrap();
        s.set_docking_target(b, Face::Left, None, Face::Left, DockPadding::default())
            .unwrap();
        let err = s
            .set_docking_target(b, Face::Left, Some(a), Face::Right, DockPadding::default())
            .unwrap_err();
        assert_eq!(
            err,
            Error::DockingCycle {
                widget: b,
                face: Face::Left
            }
        );
        let link = s.widget(b).unwrap().docking().get(Face::Left).copied().unwrap();
        assert_eq!(link.target, None);
        assert_eq!(s.diagnostics().count(), 2);
    }

    #[test]
    fn root_dock_is_scene_dock() {
        let mut s = scene();
        let a = panel(&mut s, "a");
        s.set_docking_target(a, Face::Top, Some(s.root()), Face::Top, DockPadding::pixels(5.0))
            .unwrap();
        assert_eq!(s.widget(a).unwrap().docking().get(Face::Top).unwrap().target, None);
        assert!(
            s.set_docking_target(s.root(), Face::Top, None, Face::Top, DockPadding::default())
                .is_err()
        );
    }

    #[test]
    fn diagnostics_are_capped() {
        let mut s = Scene::new(SceneConfig {
            diagnostic_limit: 2,
            ..SceneConfig::default()
        });
        let a = panel(&mut s, "a");
        for _ in 0..5 {
            assert!(
                s.set_docking_target(a, Face::Left, Some(a), Face::Left, DockPadding::default())
                    .is_err()
            );
        }
        assert_eq!(s.diagnostics().count(), 2);
    }

    #[test]
    fn state_events() {
        let mut s = scene();
        let a = s
            .create_widget(&WidgetTemplate::new("ok", WidgetKind::Button { caption: "OK".into() }))
            .unwrap();
        assert!(s.activate_state(a, 0, StateKind::Pressed).unwrap());
        assert!(!s.activate_state(a, 0, StateKind::Pressed).unwrap());
        assert!(s.activate_state(a, 0, StateKind::Disabled).unwrap());
        let tags: Vec<EventTag> = s.take_events().into_iter().map(|e| e.tag).collect();
        assert_eq!(
            tags,
            vec![
                EventTag::StateActivated(StateKind::Pressed),
                EventTag::StateDeactivated(StateKind::Pressed),
                EventTag::StateActivated(StateKind::Disabled),
            ]
        );
        assert_eq!(s.activate_state(a, 7, StateKind::Active), Err(Error::InvalidViewer(7)));
        let label = s
            .create_widget(&WidgetTemplate::new("l", WidgetKind::Label { text: String::new() }))
            .unwrap();
        assert!(!s.activate_state(label, 0, StateKind::Pressed).unwrap());
    }

    #[test]
    fn template_links_by_name() {
        let mut s = scene();
        let t = WidgetTemplate::new("row", WidgetKind::Panel)
            .child(
                WidgetTemplate::new("a", WidgetKind::Panel)
                    .dock(Face::Right, Some("b"), Face::Left, DockPadding::pixels(2.0))
                    .dock(Face::Left, Some("a"), Face::Top, DockPadding::default())
                    .dock(Face::Top, Some("nowhere"), Face::Top, DockPadding::default()),
            )
            .child(WidgetTemplate::new("b", WidgetKind::Panel).navigate(Face::Left, "a"));
        s.create_widget(&t).unwrap();
        let a = s.find_widget("a").unwrap();
        let b = s.find_widget("b").unwrap();
        let link = s.widget(a).unwrap().docking().get(Face::Right).copied().unwrap();
        assert_eq!(link.target, Some(b));
        assert!(!s.widget(a).unwrap().docking().is_docked(Face::Left));
        assert!(!s.widget(a).unwrap().docking().is_docked(Face::Top));
        assert_eq!(s.widget(b).unwrap().navigation().forced(Face::Left), Some(a));
        assert_eq!(s.diagnostics().count(), 2);
    }
}
