//! Docking links and the solver that orders them.
//!
//! A docked face takes its position from another widget's face plus padding.
//! The solver walks these links and the intrinsic far-on-near dependencies to
//! produce a [`DockingStack`]: every face of the tree in an order where each
//! face follows everything it depends on. Faces that take part in a cycle are
//! left out of the stack and reported.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    mem,
};

use serde::{Deserialize, Serialize};

use crate::{
    core::{coords::PaddingBase, id::WidgetId},
    geom::Face,
};

/// Padding added to a docked face.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DockPadding {
    /// Padding amount.
    pub value: f32,
    /// Unit of `value`.
    #[serde(default)]
    pub base: PaddingBase,
}

impl DockPadding {
    /// Padding in raw pixels.
    pub fn pixels(value: f32) -> Self {
        Self {
            value,
            base: PaddingBase::Pixels,
        }
    }

    /// Padding in a given base.
    pub fn new(value: f32, base: PaddingBase) -> Self {
        Self { value, base }
    }
}

/// The target of a docked face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockTarget {
    /// Target widget. `None` docks to the scene.
    pub target: Option<WidgetId>,
    /// Face of the target.
    pub face: Face,
    /// Padding added to the target's position.
    pub padding: DockPadding,
}

/// Per-face docking links of one widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DockingSet {
    /// Link per face, indexed by [`Face::index`].
    links: [Option<DockTarget>; 4],
}

impl DockingSet {
    /// The link for a face.
    pub fn get(&self, face: Face) -> Option<&DockTarget> {
        self.links[face.index()].as_ref()
    }

    /// Is the face docked?
    pub fn is_docked(&self, face: Face) -> bool {
        self.links[face.index()].is_some()
    }

    /// Replace the link for a face, returning the old one.
    pub fn set(&mut self, face: Face, link: Option<DockTarget>) -> Option<DockTarget> {
        mem::replace(&mut self.links[face.index()], link)
    }

    /// Iterate over docked faces.
    pub fn iter(&self) -> impl Iterator<Item = (Face, &DockTarget)> {
        Face::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|link| (f, link)))
    }
}

/// Reverse docking index: for each target widget, the faces docked to it.
/// Scene docks are filed under the scene root.
#[derive(Debug, Clone, Default)]
pub struct DockedIndex {
    /// Docked faces keyed by target.
    by_target: HashMap<WidgetId, BTreeSet<DockingNode>>,
}

impl DockedIndex {
    /// Record that `node` is docked to `target`.
    pub fn link(&mut self, target: WidgetId, node: DockingNode) {
        self.by_target.entry(target).or_default().insert(node);
    }

    /// Forget that `node` is docked to `target`.
    pub fn unlink(&mut self, target: WidgetId, node: DockingNode) {
        if let Some(set) = self.by_target.get_mut(&target) {
            set.remove(&node);
            if set.is_empty() {
                self.by_target.remove(&target);
            }
        }
    }

    /// Faces docked to `target`.
    pub fn docked_to(&self, target: WidgetId) -> impl Iterator<Item = DockingNode> + '_ {
        self.by_target.get(&target).into_iter().flatten().copied()
    }

    /// Remove and return every face docked to `target`.
    pub fn take(&mut self, target: WidgetId) -> BTreeSet<DockingNode> {
        self.by_target.remove(&target).unwrap_or_default()
    }

    /// Is `node` filed under `target`?
    pub fn contains(&self, target: WidgetId, node: DockingNode) -> bool {
        self.by_target.get(&target).is_some_and(|s| s.contains(&node))
    }
}

/// A single face of a single widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DockingNode {
    /// Widget.
    pub widget: WidgetId,
    /// Face.
    pub face: Face,
}

impl DockingNode {
    /// Construct a node.
    pub fn new(widget: WidgetId, face: Face) -> Self {
        Self { widget, face }
    }

    /// The node this one always depends on: far faces depend on their own
    /// near face.
    pub fn intrinsic_dependency(&self) -> Option<Self> {
        self.face
            .is_far()
            .then(|| Self::new(self.widget, self.face.near()))
    }
}

/// An evaluation order over docking nodes. Each node appears at most once.
#[derive(Debug, Clone, Default)]
pub struct DockingStack {
    /// Nodes in evaluation order.
    nodes: Vec<DockingNode>,
    /// Membership index.
    index: HashSet<DockingNode>,
}

impl DockingStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Is the node in the stack?
    pub fn contains(&self, node: DockingNode) -> bool {
        self.index.contains(&node)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the stack has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes in evaluation order.
    pub fn nodes(&self) -> &[DockingNode] {
        &self.nodes
    }

    /// Position of a node in the order.
    pub fn position(&self, node: DockingNode) -> Option<usize> {
        if !self.contains(node) {
            return None;
        }
        self.nodes.iter().position(|n| *n == node)
    }

    /// Append a node. Returns false if it was already present.
    fn push(&mut self, node: DockingNode) -> bool {
        if self.index.insert(node) {
            self.nodes.push(node);
            true
        } else {
            false
        }
    }
}

/// Source of explicit docking dependencies.
pub trait DockingGraph {
    /// The widget face that `node` is docked to, if it is docked to another
    /// live widget. Scene docks have no dependency.
    fn dock_dependency(&self, node: DockingNode) -> Option<DockingNode>;
}

/// All direct dependencies of a node, intrinsic first.
fn dependencies<G: DockingGraph + ?Sized>(graph: &G, node: DockingNode) -> Vec<DockingNode> {
    node.intrinsic_dependency()
        .into_iter()
        .chain(graph.dock_dependency(node))
        .collect()
}

/// Does `from` depend, directly or transitively, on `to`?
pub fn depends_on<G: DockingGraph + ?Sized>(graph: &G, from: DockingNode, to: DockingNode) -> bool {
    let mut seen = HashSet::new();
    let mut pending = vec![from];
    while let Some(n) = pending.pop() {
        if n == to {
            return true;
        }
        if seen.insert(n) {
            pending.extend(dependencies(graph, n));
        }
    }
    false
}

/// The result of a solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveOutcome {
    /// Every node that sits on a dependency cycle.
    pub cyclic: BTreeSet<DockingNode>,
    /// The node at which each detected cycle closed, in detection order.
    pub cycles: Vec<DockingNode>,
    /// Nodes left out of the stack: cyclic ones and those depending on them.
    pub failed: BTreeSet<DockingNode>,
}

/// Builds a [`DockingStack`] from a [`DockingGraph`].
pub struct DockingSolver<'a, G: DockingGraph + ?Sized> {
    /// Link source.
    graph: &'a G,
    /// Output order.
    stack: &'a mut DockingStack,
    /// Nodes currently being added, outermost first.
    path: Vec<DockingNode>,
    /// Accumulated results.
    outcome: SolveOutcome,
}

impl<'a, G: DockingGraph + ?Sized> DockingSolver<'a, G> {
    /// A solver appending to `stack`.
    pub fn new(graph: &'a G, stack: &'a mut DockingStack) -> Self {
        Self {
            graph,
            stack,
            path: Vec::new(),
            outcome: SolveOutcome::default(),
        }
    }

    /// Add all four faces of a widget. Returns false if any face failed.
    pub fn add_docking_link(&mut self, widget: WidgetId) -> bool {
        Face::ALL.into_iter().fold(true, |ok, face| {
            self.add_docking_node(DockingNode::new(widget, face)) && ok
        })
    }

    /// Add one face after everything it depends on. Returns false if the face
    /// is on, or depends on, a cycle.
    pub fn add_docking_node(&mut self, node: DockingNode) -> bool {
        if self.stack.contains(node) {
            return true;
        }
        if self.outcome.failed.contains(&node) {
            return false;
        }
        if let Some(start) = self.path.iter().position(|n| *n == node) {
            self.outcome.cyclic.extend(self.path[start..].iter().copied());
            self.outcome.cycles.push(node);
            return false;
        }

        self.path.push(node);
        // Visit every dependency even after a failure, so that all cycles
        // reachable from here are recorded.
        let ok = dependencies(self.graph, node)
            .into_iter()
            .fold(true, |ok, dep| self.add_docking_node(dep) && ok);
        self.path.pop();

        if ok {
            self.stack.push(node);
        } else {
            self.outcome.failed.insert(node);
        }
        ok
    }

    /// Finish the solve. Failed nodes that reach themselves through a path
    /// the walk did not close are added to the cyclic set.
    pub fn finish(mut self) -> SolveOutcome {
        let unmarked: Vec<DockingNode> = self
            .outcome
            .failed
            .difference(&self.outcome.cyclic)
            .copied()
            .collect();
        for node in unmarked {
            let on_cycle = dependencies(self.graph, node)
                .into_iter()
                .any(|dep| depends_on(self.graph, dep, node));
            if on_cycle {
                self.outcome.cyclic.insert(node);
            }
        }
        self.outcome
    }
}
