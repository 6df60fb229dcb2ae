//! Directional navigation and tab order.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    core::{
        focus::FocusManager,
        id::{MAX_VIEWERS, ViewerIndex, WidgetId},
        resolve::PositionResolver,
        scene::Scene,
    },
    geom::{Face, Point, Rect},
};

/// Per-face navigation links of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationTargets {
    /// Links set explicitly. These win over automatic ones.
    forced: [Option<WidgetId>; 4],
    /// Links computed from sibling geometry.
    auto: [Option<WidgetId>; 4],
    /// Directions that swallow navigation when no target is found.
    null_override: [bool; 4],
}

impl NavigationTargets {
    /// The effective target in a direction: forced, else automatic.
    pub fn target(&self, face: Face) -> Option<WidgetId> {
        self.forced(face).or_else(|| self.auto(face))
    }

    /// The forced target in a direction.
    pub fn forced(&self, face: Face) -> Option<WidgetId> {
        self.forced[face.index()]
    }

    /// The automatic target in a direction.
    pub fn auto(&self, face: Face) -> Option<WidgetId> {
        self.auto[face.index()]
    }

    /// Does this direction swallow navigation with no target?
    pub fn is_null_override(&self, face: Face) -> bool {
        self.null_override[face.index()]
    }

    /// Set or clear the forced target.
    pub(crate) fn set_forced(&mut self, face: Face, target: Option<WidgetId>) {
        self.forced[face.index()] = target;
    }

    /// Set or clear the automatic target.
    pub(crate) fn set_auto(&mut self, face: Face, target: Option<WidgetId>) {
        self.auto[face.index()] = target;
    }

    /// Set the null override flag.
    pub(crate) fn set_null_override(&mut self, face: Face, enabled: bool) {
        self.null_override[face.index()] = enabled;
    }

    /// Drop every link to a removed widget.
    pub(crate) fn sever(&mut self, id: WidgetId) {
        for link in self.forced.iter_mut().chain(self.auto.iter_mut()) {
            if *link == Some(id) {
                *link = None;
            }
        }
    }
}

/// Recompute tab indices, per-viewer tab links and automatic directional
/// links for every container in the tree.
pub(crate) fn rebuild_links(scene: &mut Scene) {
    for id in scene.preorder(scene.root) {
        assign_tab_indices(scene, id);
        for v in 0..MAX_VIEWERS {
            link_tab_order(scene, id, v);
        }
        link_directions(scene, id);
    }
}

/// Children without an explicit index are numbered after the largest
/// explicit one, in child order.
fn assign_tab_indices(scene: &mut Scene, container: WidgetId) {
    let children = scene.widgets[container].children.clone();
    let mut next = children
        .iter()
        .filter_map(|c| scene.widgets[*c].tab_index)
        .max()
        .map_or(0, |m| m + 1);
    for c in children {
        let w = &mut scene.widgets[c];
        if w.tab_index.is_none() {
            w.auto_tab_index = next;
            next += 1;
        }
    }
}

/// Children that take input from a viewer, sorted by tab index. Ties keep
/// child order.
fn sorted_children(scene: &Scene, container: WidgetId, v: ViewerIndex) -> Vec<WidgetId> {
    let mut order: Vec<WidgetId> = scene.widgets[container]
        .children
        .iter()
        .copied()
        .filter(|c| scene.accepts_input(*c, v))
        .collect();
    order.sort_by_key(|c| scene.widgets[*c].tab_index());
    order
}

/// Thread one viewer's tab chain through a container's children.
fn link_tab_order(scene: &mut Scene, container: WidgetId, v: ViewerIndex) {
    let order = sorted_children(scene, container, v);
    let children = scene.widgets[container].children.clone();
    for c in &children {
        let p = &mut scene.widgets[*c].propagation[v];
        p.next = None;
        p.prev = None;
    }
    for pair in order.windows(2) {
        scene.widgets[pair[0]].propagation[v].next = Some(pair[1]);
        scene.widgets[pair[1]].propagation[v].prev = Some(pair[0]);
    }
    let p = &mut scene.widgets[container].propagation[v];
    p.first = order.first().copied();
    p.last = order.last().copied();
}

/// A container's children in one viewer's tab order, forward or reversed.
/// Follows the tab links when they exist, and sorts on the spot otherwise.
pub(crate) fn tab_order(
    scene: &Scene,
    container: WidgetId,
    v: ViewerIndex,
    forward: bool,
) -> Vec<WidgetId> {
    let Some(w) = scene.widgets.get(container) else {
        return Vec::new();
    };
    let link = w.propagation[v];
    let start = if forward { link.first } else { link.last };
    let Some(start) = start else {
        let mut order = sorted_children(scene, container, v);
        if !forward {
            order.reverse();
        }
        return order;
    };
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut cur = Some(start);
    while let Some(c) = cur {
        if !seen.insert(c) {
            break;
        }
        let Some(cw) = scene.widgets.get(c) else {
            break;
        };
        order.push(c);
        cur = if forward {
            cw.propagation[v].next
        } else {
            cw.propagation[v].prev
        };
    }
    order
}

/// Compute automatic directional links among a container's children.
fn link_directions(scene: &mut Scene, container: WidgetId) {
    let children = scene.widgets[container].children.clone();
    let mut rects = Vec::with_capacity(children.len());
    for c in &children {
        let rect = scene.pixel_rect(*c).unwrap_or_default();
        let w = &scene.widgets[*c];
        rects.push((*c, rect, w.visible && w.effective_mask != 0));
    }
    for (i, c) in children.iter().enumerate() {
        for face in Face::ALL {
            let nav = scene.widgets[*c].navigation;
            let auto = if nav.forced(face).is_some() || nav.is_null_override(face) {
                None
            } else {
                nearest(&rects, i, face)
            };
            scene.widgets[*c].navigation.set_auto(face, auto);
        }
    }
}

/// Is `to` on the `face` side of `from`?
fn in_direction(from: Point, to: Point, face: Face) -> bool {
    match face {
        Face::Left => to.x < from.x,
        Face::Right => to.x > from.x,
        Face::Top => to.y < from.y,
        Face::Bottom => to.y > from.y,
    }
}

/// The closest eligible sibling on a face's side, measured from that face to
/// the sibling's opposite face. Earlier siblings win ties.
fn nearest(rects: &[(WidgetId, Rect, bool)], i: usize, face: Face) -> Option<WidgetId> {
    let (_, from, _) = rects[i];
    let edge = from.segment(face);
    let center = from.center();
    let mut best: Option<(f32, WidgetId)> = None;
    for (j, (id, other, eligible)) in rects.iter().enumerate() {
        if j == i || !eligible || !in_direction(center, other.center(), face) {
            continue;
        }
        let d = edge.distance(&other.segment(face.opposite()));
        if best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, *id));
        }
    }
    best.map(|(_, id)| id)
}

/// Follow directional links from `sender`, skipping targets that cannot take
/// focus, until an eligible one turns up. Link cycles end the walk.
pub(crate) fn walk_direction(
    scene: &Scene,
    sender: WidgetId,
    face: Face,
    v: ViewerIndex,
) -> Option<WidgetId> {
    let mut seen = HashSet::from([sender]);
    let mut cur = sender;
    while let Some(t) = scene.widgets.get(cur).and_then(|w| w.navigation.target(face)) {
        if !scene.widgets.contains_key(t) || !seen.insert(t) {
            trace!(%face, "navigation walk ended on a cycle or stale link");
            return None;
        }
        if scene.can_accept_focus(t, v) {
            return Some(t);
        }
        cur = t;
    }
    None
}
