//! Face position resolution.
//!
//! Resolved faces are cached in each widget's [`RenderBounds`] in absolute
//! viewport pixels. Reads resolve lazily and recursively through docking
//! targets and reference frames; writes invalidate exactly the faces that
//! depend on the changed one. A full pass walks the docking stack so that
//! docking targets are normally resolved before the faces docked to them.
//!
//! [`RenderBounds`]: crate::core::position::RenderBounds

use std::{collections::HashSet, mem};

use tracing::{debug, trace};

use crate::{
    core::{
        coords::{
            Frame, PaddingBase, PaddingFrames, PositionBase, Reference, approx_eq,
            from_absolute, from_pixel_extent, padding_to_pixels, to_absolute, to_pixel_extent,
        },
        docking::{DockTarget, DockingNode},
        id::WidgetId,
        position::FaceValue,
        scene::Scene,
        update::Stage,
    },
    error::Result,
    geom::{Face, Orientation, Point, Rect},
};

/// Position queries and updates on a scene.
///
/// Public positions are absolute: a value in a base is measured from that
/// base's frame origin, for far faces as well as near ones.
pub trait PositionResolver {
    /// A face's position in absolute viewport pixels.
    fn pixel_position(&mut self, widget: WidgetId, face: Face) -> Result<f32>;

    /// A face's position expressed in `base`.
    fn get_position(&mut self, widget: WidgetId, face: Face, base: PositionBase) -> Result<f32>;

    /// Move a face to `value`, given in `base`. The face keeps its declared
    /// base. Returns true if the stored value changed.
    fn set_position(
        &mut self,
        widget: WidgetId,
        face: Face,
        value: f32,
        base: PositionBase,
    ) -> Result<bool>;

    /// Set all four faces, given as `[left, top, right, bottom]` in `base`.
    /// With `clamp`, inverted pairs are swapped first.
    fn set_bounds(
        &mut self,
        widget: WidgetId,
        faces: [f32; 4],
        base: PositionBase,
        clamp: bool,
    ) -> Result<bool>;

    /// Change a face's declared base, keeping its resolved position.
    fn set_position_base(&mut self, widget: WidgetId, face: Face, base: PositionBase)
    -> Result<()>;

    /// Set the pixel distance from a widget's near face to its far face along
    /// an orientation. Returns true if the stored value changed.
    fn set_extent(
        &mut self,
        widget: WidgetId,
        orientation: Orientation,
        pixels: f32,
    ) -> Result<bool>;

    /// The widget's resolved faces in viewport pixels.
    fn pixel_rect(&mut self, widget: WidgetId) -> Result<Rect>;

    /// The widget's resolved faces in screen coordinates.
    fn screen_rect(&mut self, widget: WidgetId) -> Result<Rect>;

    /// Mark a face and everything depending on it stale. Returns the number
    /// of faces that went from current to stale.
    fn invalidate_position_dependencies(&mut self, widget: WidgetId, face: Face) -> usize;

    /// Mark every face stale.
    fn invalidate_all_positions(&mut self);

    /// Resolve every face in the tree. Returns the number of faces whose
    /// value moved.
    fn resolve_positions(&mut self) -> usize;

    /// Is the face's cached value current?
    fn is_position_resolved(&self, widget: WidgetId, face: Face) -> bool;
}

impl PositionResolver for Scene {
    fn pixel_position(&mut self, widget: WidgetId, face: Face) -> Result<f32> {
        self.widget(widget)?;
        Ok(resolve_face(self, DockingNode::new(widget, face)))
    }

    fn get_position(&mut self, widget: WidgetId, face: Face, base: PositionBase) -> Result<f32> {
        let pixels = self.pixel_position(widget, face)?;
        let r = reference(self, widget, base.frame(), face.orientation());
        Ok(from_absolute(pixels, base, r))
    }

    fn set_position(
        &mut self,
        widget: WidgetId,
        face: Face,
        value: f32,
        base: PositionBase,
    ) -> Result<bool> {
        self.widget(widget)?;
        let o = face.orientation();
        let absolute = to_absolute(value, base, reference(self, widget, base.frame(), o));
        let declared = self.widgets[widget].position.base(face);
        let stored = stored_value(self, DockingNode::new(widget, face), absolute, declared);
        let slot = self.widgets[widget].position.get_mut(face);
        let moved = !approx_eq(slot.value, stored, self.config.epsilon);
        slot.value = stored;
        if !moved {
            return Ok(false);
        }
        self.invalidate_position_dependencies(widget, face);
        self.request_update(Stage::Positions);
        Ok(true)
    }

    fn set_bounds(
        &mut self,
        widget: WidgetId,
        faces: [f32; 4],
        base: PositionBase,
        clamp: bool,
    ) -> Result<bool> {
        let [mut l, mut t, mut r, mut b] = faces;
        if clamp {
            if r < l {
                mem::swap(&mut l, &mut r);
            }
            if b < t {
                mem::swap(&mut t, &mut b);
            }
        }
        let mut changed = false;
        for (face, v) in [(Face::Left, l), (Face::Top, t), (Face::Right, r), (Face::Bottom, b)] {
            changed |= self.set_position(widget, face, v, base)?;
        }
        Ok(changed)
    }

    fn set_position_base(
        &mut self,
        widget: WidgetId,
        face: Face,
        base: PositionBase,
    ) -> Result<()> {
        let absolute = self.pixel_position(widget, face)?;
        let node = DockingNode::new(widget, face);
        let stored = stored_value(self, node, absolute, base);
        *self.widgets[widget].position.get_mut(face) = FaceValue::new(stored, base);
        self.invalidate_position_dependencies(widget, face);
        self.request_update(Stage::Positions);
        Ok(())
    }

    fn set_extent(
        &mut self,
        widget: WidgetId,
        orientation: Orientation,
        pixels: f32,
    ) -> Result<bool> {
        self.widget(widget)?;
        let face = orientation.far();
        let base = self.widgets[widget].position.base(face);
        let r = reference(self, widget, base.frame(), orientation);
        let stored = from_pixel_extent(pixels, base, r);
        let slot = self.widgets[widget].position.get_mut(face);
        let moved = !approx_eq(slot.value, stored, self.config.epsilon);
        slot.value = stored;
        if !moved {
            return Ok(false);
        }
        self.invalidate_position_dependencies(widget, face);
        self.request_update(Stage::Positions);
        Ok(true)
    }

    fn pixel_rect(&mut self, widget: WidgetId) -> Result<Rect> {
        self.widget(widget)?;
        let mut faces = [0.0; 4];
        for face in Face::ALL {
            faces[face.index()] = resolve_face(self, DockingNode::new(widget, face));
        }
        Ok(Rect::from_faces(faces))
    }

    fn screen_rect(&mut self, widget: WidgetId) -> Result<Rect> {
        let origin = self.viewport_metrics().origin;
        Ok(self.pixel_rect(widget)?.offset(origin))
    }

    fn invalidate_position_dependencies(&mut self, widget: WidgetId, face: Face) -> usize {
        let mut seen = HashSet::new();
        let mut pending = vec![DockingNode::new(widget, face)];
        let mut count = 0;
        while let Some(node) = pending.pop() {
            if !seen.insert(node) {
                continue;
            }
            let Some(w) = self.widgets.get_mut(node.widget) else {
                continue;
            };
            if w.bounds.invalidate(node.face) {
                count += 1;
            }
            pending.extend(dependents(self, node));
        }
        trace!(count, "invalidated dependent faces");
        count
    }

    fn invalidate_all_positions(&mut self) {
        for w in self.widgets.values_mut() {
            w.bounds.invalidate_all();
        }
        self.request_update(Stage::Positions);
    }

    fn resolve_positions(&mut self) -> usize {
        let before: Vec<(WidgetId, Rect)> = self
            .widgets
            .iter()
            .map(|(id, w)| (id, w.bounds.rect()))
            .collect();
        for w in self.widgets.values_mut() {
            w.bounds.invalidate_all();
        }
        self.resolving.clear();
        let order = self.docking_stack.nodes().to_vec();
        for node in order {
            if self.widgets.contains_key(node.widget) {
                resolve_face(self, node);
            }
        }
        for id in self.preorder(self.root) {
            for face in Face::ALL {
                resolve_face(self, DockingNode::new(id, face));
            }
        }
        let eps = self.config.epsilon;
        let moved = before
            .into_iter()
            .filter_map(|(id, old)| self.widgets.get(id).map(|w| (old, w.bounds.rect())))
            .map(|(old, new)| {
                Face::ALL
                    .iter()
                    .filter(|f| !approx_eq(old.face(**f), new.face(**f), eps))
                    .count()
            })
            .sum();
        debug!(moved, "resolved positions");
        moved
    }

    fn is_position_resolved(&self, widget: WidgetId, face: Face) -> bool {
        self.widgets
            .get(widget)
            .is_some_and(|w| w.bounds.is_resolved(face))
    }
}

/// Cached resolution. A face already being resolved further up the call
/// stack yields its last known value.
fn resolve_face(scene: &mut Scene, node: DockingNode) -> f32 {
    let Some(w) = scene.widgets.get(node.widget) else {
        return 0.0;
    };
    let last = w.bounds.value(node.face);
    if w.bounds.is_resolved(node.face) {
        return last;
    }
    if !scene.resolving.insert(node) {
        trace!(face = %node.face, "re-entrant resolution, using last known value");
        return last;
    }
    let value = compute_face(scene, node);
    scene.resolving.remove(&node);
    store_resolved(scene, node, value);
    value
}

/// Compute a face from its docking link or its stored value.
fn compute_face(scene: &mut Scene, node: DockingNode) -> f32 {
    let w = &scene.widgets[node.widget];
    let stored = w.position.get(node.face);
    let link = w.docking.get(node.face).copied();
    if let Some(link) = link.filter(|_| !scene.cyclic.contains(&node))
        && let Some(value) = docked_value(scene, node, &link)
    {
        let kept = stored_value(scene, node, value, stored.base);
        scene.widgets[node.widget].position.get_mut(node.face).value = kept;
        return value;
    }
    let o = node.face.orientation();
    let r = reference(scene, node.widget, stored.base.frame(), o);
    if node.face.is_near() {
        to_absolute(stored.value, stored.base, r)
    } else {
        let near = resolve_face(scene, DockingNode::new(node.widget, o.near()));
        near + to_pixel_extent(stored.value, stored.base, r)
    }
}

/// The target face's position plus padding, if the target is live.
fn docked_value(scene: &mut Scene, node: DockingNode, link: &DockTarget) -> Option<f32> {
    let target = link.target.unwrap_or(scene.root);
    if !scene.widgets.contains_key(target) {
        return None;
    }
    let anchor = resolve_face(scene, DockingNode::new(target, link.face));
    let o = node.face.orientation();
    let mut frames = PaddingFrames {
        scale: scene.viewport_metrics().scale,
        ..PaddingFrames::default()
    };
    match link.padding.base {
        PaddingBase::PercentageOwner => {
            frames.owner = reference(scene, node.widget, Frame::Owner, o).extent;
        }
        PaddingBase::PercentageScene => {
            frames.scene = reference(scene, node.widget, Frame::Scene, o).extent;
        }
        PaddingBase::PercentageViewport => {
            frames.viewport = scene.viewport_metrics().size.along(o);
        }
        PaddingBase::PercentageTarget => frames.target = widget_reference(scene, target, o).extent,
        PaddingBase::Pixels | PaddingBase::ScaledPixels => {}
    }
    Some(anchor + padding_to_pixels(link.padding.value, link.padding.base, frames))
}

/// Express an absolute pixel position as a face's stored value in `base`.
/// Far faces store the extent from their own near face.
fn stored_value(scene: &mut Scene, node: DockingNode, absolute: f32, base: PositionBase) -> f32 {
    let o = node.face.orientation();
    let r = reference(scene, node.widget, base.frame(), o);
    if node.face.is_near() {
        from_absolute(absolute, base, r)
    } else {
        let near = resolve_face(scene, DockingNode::new(node.widget, o.near()));
        from_pixel_extent(absolute - near, base, r)
    }
}

/// Cache a resolved value, requesting the stages that depend on geometry
/// when it moves.
fn store_resolved(scene: &mut Scene, node: DockingNode, value: f32) {
    let eps = scene.config.epsilon;
    let w = &mut scene.widgets[node.widget];
    let prev = w.bounds.set(node.face, value);
    if !approx_eq(prev, value, eps) {
        let rotated = w.is_rotated();
        scene.request_update(Stage::Navigation);
        if rotated {
            scene.request_update(Stage::Rotation);
        }
    }
}

/// A widget's own resolved span along an orientation.
fn widget_reference(scene: &mut Scene, id: WidgetId, o: Orientation) -> Reference {
    let near = resolve_face(scene, DockingNode::new(id, o.near()));
    let far = resolve_face(scene, DockingNode::new(id, o.far()));
    Reference::new(near, far - near)
}

/// The span of a frame along an orientation, as seen from a widget.
fn reference(scene: &mut Scene, widget: WidgetId, frame: Frame, o: Orientation) -> Reference {
    let viewport = Reference::new(0.0, scene.viewport_metrics().size.along(o));
    let root = scene.root;
    match frame {
        Frame::Viewport => viewport,
        Frame::Scene | Frame::Owner if widget == root => viewport,
        Frame::Scene => widget_reference(scene, root, o),
        Frame::Owner => {
            let owner = scene.widgets.get(widget).and_then(|w| w.parent).unwrap_or(root);
            widget_reference(scene, owner, o)
        }
    }
}

/// Faces whose value depends directly on `node`.
fn dependents(scene: &Scene, node: DockingNode) -> Vec<DockingNode> {
    let mut out = Vec::new();
    let Some(w) = scene.widgets.get(node.widget) else {
        return out;
    };
    let o = node.face.orientation();
    let near = node.face.is_near();
    if near {
        out.push(DockingNode::new(node.widget, o.far()));
    }
    for c in &w.children {
        let Some(cw) = scene.widgets.get(*c) else {
            continue;
        };
        let near_base = cw.position.base(o.near());
        let owner_near = if near {
            near_base.frame() == Frame::Owner
        } else {
            near_base == PositionBase::PercentageOwner
        };
        if owner_near {
            out.push(DockingNode::new(*c, o.near()));
        }
        if cw.position.base(o.far()) == PositionBase::PercentageOwner {
            out.push(DockingNode::new(*c, o.far()));
        }
        for (f, link) in cw.docking.iter() {
            if f.orientation() == o && link.padding.base == PaddingBase::PercentageOwner {
                out.push(DockingNode::new(*c, f));
            }
        }
    }
    if node.widget == scene.root {
        for (id, x) in &scene.widgets {
            if id == scene.root {
                continue;
            }
            for f in [o.near(), o.far()] {
                let b = x.position.base(f);
                let scene_based = if f.is_near() {
                    b.frame() == Frame::Scene
                } else {
                    b == PositionBase::PercentageScene
                };
                let scene_padding = x
                    .docking
                    .get(f)
                    .is_some_and(|l| l.padding.base == PaddingBase::PercentageScene);
                if scene_based || scene_padding {
                    out.push(DockingNode::new(id, f));
                }
            }
        }
    }
    for docked in scene.docked.docked_to(node.widget) {
        let Some(link) = scene
            .widgets
            .get(docked.widget)
            .and_then(|x| x.docking.get(docked.face))
        else {
            continue;
        };
        let by_face = link.face == node.face;
        let by_extent =
            docked.face.orientation() == o && link.padding.base == PaddingBase::PercentageTarget;
        if by_face || by_extent {
            out.push(docked);
        }
    }
    out
}

/// A rectangle's corner anchor point, as fractions of its extent.
pub(crate) fn anchor_point(rect: &Rect, anchor: Point) -> Point {
    Point::new(
        rect.left + rect.width() * anchor.x,
        rect.top + rect.height() * anchor.y,
    )
}
