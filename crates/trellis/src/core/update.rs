//! The per-frame update pipeline.
//!
//! Work is requested by setting stage flags. [`Scene::update`] runs the
//! earliest dirty stage, then looks again, so a stage that dirties an earlier
//! one sends the pipeline back. Each stage runs at most twice per frame;
//! anything still dirty after that is left for the next frame.

use std::fmt;

use tracing::{debug, warn};

use crate::{
    core::{
        focus::FocusManager,
        id::{MAX_VIEWERS, viewer_bit},
        resolve::{PositionResolver, anchor_point},
        scene::Scene,
        style::StyleQuery,
    },
    error::Result,
    geom::{Orientation, Size, Transform},
};

/// Maximum runs of a single stage in one frame.
const MAX_STAGE_RUNS: usize = 2;

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Auto-size text widgets.
    Formatting,
    /// Resolve stale style references.
    Styles,
    /// Rebuild the docking stack.
    Docking,
    /// Recompute rotation transforms.
    Rotation,
    /// Resolve every face position.
    Positions,
    /// Recompute effective input masks.
    InputMasks,
    /// Rebuild tab order and directional links.
    Navigation,
    /// Recompute primitive usage.
    Primitives,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Self; 8] = [
        Self::Formatting,
        Self::Styles,
        Self::Docking,
        Self::Rotation,
        Self::Positions,
        Self::InputMasks,
        Self::Navigation,
        Self::Primitives,
    ];

    /// Position in the execution order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase stage name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Formatting => "formatting",
            Self::Styles => "styles",
            Self::Docking => "docking",
            Self::Rotation => "rotation",
            Self::Positions => "positions",
            Self::InputMasks => "input_masks",
            Self::Navigation => "navigation",
            Self::Primitives => "primitives",
        }
    }

    /// The flag bit for this stage.
    fn bit(self) -> u16 {
        1 << self.index()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of requested stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateFlags(u16);

impl UpdateFlags {
    /// No stages.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Every stage.
    pub fn all() -> Self {
        Self(Stage::ALL.iter().fold(0, |acc, s| acc | s.bit()))
    }

    /// Add a stage.
    pub fn request(&mut self, stage: Stage) {
        self.0 |= stage.bit();
    }

    /// Remove a stage.
    pub fn clear(&mut self, stage: Stage) {
        self.0 &= !stage.bit();
    }

    /// Is the stage requested?
    pub fn contains(&self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    /// Are no stages requested?
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Requested stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        Stage::ALL.into_iter().filter(|s| self.contains(*s)).collect()
    }
}

/// What one call to [`Scene::update`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Stages run, in order.
    pub stages: Vec<Stage>,
    /// This was the first update of the scene.
    pub first_frame: bool,
    /// Events handed to the activator.
    pub events_dispatched: usize,
    /// Docking cycles found by the docking stage.
    pub docking_cycles: usize,
    /// Faces whose resolved value moved.
    pub positions_moved: usize,
    /// Stages still dirty after their run limit, left for the next frame.
    pub deferred: UpdateFlags,
}

/// Run one frame.
pub(crate) fn run(scene: &mut Scene) -> Result<UpdateReport> {
    let mut report = UpdateReport {
        first_frame: !scene.initialized,
        ..UpdateReport::default()
    };
    if report.first_frame {
        prepare_first_frame(scene);
    }
    check_viewport(scene);
    let mut runs = [0usize; Stage::ALL.len()];
    run_stages(scene, &mut runs, &mut report)?;
    if report.first_frame {
        scene.initialized = true;
        if scene.config.initial_focus {
            initial_focus(scene)?;
            // Focus states dirty styles.
            run_stages(scene, &mut runs, &mut report)?;
        }
    }
    report.deferred = scene.flags;
    if !report.deferred.is_empty() {
        debug!(deferred = ?report.deferred.stages(), "stages deferred to next frame");
    }
    report.events_dispatched = scene.dispatch_events();
    Ok(report)
}

/// Run the earliest dirty stage until none is left under its run limit.
fn run_stages(
    scene: &mut Scene,
    runs: &mut [usize; Stage::ALL.len()],
    report: &mut UpdateReport,
) -> Result<()> {
    while let Some(stage) = Stage::ALL
        .into_iter()
        .find(|s| scene.flags.contains(*s) && runs[s.index()] < MAX_STAGE_RUNS)
    {
        scene.flags.clear(stage);
        runs[stage.index()] += 1;
        debug!(%stage, "running stage");
        run_stage(scene, stage, report)?;
        report.stages.push(stage);
    }
    Ok(())
}

/// Run a single stage.
fn run_stage(scene: &mut Scene, stage: Stage, report: &mut UpdateReport) -> Result<()> {
    match stage {
        Stage::Formatting => format_text(scene)?,
        Stage::Styles => resolve_styles(scene),
        Stage::Docking => report.docking_cycles += scene.rebuild_docking_stack(),
        Stage::Rotation => compute_transforms(scene)?,
        Stage::Positions => report.positions_moved += scene.resolve_positions(),
        Stage::InputMasks => propagate_input_masks(scene)?,
        Stage::Navigation => scene.rebuild_navigation_links(),
        Stage::Primitives => review_primitives(scene),
    }
    Ok(())
}

/// Compare the viewport with the metrics the cache was resolved against, and
/// re-resolve everything when it moved or changed size.
fn check_viewport(scene: &mut Scene) {
    let metrics = scene.viewport_metrics();
    if scene.last_viewport == Some(metrics) {
        return;
    }
    debug!(size = ?metrics.size, origin = ?metrics.origin, "viewport changed");
    scene.last_viewport = Some(metrics);
    scene.invalidate_all_positions();
}

/// First-frame setup: check the viewport, give widgets their default
/// states, pull bound values and bring ranged values into range.
fn prepare_first_frame(scene: &mut Scene) {
    if scene.viewport.is_none() {
        warn!("no viewport installed; resolving against a zero-sized viewport");
        debug_assert!(scene.viewport.is_some(), "scene updated without a viewport");
    }
    scene.initialize_default_states();
    let pulled = scene.refresh_bound_values();
    let mut clamped = 0;
    for w in scene.widgets.values_mut() {
        if w.kind.clamp() {
            clamped += 1;
        }
        w.format.stale = w.format.auto_size;
    }
    scene.flags = UpdateFlags::all();
    debug!(pulled, clamped, "prepared first frame");
}

/// Give each active viewer without focus its initial focus.
fn initial_focus(scene: &mut Scene) -> Result<()> {
    let root = scene.root;
    let viewers: Vec<_> = scene.config.active_viewer_indices().collect();
    for v in viewers {
        if !scene.is_focused(root, v) {
            let focused = scene.set_focus(root, None, v)?;
            debug!(viewer = v, focused, "initial focus");
        }
    }
    Ok(())
}

/// Size of a block of text in pixels, padded on every side.
pub fn measure_text(text: &str, glyph_width: f32, line_height: f32, padding: f32) -> Size {
    let lines = text.lines().count().max(1);
    let columns = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        columns as f32 * glyph_width + 2.0 * padding,
        lines as f32 * line_height + 2.0 * padding,
    )
}

/// Resize auto-sized text widgets.
fn format_text(scene: &mut Scene) -> Result<()> {
    let stale: Vec<_> = scene
        .widgets
        .iter()
        .filter(|(_, w)| w.format.auto_size && w.format.stale)
        .map(|(id, _)| id)
        .collect();
    let (glyph, line) = (scene.config.glyph_width, scene.config.line_height);
    for id in stale {
        let w = &mut scene.widgets[id];
        w.format.stale = false;
        let Some(text) = w.kind.text() else {
            continue;
        };
        let size = measure_text(text, glyph, line, w.format.padding);
        scene.set_extent(id, Orientation::Horizontal, size.w)?;
        scene.set_extent(id, Orientation::Vertical, size.h)?;
    }
    Ok(())
}

/// Re-resolve stale styles using the first active viewer that has a
/// current state.
fn resolve_styles(scene: &mut Scene) {
    let viewers: Vec<_> = scene.config.active_viewer_indices().collect();
    let mut resolved = 0;
    for (id, w) in &mut scene.widgets {
        if !w.style.stale {
            continue;
        }
        w.style.stale = false;
        let Some(reference) = w.style.reference.as_deref() else {
            w.style.handle = None;
            continue;
        };
        let (viewer, state) = viewers
            .iter()
            .find_map(|v| w.states.current(*v).map(|s| (*v, Some(s))))
            .unwrap_or((viewers.first().copied().unwrap_or(0), None));
        let query = StyleQuery {
            widget: id,
            kind: w.kind.name(),
            reference,
            state,
            viewer,
        };
        w.style.handle = scene.styles.as_ref().and_then(|s| s.resolve_style(&query));
        if w.style.handle.is_none() {
            debug!(widget = %w.name, reference, "unresolved style reference");
        }
        resolved += 1;
    }
    debug!(resolved, "resolved styles");
}

/// Cache a rotation transform for every rotated widget.
fn compute_transforms(scene: &mut Scene) -> Result<()> {
    let ids: Vec<_> = scene.widgets.keys().collect();
    let mut rotated = 0;
    for id in ids {
        let Some(rotation) = scene.widgets[id].rotation.filter(|r| r.degrees != 0.0) else {
            scene.widgets[id].transform = None;
            continue;
        };
        let rect = scene.pixel_rect(id)?;
        let pivot = anchor_point(&rect, rotation.anchor);
        scene.widgets[id].transform = Some(Transform::rotation(rotation.degrees, pivot));
        rotated += 1;
    }
    if rotated > 0 {
        scene.request_update(Stage::Primitives);
    }
    Ok(())
}

/// Combine each widget's mask with its ancestors', and take focus away from
/// viewers that lost input.
fn propagate_input_masks(scene: &mut Scene) -> Result<()> {
    let order = scene.preorder(scene.root);
    for id in &order {
        let parent_mask = scene.widgets[*id]
            .parent
            .and_then(|p| scene.widgets.get(p))
            .map_or(u8::MAX, |p| p.effective_mask);
        let w = &mut scene.widgets[*id];
        w.effective_mask = w.input_mask & parent_mask;
    }
    for id in order {
        for v in 0..MAX_VIEWERS {
            let w = &scene.widgets[id];
            if w.has_focus(v) && w.effective_mask & viewer_bit(v) == 0 {
                debug!(viewer = v, widget = %w.name, "input masked; killing focus");
                scene.kill_focus(id, None, v)?;
            }
        }
    }
    Ok(())
}

/// Note whether any displayed widget needs primitive rendering.
fn review_primitives(scene: &mut Scene) {
    let uses = scene
        .widgets
        .iter()
        .any(|(id, w)| (w.is_rotated() || w.kind.uses_primitives()) && scene.is_displayed(id));
    scene.uses_primitives = uses;
}
