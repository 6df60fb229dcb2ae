//! Declarative widget descriptions.
//!
//! A [`WidgetTemplate`] describes a widget and its subtree. Templates are
//! built in code with the chained setters, or deserialized from JSON.
//! Docking and navigation links name their targets, and are connected after
//! the whole subtree exists.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    core::{
        binding::Binding,
        coords::PositionBase,
        docking::DockPadding,
        name::WidgetName,
        position::{FaceValue, Position},
    },
    error::Result,
    geom::{Face, Point},
    widget::{kind::WidgetKind, Rotation},
};

/// Serialize faces by name.
mod face_name {
    use super::{Deserialize, Deserializer, Face, Serializer};

    /// Write a face as its lowercase name.
    pub(super) fn serialize<S: Serializer>(face: &Face, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(face.name())
    }

    /// Read a face name.
    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Face, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A docking link by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockSpec {
    /// Docked face of this widget.
    #[serde(with = "face_name")]
    pub face: Face,
    /// Target widget name. Absent docks to the scene.
    #[serde(default)]
    pub target: Option<WidgetName>,
    /// Face of the target.
    #[serde(with = "face_name")]
    pub target_face: Face,
    /// Padding added to the target face.
    #[serde(default)]
    pub padding: DockPadding,
}

/// A forced navigation link by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavSpec {
    /// Navigation direction.
    #[serde(with = "face_name")]
    pub face: Face,
    /// Target widget name.
    #[serde(default)]
    pub target: Option<WidgetName>,
    /// Swallow navigation in this direction when no target is found.
    #[serde(default)]
    pub null_override: bool,
}

/// Serde default for visibility.
fn visible() -> bool {
    true
}

/// A widget and its subtree, ready to instantiate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetTemplate {
    /// Requested name. A numeric suffix is added if it is taken.
    pub name: WidgetName,
    /// Kind and payload.
    pub kind: WidgetKind,
    /// Stored faces.
    #[serde(default)]
    pub position: Position,
    /// Docking links.
    #[serde(default)]
    pub docking: Vec<DockSpec>,
    /// Forced navigation links.
    #[serde(default)]
    pub navigation: Vec<NavSpec>,
    /// Explicit tab index.
    #[serde(default)]
    pub tab_index: Option<i32>,
    /// Initial visibility.
    #[serde(default = "visible")]
    pub visible: bool,
    /// Viewer input mask. Defaults to every viewer.
    #[serde(default)]
    pub input_mask: Option<u8>,
    /// Override the kind's focus suppression.
    #[serde(default)]
    pub suppress_focus: Option<bool>,
    /// Refuse to give up focus.
    #[serde(default)]
    pub focus_lock: bool,
    /// Style reference.
    #[serde(default)]
    pub style: Option<String>,
    /// Data binding.
    #[serde(default)]
    pub binding: Option<Binding>,
    /// Rotation about an anchor.
    #[serde(default)]
    pub rotation: Option<Rotation>,
    /// Size far faces from the widget's text.
    #[serde(default)]
    pub auto_size: bool,
    /// Padding around auto-sized text, in pixels.
    #[serde(default)]
    pub text_padding: f32,
    /// Child templates in order.
    #[serde(default)]
    pub children: Vec<WidgetTemplate>,
}

impl WidgetTemplate {
    /// A template with defaults for everything but name and kind. The name is
    /// munged into a valid widget name.
    pub fn new(name: &str, kind: WidgetKind) -> Self {
        Self {
            name: WidgetName::convert(name),
            kind,
            position: Position::default(),
            docking: Vec::new(),
            navigation: Vec::new(),
            tab_index: None,
            visible: true,
            input_mask: None,
            suppress_focus: None,
            focus_lock: false,
            style: None,
            binding: None,
            rotation: None,
            auto_size: false,
            text_padding: 0.0,
            children: Vec::new(),
        }
    }

    /// Parse a template from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set all four stored faces in one base. `width` and `height` are the
    /// far-face extents.
    pub fn bounds(mut self, left: f32, top: f32, width: f32, height: f32, base: PositionBase) -> Self {
        self.position = Position::new(left, top, width, height, base);
        self
    }

    /// Set one stored face.
    pub fn face(mut self, face: Face, value: f32, base: PositionBase) -> Self {
        *self.position.get_mut(face) = FaceValue::new(value, base);
        self
    }

    /// Dock a face to a named widget, or to the scene when `target` is `None`.
    pub fn dock(mut self, face: Face, target: Option<&str>, target_face: Face, padding: DockPadding) -> Self {
        self.docking.retain(|d| d.face != face);
        self.docking.push(DockSpec {
            face,
            target: target.map(WidgetName::convert),
            target_face,
            padding,
        });
        self
    }

    /// Force a navigation link to a named widget.
    pub fn navigate(mut self, face: Face, target: &str) -> Self {
        self.navigation.retain(|n| n.face != face);
        self.navigation.push(NavSpec {
            face,
            target: Some(WidgetName::convert(target)),
            null_override: false,
        });
        self
    }

    /// Swallow navigation in a direction when no target is found.
    pub fn null_override(mut self, face: Face) -> Self {
        match self.navigation.iter_mut().find(|n| n.face == face) {
            Some(n) => n.null_override = true,
            None => self.navigation.push(NavSpec {
                face,
                target: None,
                null_override: true,
            }),
        }
        self
    }

    /// Set an explicit tab index.
    pub fn tab_index(mut self, index: i32) -> Self {
        self.tab_index = Some(index);
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Restrict input to a set of viewers.
    pub fn input_mask(mut self, mask: u8) -> Self {
        self.input_mask = Some(mask);
        self
    }

    /// Override focus suppression.
    pub fn suppress_focus(mut self, suppress: bool) -> Self {
        self.suppress_focus = Some(suppress);
        self
    }

    /// Refuse to give up focus.
    pub fn focus_lock(mut self) -> Self {
        self.focus_lock = true;
        self
    }

    /// Set a style reference.
    pub fn style(mut self, reference: &str) -> Self {
        self.style = Some(reference.to_string());
        self
    }

    /// Bind to a data store field.
    pub fn binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Rotate about an anchor given as fractions of the widget's own bounds.
    pub fn rotation(mut self, degrees: f32, anchor: Point) -> Self {
        self.rotation = Some(Rotation { degrees, anchor });
        self
    }

    /// Size the far faces from the text.
    pub fn auto_size(mut self, padding: f32) -> Self {
        self.auto_size = true;
        self.text_padding = padding;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Every template in this subtree, pre-order.
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let t = out[i];
            out.extend(t.children.iter());
            i += 1;
        }
        out
    }
}
