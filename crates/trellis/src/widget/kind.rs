use std::mem;

use serde::{Deserialize, Serialize};

use crate::core::{binding::DataValue, state::StateKind};

/// The closed set of widget kinds, each with its own payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetKind {
    /// The root of a widget tree. Only the scene itself creates one.
    Scene,
    /// A plain container.
    Panel,
    /// A pressable button.
    Button {
        /// Button caption.
        #[serde(default)]
        caption: String,
    },
    /// Static text.
    Label {
        /// Displayed text.
        #[serde(default)]
        text: String,
    },
    /// A numeric value within a range.
    Slider {
        /// Current value.
        #[serde(default)]
        value: f32,
        /// Lower bound.
        #[serde(default)]
        min: f32,
        /// Upper bound.
        #[serde(default = "one")]
        max: f32,
    },
    /// A list of selectable items.
    List {
        /// Items.
        #[serde(default)]
        items: Vec<String>,
        /// Selected index.
        #[serde(default)]
        selected: Option<usize>,
    },
    /// Editable single-line text.
    EditBox {
        /// Current text.
        #[serde(default)]
        text: String,
        /// Maximum number of characters, if limited.
        #[serde(default)]
        max_len: Option<usize>,
    },
    /// A scroll position within a range.
    Scrollbar {
        /// Scroll position.
        #[serde(default)]
        position: f32,
        /// Maximum scroll position.
        #[serde(default)]
        range: f32,
    },
    /// A picture.
    Image {
        /// Drawn through rotated primitives rather than screen-aligned quads.
        #[serde(default)]
        uses_primitives: bool,
    },
}

/// Serde default for a slider's maximum.
fn one() -> f32 {
    1.0
}

/// States every kind supports.
const BASE_STATES: &[StateKind] = &[StateKind::Enabled, StateKind::Disabled, StateKind::Focused];

/// States supported by interactive kinds.
const INTERACTIVE_STATES: &[StateKind] = &[
    StateKind::Enabled,
    StateKind::Disabled,
    StateKind::Focused,
    StateKind::Active,
    StateKind::Pressed,
];

impl WidgetKind {
    /// Lowercase kind name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Panel => "panel",
            Self::Button { .. } => "button",
            Self::Label { .. } => "label",
            Self::Slider { .. } => "slider",
            Self::List { .. } => "list",
            Self::EditBox { .. } => "edit_box",
            Self::Scrollbar { .. } => "scrollbar",
            Self::Image { .. } => "image",
        }
    }

    /// States a widget of this kind supports by default.
    pub fn default_states(&self) -> &'static [StateKind] {
        match self {
            Self::Button { .. }
            | Self::Slider { .. }
            | Self::List { .. }
            | Self::EditBox { .. }
            | Self::Scrollbar { .. } => INTERACTIVE_STATES,
            Self::Scene | Self::Panel | Self::Label { .. } | Self::Image { .. } => BASE_STATES,
        }
    }

    /// Does this kind take focus only through its children by default?
    pub fn suppresses_focus(&self) -> bool {
        matches!(
            self,
            Self::Scene | Self::Panel | Self::Label { .. } | Self::Image { .. }
        )
    }

    /// Text shown by the widget, used for auto-sizing.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Button { caption } => Some(caption),
            Self::Label { text } | Self::EditBox { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Replace the displayed text. Returns false for kinds without text.
    pub fn set_text(&mut self, new: &str) -> bool {
        match self {
            Self::Button { caption } => new.clone_into(caption),
            Self::Label { text } => new.clone_into(text),
            Self::EditBox { text, max_len } => {
                *text = match max_len {
                    Some(n) => new.chars().take(*n).collect(),
                    None => new.to_string(),
                };
            }
            _ => return false,
        }
        true
    }

    /// The widget's value, for kinds that publish one.
    pub fn value(&self) -> Option<DataValue> {
        match self {
            Self::Slider { value, .. } => Some(DataValue::Num(*value)),
            Self::Scrollbar { position, .. } => Some(DataValue::Num(*position)),
            Self::List { selected, .. } => selected.map(|s| DataValue::Num(s as f32)),
            Self::Label { text } | Self::EditBox { text, .. } => Some(DataValue::Str(text.clone())),
            Self::Button { caption } => Some(DataValue::Str(caption.clone())),
            Self::Scene | Self::Panel | Self::Image { .. } => None,
        }
    }

    /// Apply a value from a data store. Returns true if the widget changed.
    pub fn apply_value(&mut self, v: &DataValue) -> bool {
        let before = self.clone();
        match self {
            Self::Slider { value, .. } => {
                if let Some(n) = v.as_num() {
                    *value = n;
                }
            }
            Self::Scrollbar { position, .. } => {
                if let Some(n) = v.as_num() {
                    *position = n;
                }
            }
            Self::List { selected, .. } => {
                if let Some(n) = v.as_num().filter(|n| *n >= 0.0) {
                    *selected = Some(n as usize);
                }
            }
            Self::Label { .. } | Self::EditBox { .. } | Self::Button { .. } => {
                self.set_text(&v.as_string());
            }
            Self::Scene | Self::Panel | Self::Image { .. } => {}
        }
        self.clamp();
        *self != before
    }

    /// Bring range-limited values back in range. Returns true if anything
    /// changed.
    pub fn clamp(&mut self) -> bool {
        match self {
            Self::Slider { value, min, max } => {
                if *max < *min {
                    mem::swap(min, max);
                }
                clamp_into(value, *min, *max)
            }
            Self::Scrollbar { position, range } => clamp_into(position, 0.0, range.max(0.0)),
            Self::List { items, selected } => match *selected {
                Some(_) if items.is_empty() => {
                    *selected = None;
                    true
                }
                Some(s) if s >= items.len() => {
                    *selected = Some(items.len() - 1);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Is this an image drawn with primitives?
    pub fn uses_primitives(&self) -> bool {
        matches!(
            self,
            Self::Image {
                uses_primitives: true
            }
        )
    }
}

/// Clamp a value in place. Returns true if it moved.
fn clamp_into(v: &mut f32, lo: f32, hi: f32) -> bool {
    let c = v.clamp(lo, hi);
    let moved = c != *v;
    *v = c;
    moved
}
