use std::{fmt, result::Result as StdResult, str::FromStr};

use convert_case::{Case, Casing};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{error, error::Result};

/// Return true if the character is valid in a widget name.
pub fn valid_name_char(c: char) -> bool {
    (c.is_ascii_lowercase() || c.is_ascii_digit()) || c == '_'
}

/// Return true if the full name is valid.
pub fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(valid_name_char)
}

/// A widget name, which consists of lowercase ASCII alphanumeric characters,
/// plus underscores. Names are unique within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetName {
    /// Stored name string.
    name: String,
}

impl FromStr for WidgetName {
    type Err = error::Error;
    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl WidgetName {
    /// Create a new name, returning an error if the string contains invalid
    /// characters.
    fn new(name: &str) -> Result<Self> {
        if !valid_name(name) {
            return Err(error::Error::InvalidName(name.into()));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Takes a string and munges it into a valid name. It does this by first
    /// converting the string to snake case, then removing all invalid
    /// characters.
    pub fn convert(name: &str) -> Self {
        let raw = name.to_case(Case::Snake);
        let filtered: String = raw.chars().filter(|x| valid_name_char(*x)).collect();
        let name = if filtered.is_empty() {
            "widget".to_string()
        } else {
            filtered
        };
        Self { name }
    }

    /// The name with a numeric suffix appended.
    pub fn with_suffix(&self, n: usize) -> Self {
        Self {
            name: format!("{}_{n}", self.name),
        }
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq<&str> for WidgetName {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl PartialEq<String> for WidgetName {
    fn eq(&self, other: &String) -> bool {
        self.name == *other
    }
}

/// Converts a string into the standard name format, and errors if it doesn't
/// comply.
impl TryFrom<&str> for WidgetName {
    type Error = error::Error;
    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl Serialize for WidgetName {
    fn serialize<S: Serializer>(&self, s: S) -> StdResult<S::Ok, S::Error> {
        s.serialize_str(&self.name)
    }
}

/// Names in templates are munged rather than rejected.
impl<'de> Deserialize<'de> for WidgetName {
    fn deserialize<D: Deserializer<'de>>(d: D) -> StdResult<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Self::convert(&raw))
    }
}
