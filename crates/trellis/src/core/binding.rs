use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A reference to a field in an external data store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    /// Data store name.
    pub source: String,
    /// Field within the store.
    pub field: String,
}

impl Binding {
    /// Construct a binding.
    pub fn new(source: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            field: field.into(),
        }
    }

    /// Parse `<source:field>` markup.
    pub fn parse(markup: &str) -> Result<Self> {
        let inner = markup
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| Error::Config(format!("binding markup must be <source:field>: {markup}")))?;
        match inner.split_once(':') {
            Some((source, field)) if !source.is_empty() && !field.is_empty() => {
                Ok(Self::new(source, field))
            }
            _ => Err(Error::Config(format!("malformed binding: {markup}"))),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.source, self.field)
    }
}

/// A value exchanged with a data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Numeric value.
    Num(f32),
    /// String value.
    Str(String),
}

impl DataValue {
    /// The value as a number. Strings are parsed.
    pub fn as_num(&self) -> Option<f32> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    /// The value as a string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

/// An external store of bound values.
pub trait DataSource {
    /// Read a bound value.
    fn bound_value(&self, binding: &Binding) -> Option<DataValue>;

    /// Write a bound value. Returns false if the store rejected it.
    fn set_bound_value(&mut self, binding: &Binding, value: DataValue) -> bool;
}
