//! Description of the state a render entry point accepts

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Shape of the state value handed to a compiled template
///
/// `library` names the crate that defines the type; handlers add it to the
/// reference list. `properties` are the readable fields that become
/// parameters when the template is compiled without a parameter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateType {
    pub name: String,
    pub library: String,
    pub properties: Vec<String>,
}

impl StateType {
    pub fn new(name: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            library: library.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Derive the state type from a sample value
    ///
    /// Properties are the keys of the value's serialized form; a value that
    /// does not serialize to a map has none.
    ///
    /// # Errors
    ///
    /// Returns `StateSerialization` if `sample` cannot be serialized.
    pub fn of_value<T: Serialize>(sample: &T) -> Result<Self> {
        let path = std::any::type_name::<T>();
        let properties = match serde_json::to_value(sample)? {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            name: short_type_name(path),
            library: library_of(path).to_string(),
            properties,
        })
    }
}

/// Crate segment of a Rust type path; empty for primitives
fn library_of(path: &str) -> &str {
    let path = path.trim_start_matches(['&', '*']);
    let head = path.split(['<', '[', '(', ' ']).next().unwrap_or("");
    match head.split_once("::") {
        Some((krate, _)) => krate,
        None => "",
    }
}

/// Type path with every module prefix removed, generic arguments included:
/// `alloc::vec::Vec<app::Row>` becomes `Vec<Row>`
pub fn short_type_name(path: &str) -> String {
    let mut name = String::with_capacity(path.len());
    let mut ident_start = 0;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            name.truncate(ident_start);
        } else if c.is_alphanumeric() || c == '_' {
            name.push(c);
        } else {
            name.push(c);
            ident_start = name.len();
        }
    }

    name
}
