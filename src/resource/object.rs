//! In-memory AtTask objects.

use indexmap::IndexMap;
use serde_json::Value;

use super::descriptor::ResourceDescriptor;
use crate::error::{AtTaskError, Result};

/// One AtTask object: recognized fields keyed by lower-cased name.
///
/// Local changes mark the object dirty. Nothing is ever written back to the
/// server.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObject {
    descriptor: &'static ResourceDescriptor,
    attrs: IndexMap<String, Value>,
    dirty: bool,
}

impl ResourceObject {
    /// Empty object of the given kind.
    pub fn new(descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            descriptor,
            attrs: IndexMap::new(),
            dirty: false,
        }
    }

    /// Object built from already filtered, lower-cased attributes.
    pub(crate) fn from_attrs(
        descriptor: &'static ResourceDescriptor,
        attrs: IndexMap<String, Value>,
    ) -> Self {
        Self {
            descriptor,
            attrs,
            dirty: false,
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// String value of a field (non-string values are not converted).
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    /// Set a field locally and mark the object dirty. Only lower-cased names
    /// of recognized fields are accepted.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        if !self.descriptor.accepts(key) {
            return Err(AtTaskError::UnknownField {
                obj_code: self.descriptor.obj_code,
                field: key.to_string(),
            });
        }

        self.attrs.insert(key.to_string(), value.into());
        self.dirty = true;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Whether local changes exist that the server has not seen.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Object ID, or an empty string if unset.
    pub fn id(&self) -> String {
        match self.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }
}

impl std::fmt::Display for ResourceObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.get("name") {
            match name {
                Value::String(s) => write!(f, "<{}: \"{}\">", self.descriptor.name, s),
                other => write!(f, "<{}: \"{}\">", self.descriptor.name, other),
            }
        } else if self.contains("id") {
            write!(f, "<{}: {}>", self.descriptor.name, self.id())
        } else {
            write!(f, "<{}: Uninitialized>", self.descriptor.name)
        }
    }
}
