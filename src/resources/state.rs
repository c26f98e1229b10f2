//! Provider-side resource state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// State of one managed object: an id (empty once the object is gone) plus
/// attribute values keyed by schema name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Object id, empty when the object does not exist
    pub id: String,
    /// Attribute values
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ResourceData {
    /// State with no id holding the given attributes
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes,
        }
    }

    /// State for an existing object known only by id.
    ///
    /// The id is the object name, so `name` is seeded with it.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut attributes = Map::new();
        attributes.insert("name".to_string(), Value::String(id.clone()));
        Self { id, attributes }
    }

    /// Object id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the id; an empty id marks the object gone
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Whether the object is gone
    pub fn is_gone(&self) -> bool {
        self.id.is_empty()
    }

    /// String attribute, empty when unset
    pub fn get_str(&self, key: &str) -> &str {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Integer attribute, zero when unset
    pub fn get_int(&self, key: &str) -> Result<i64> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(0),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| Error::validation(key, format!("expected an integer, got {}", v))),
        }
    }

    /// Write a value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| Error::state_write(key, e.to_string()))?;
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }
}
