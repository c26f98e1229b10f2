//! Declarative resource schemas and attribute validation.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::diag::Diagnostics;

/// Scalar type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
}

/// Value check applied to a configured attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// String length bounds, inclusive
    StringLength {
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },
    /// String must match a regular expression
    Regex {
        /// Pattern
        pattern: &'static str,
        /// Message shown on mismatch
        message: &'static str,
    },
    /// Integer bounds, inclusive
    IntBetween {
        /// Minimum value
        min: i64,
        /// Maximum value
        max: i64,
    },
    /// String must be one of the listed values
    StringInSlice {
        /// Accepted values
        values: &'static [&'static str],
    },
    /// Junos object name: letters, digits, `-` and `_`, bounded length
    NameObject {
        /// Maximum length
        max_len: usize,
    },
}

impl Validator {
    /// Check `value`, returning a message on failure
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::StringLength { min, max } => {
                let len = as_str(value)?.chars().count();
                if len < *min || len > *max {
                    return Err(format!(
                        "expected length to be in the range ({} - {}), got {}",
                        min, max, len
                    ));
                }
            }
            Validator::Regex { pattern, message } => {
                let re = compiled(pattern)?;
                if !re.is_match(as_str(value)?) {
                    return Err((*message).to_string());
                }
            }
            Validator::IntBetween { min, max } => {
                let n = as_int(value)?;
                if n < *min || n > *max {
                    return Err(format!(
                        "expected to be in the range ({} - {}), got {}",
                        min, max, n
                    ));
                }
            }
            Validator::StringInSlice { values } => {
                let s = as_str(value)?;
                if !values.iter().any(|v| *v == s) {
                    return Err(format!("expected to be one of {:?}, got {}", values, s));
                }
            }
            Validator::NameObject { max_len } => {
                let s = as_str(value)?;
                if s.is_empty() || s.chars().count() > *max_len {
                    return Err(format!(
                        "'{}' is an empty name or has more than {} characters",
                        s, max_len
                    ));
                }
                if let Some(bad) = s
                    .chars()
                    .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
                {
                    return Err(format!(
                        "character '{}' in '{}' is not permitted (letters, digits, '-' and '_' only)",
                        bad, s
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Compiled `Validator::Regex` patterns
static COMPILED_PATTERNS: Lazy<RwLock<HashMap<&'static str, Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn compiled(pattern: &'static str) -> Result<Regex, String> {
    if let Some(re) = COMPILED_PATTERNS.read().get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern).map_err(|e| e.to_string())?;
    COMPILED_PATTERNS.write().insert(pattern, re.clone());
    Ok(re)
}

/// Zero value of either scalar type, or null
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_i64() == Some(0),
        _ => false,
    }
}

fn as_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value))
}

fn as_int(value: &Value) -> Result<i64, String> {
    value
        .as_i64()
        .ok_or_else(|| format!("expected an integer, got {}", value))
}

/// Attribute of a resource schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Value type
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Must be configured
    pub required: bool,
    /// May be configured
    pub optional: bool,
    /// Changing it replaces the object
    pub force_new: bool,
    /// Value used when not configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Checks applied to configured values
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            required: false,
            optional: false,
            force_new: false,
            default: None,
            validators: Vec::new(),
        }
    }

    /// Required string attribute
    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::new(AttributeType::String)
        }
    }

    /// Optional string attribute
    pub fn optional_string() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::String)
        }
    }

    /// Optional integer attribute
    pub fn optional_int() -> Self {
        Self {
            optional: true,
            ..Self::new(AttributeType::Int)
        }
    }

    /// Mark as replacing the object when changed
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    /// Default value when not configured
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add a validator
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Schema of a resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Schema version
    pub version: u64,
    /// Attributes in declaration order
    pub attributes: IndexMap<String, Attribute>,
}

impl Schema {
    /// Empty schema at version 0
    pub fn v0() -> Self {
        Self {
            version: 0,
            attributes: IndexMap::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Fill unset (null or zero) attributes that carry a default
    pub fn apply_defaults(&self, values: &mut Map<String, Value>) {
        for (name, attr) in &self.attributes {
            if let Some(default) = &attr.default {
                if values.get(name).map_or(true, is_zero) {
                    values.insert(name.clone(), default.clone());
                }
            }
        }
    }

    /// Convert inputs to the attribute's scalar type.
    ///
    /// Strings of integer attributes (`"900"`) become numbers and numbers of
    /// string attributes (`22`) become their decimal text. Inputs from the
    /// command line are all strings; attribute files carry JSON numbers.
    pub fn coerce(&self, values: &mut Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        for (name, attr) in &self.attributes {
            match (attr.attr_type, values.get(name)) {
                (AttributeType::Int, Some(Value::String(s))) => match s.trim().parse::<i64>() {
                    Ok(n) => {
                        values.insert(name.clone(), Value::from(n));
                    }
                    Err(e) => diags.attribute_error(name, format!("expected an integer: {}", e)),
                },
                (AttributeType::String, Some(Value::Number(n))) => {
                    let text = n.to_string();
                    values.insert(name.clone(), Value::String(text));
                }
                _ => {}
            }
        }
        diags
    }

    /// Validate configured values; every problem becomes an error diagnostic.
    ///
    /// Null, `""` and `0` count as not configured.
    pub fn validate(&self, values: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for key in values.keys() {
            if !self.attributes.contains_key(key) {
                diags.attribute_error(key, "unsupported argument");
            }
        }

        for (name, attr) in &self.attributes {
            let value = values.get(name).filter(|v| !is_zero(v));
            match value {
                None if attr.required => {
                    diags.attribute_error(name, "the argument is required");
                }
                None => {}
                Some(v) => {
                    let type_ok = match attr.attr_type {
                        AttributeType::String => v.is_string(),
                        AttributeType::Int => v.is_i64(),
                    };
                    if !type_ok {
                        diags.attribute_error(
                            name,
                            format!("expected {:?}, got {}", attr.attr_type, v),
                        );
                        continue;
                    }
                    for validator in &attr.validators {
                        if let Err(message) = validator.check(v) {
                            diags.attribute_error(name, message);
                        }
                    }
                }
            }
        }

        diags
    }
}
