//! Configuration objects and their `set`/`delete` line mapping.
//!
//! A [`ConfigObject`] is a flat options struct for one Junos object type.
//! Its [`Field`] table lists the configurable attributes in declaration
//! order; the same table drives line synthesis, parsing of
//! `| display set relative` output and conversion to and from
//! [`ResourceData`].
//!
//! An empty string or a zero integer means "not requested": such fields are
//! neither emitted as `set` lines nor distinguishable from unset after a
//! read.

use crate::error::{Error, Result};
use crate::junos::{
    SystemInformation, CMD_SHOW_CONFIG, PIPE_DISPLAY_SET, PIPE_DISPLAY_SET_RELATIVE,
    SET_LINE_START, XML_END_TAG_CONFIG_OUT, XML_START_TAG_CONFIG_OUT,
};

use super::schema::Schema;
use super::state::ResourceData;

/// Getter and setter of one field
pub enum Accessor<T> {
    /// String field
    Str {
        /// Read the value
        get: fn(&T) -> String,
        /// Write the value
        set: fn(&mut T, String),
    },
    /// Integer field
    Int {
        /// Read the value
        get: fn(&T) -> i64,
        /// Write the value
        set: fn(&mut T, i64),
    },
}

/// One configurable attribute of an object
pub struct Field<T> {
    /// Schema attribute name (`destination_port`)
    pub attribute: &'static str,
    /// CLI token (`destination-port`)
    pub token: &'static str,
    /// Value is written inside double quotes
    pub quoted: bool,
    /// Access to the options struct
    pub accessor: Accessor<T>,
}

impl<T> Field<T> {
    /// String field
    pub const fn string(
        attribute: &'static str,
        token: &'static str,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    ) -> Self {
        Self {
            attribute,
            token,
            quoted: false,
            accessor: Accessor::Str { get, set },
        }
    }

    /// Integer field
    pub const fn int(
        attribute: &'static str,
        token: &'static str,
        get: fn(&T) -> i64,
        set: fn(&mut T, i64),
    ) -> Self {
        Self {
            attribute,
            token,
            quoted: false,
            accessor: Accessor::Int { get, set },
        }
    }

    /// Write the value inside double quotes
    pub const fn quoted(self) -> Self {
        Self {
            quoted: true,
            ..self
        }
    }

    /// `<token> <value>`, or `None` for a zero value
    fn render(&self, obj: &T) -> Option<String> {
        match self.accessor {
            Accessor::Str { get, .. } => {
                let value = get(obj);
                if value.is_empty() {
                    None
                } else if self.quoted {
                    Some(format!("{} \"{}\"", self.token, value))
                } else {
                    Some(format!("{} {}", self.token, value))
                }
            }
            Accessor::Int { get, .. } => match get(obj) {
                0 => None,
                n => Some(format!("{} {}", self.token, n)),
            },
        }
    }

    /// Store `value` read from `line`
    fn assign(&self, obj: &mut T, line: &str, value: &str) -> Result<()> {
        match self.accessor {
            Accessor::Str { set, .. } => {
                let value = if self.quoted {
                    value.trim_matches('"')
                } else {
                    value
                };
                set(obj, value.to_string());
            }
            Accessor::Int { set, .. } => {
                let n = value.parse::<i64>().map_err(|source| Error::IntConversion {
                    line: line.to_string(),
                    source,
                })?;
                set(obj, n);
            }
        }
        Ok(())
    }
}

/// A Junos configuration object type
pub trait ConfigObject: Default + Send + Sync + 'static {
    /// Resource type name (`junos_application`)
    const RESOURCE_TYPE: &'static str;

    /// Human description used in messages (`application`)
    const DESCRIPTION: &'static str;

    /// Configuration path before the object name (`applications application`)
    const PATH: &'static str;

    /// Configurable attributes in declaration order
    const FIELDS: &'static [Field<Self>];

    /// Object name, empty when the object was not found
    fn name(&self) -> &str;

    /// Set the object name
    fn set_name(&mut self, name: String);

    /// Declarative schema
    fn schema() -> Schema;

    /// Whether the platform supports this object type
    fn check_compatibility(_info: &SystemInformation) -> bool {
        true
    }
}

/// `set` lines creating `obj`
pub fn set_lines<T: ConfigObject>(obj: &T) -> Vec<String> {
    let prefix = format!("set {} {} ", T::PATH, obj.name());
    T::FIELDS
        .iter()
        .filter_map(|field| field.render(obj))
        .map(|item| format!("{}{}", prefix, item))
        .collect()
}

/// `delete` line removing `obj`
pub fn delete_lines<T: ConfigObject>(obj: &T) -> Vec<String> {
    vec![format!("delete {} {}", T::PATH, obj.name())]
}

/// `show configuration` command for the object called `name`
pub fn show_command<T: ConfigObject>(name: &str, relative: bool) -> String {
    let pipe = if relative {
        PIPE_DISPLAY_SET_RELATIVE
    } else {
        PIPE_DISPLAY_SET
    };
    format!("{}{} {}{}", CMD_SHOW_CONFIG, T::PATH, name, pipe)
}

/// Configuration statements inside the output wrapper
pub fn config_lines(output: &str) -> impl Iterator<Item = &str> {
    output
        .lines()
        .take_while(|line| !line.contains(XML_END_TAG_CONFIG_OUT))
        .filter(|line| !line.contains(XML_START_TAG_CONFIG_OUT))
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('<'))
}

/// Whether `show configuration` output holds any statement
pub fn has_config(output: &str) -> bool {
    config_lines(output).next().is_some()
}

/// Parse `| display set relative` output of the object called `name`.
///
/// Without any statement the result is the default object (empty name).
pub fn parse_relative<T: ConfigObject>(name: &str, output: &str) -> Result<T> {
    let mut obj = T::default();
    let mut lines = config_lines(output).peekable();
    if lines.peek().is_none() {
        return Ok(obj);
    }
    obj.set_name(name.to_string());

    for line in lines {
        let item = line.strip_prefix(SET_LINE_START).unwrap_or(line);
        let matched = T::FIELDS.iter().find_map(|field| {
            item.strip_prefix(field.token)
                .and_then(|rest| rest.strip_prefix(' '))
                .map(|value| (field, value))
        });
        if let Some((field, value)) = matched {
            field.assign(&mut obj, item, value)?;
        }
    }

    Ok(obj)
}

/// Build an object from desired state
pub fn from_state<T: ConfigObject>(data: &ResourceData) -> Result<T> {
    let mut obj = T::default();
    let name = match data.get_str("name") {
        "" => data.id(),
        name => name,
    };
    obj.set_name(name.to_string());

    for field in T::FIELDS {
        match field.accessor {
            Accessor::Str { set, .. } => set(&mut obj, data.get_str(field.attribute).to_string()),
            Accessor::Int { set, .. } => set(&mut obj, data.get_int(field.attribute)?),
        }
    }

    Ok(obj)
}

/// Write every attribute of `obj` into state
pub fn fill_state<T: ConfigObject>(data: &mut ResourceData, obj: &T) -> Result<()> {
    data.set("name", obj.name())?;
    for field in T::FIELDS {
        match field.accessor {
            Accessor::Str { get, .. } => data.set(field.attribute, get(obj))?,
            Accessor::Int { get, .. } => data.set(field.attribute, get(obj))?,
        }
    }
    Ok(())
}
