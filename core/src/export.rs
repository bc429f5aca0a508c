//! Normalization, export and import of mappings.
//!
//! Every export validates its path before touching anything, normalizes
//! numeric arrays into nested sequences, creates missing parent
//! directories and then writes the file, replacing any previous content.

use std::path::Path;

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tracing::debug;

use nin_common::DEFAULT_JSON_INDENT;
use nin_common::error::{CommonError, Result};
use nin_common::io;
use nin_common::serialization::json;

use crate::attrdict::AttrDict;
use crate::value::Value;

/// What JSON export writes in place of values JSON cannot hold.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Placeholder {
    #[default]
    Null,
    Text(String),
}

impl Placeholder {
    /// The `"<not serializable>"` marker.
    pub fn not_serializable() -> Self {
        Placeholder::Text("<not serializable>".to_string())
    }
}

/// Options for [`AttrDict::save_as_json_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct JsonOptions {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Replacement for opaque values and non-finite floats.
    pub placeholder: Placeholder,
}

impl JsonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_JSON_INDENT,
            placeholder: Placeholder::Null,
        }
    }
}

/// Serializes a value for JSON, substituting the placeholder per field.
struct JsonSafe<'a> {
    value: &'a Value,
    placeholder: &'a Placeholder,
}

impl JsonSafe<'_> {
    fn wrap<'b>(&'b self, value: &'b Value) -> JsonSafe<'b> {
        JsonSafe {
            value,
            placeholder: self.placeholder,
        }
    }
}

impl Serialize for JsonSafe<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            Value::Opaque(_) => serialize_placeholder(self.placeholder, serializer),
            Value::Float(f) if !f.is_finite() => serialize_placeholder(self.placeholder, serializer),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&self.wrap(item))?;
                }
                seq.end()
            }
            Value::Map(dict) => {
                let mut map = serializer.serialize_map(Some(dict.len()))?;
                for (key, item) in dict {
                    map.serialize_entry(key, &self.wrap(item))?;
                }
                map.end()
            }
            Value::Array(array) => {
                let nested = array.to_nested();
                self.wrap(&nested).serialize(serializer)
            }
            scalar => scalar.serialize(serializer),
        }
    }
}

fn serialize_placeholder<S: Serializer>(
    placeholder: &Placeholder,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match placeholder {
        Placeholder::Null => serializer.serialize_unit(),
        Placeholder::Text(text) => serializer.serialize_str(text),
    }
}

fn normalize_value(value: &mut Value) {
    match value {
        Value::Map(dict) => dict.normalize_for_export(),
        Value::Seq(items) => items.iter_mut().for_each(normalize_value),
        Value::Array(array) => {
            let nested = array.to_nested();
            *value = nested;
        }
        _ => {}
    }
}

/// Type name of the first opaque value under `value`, depth first.
#[cfg(feature = "binary")]
fn first_opaque(value: &Value) -> Option<&str> {
    match value {
        Value::Opaque(name) => Some(name.as_str()),
        Value::Seq(items) => items.iter().find_map(first_opaque),
        Value::Map(dict) => dict.values().find_map(first_opaque),
        _ => None,
    }
}

fn into_root_mapping(value: Value) -> Result<AttrDict> {
    match value {
        Value::Map(dict) => Ok(dict),
        other => Err(CommonError::invalid_argument(format!(
            "document root is a {}, expected a mapping",
            other.kind()
        ))),
    }
}

impl AttrDict {
    /// Replace every numeric array with its nested-sequence form, in place.
    ///
    /// Children are normalized before their parent slot is rewritten.
    /// Only existing entries are touched, so default-mode mappings do not
    /// grow. Running it twice is the same as running it once.
    pub fn normalize_for_export(&mut self) {
        for (_, value) in self.entries.iter_mut() {
            normalize_value(value);
        }
    }

    /// Save as JSON with `indent` spaces per level.
    ///
    /// Opaque values and non-finite floats are written as `null`.
    pub fn save_as_json<P: AsRef<Path>>(&mut self, path: P, indent: usize) -> Result<()> {
        self.save_as_json_with(path, &JsonOptions::default().with_indent(indent))
    }

    pub fn save_as_json_with<P: AsRef<Path>>(&mut self, path: P, options: &JsonOptions) -> Result<()> {
        let path = path.as_ref();
        io::validate_path(path)?;
        self.normalize_for_export();
        debug!(path = %path.display(), indent = options.indent, "exporting mapping as JSON");
        let root = JsonSafeMap {
            dict: self,
            placeholder: &options.placeholder,
        };
        json::save(&root, path, options.indent)
    }

    /// Load a JSON document whose root is an object.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        into_root_mapping(json::load(path)?)
    }

    /// Save as YAML. Opaque values fail with a serialization error.
    #[cfg(feature = "yaml")]
    pub fn save_as_yaml<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        io::validate_path(path)?;
        self.normalize_for_export();
        debug!(path = %path.display(), "exporting mapping as YAML");
        nin_common::serialization::yaml::save(&*self, path)
    }

    /// Load a YAML document whose root is a mapping.
    #[cfg(feature = "yaml")]
    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        into_root_mapping(nin_common::serialization::yaml::load(path)?)
    }

    /// Save in the binary object format, mode included.
    ///
    /// Opaque values fail with a serialization error before anything is
    /// written.
    #[cfg(feature = "binary")]
    pub fn save_as_binary<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        io::validate_path(path)?;
        self.normalize_for_export();
        if let Some(name) = self.values().find_map(first_opaque) {
            return Err(CommonError::serialization_error(format!(
                "value of type `{name}` has no binary encoding"
            )));
        }
        debug!(path = %path.display(), "exporting mapping as binary");
        nin_common::serialization::binary::save(&*self, path)
    }

    /// Load a mapping written by [`AttrDict::save_as_binary`].
    #[cfg(feature = "binary")]
    pub fn load_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
        nin_common::serialization::binary::load(path)
    }
}

struct JsonSafeMap<'a> {
    dict: &'a AttrDict,
    placeholder: &'a Placeholder,
}

impl Serialize for JsonSafeMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.dict.len()))?;
        for (key, value) in self.dict {
            let safe = JsonSafe {
                value,
                placeholder: self.placeholder,
            };
            map.serialize_entry(key, &safe)?;
        }
        map.end()
    }
}
