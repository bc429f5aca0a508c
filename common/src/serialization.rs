//! Serialization backends used by the exporters.
//!
//! JSON is always available. YAML and the binary format are compiled in
//! through the `yaml` and `binary` cargo features; with a feature disabled
//! the corresponding module does not exist.

/// Default indentation width for pretty printed JSON.
pub const DEFAULT_JSON_INDENT: usize = 4;

/// JSON encoding and decoding via serde_json.
pub mod json {
    use std::io::Write;
    use std::path::Path;

    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use serde_json::ser::{PrettyFormatter, Serializer};
    use tracing::debug;

    use crate::error::{ErrorContext, Result};
    use crate::io;

    /// Serialize `value` into `writer` with `indent` spaces per level.
    pub fn write_pretty<W: Write, T: Serialize + ?Sized>(
        writer: W,
        value: &T,
        indent: usize,
    ) -> Result<()> {
        let indent = vec![b' '; indent];
        let formatter = PrettyFormatter::with_indent(&indent);
        let mut serializer = Serializer::with_formatter(writer, formatter);
        value
            .serialize(&mut serializer)
            .with_serialization_context(|| "failed to encode JSON".to_string())
    }

    /// Serialize to a pretty JSON string.
    pub fn to_string_pretty<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
        let mut buffer = Vec::new();
        write_pretty(&mut buffer, value, indent)?;
        String::from_utf8(buffer).with_serialization_context(|| "JSON output is not UTF-8".to_string())
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
        serde_json::from_slice(data).with_deserialization_context(|| "failed to decode JSON".to_string())
    }

    /// Write `value` as JSON to `path`.
    pub fn save<P: AsRef<Path>, T: Serialize + ?Sized>(
        value: &T,
        path: P,
        indent: usize,
    ) -> Result<()> {
        let path = io::resolve_path(path)?;
        let encoded = to_string_pretty(value, indent)?;
        io::write_bytes_to_file(&path, encoded.as_bytes())?;
        debug!(path = %path.display(), format = "json", "saved");
        Ok(())
    }

    /// Read a JSON document from `path`.
    pub fn load<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
        let path = io::resolve_path(path)?;
        let data = io::read_file_to_bytes(&path)?;
        debug!(path = %path.display(), format = "json", "loaded");
        from_bytes(&data)
    }
}

/// YAML encoding and decoding via serde_yaml.
#[cfg(feature = "yaml")]
pub mod yaml {
    use std::path::Path;

    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use tracing::debug;

    use crate::error::{ErrorContext, Result};
    use crate::io;

    /// Serialize to a YAML string.
    pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        serde_yaml::to_string(value).with_serialization_context(|| "failed to encode YAML".to_string())
    }

    /// Deserialize from a YAML string.
    pub fn from_str<T: DeserializeOwned>(s: &str) -> Result<T> {
        serde_yaml::from_str(s).with_deserialization_context(|| "failed to decode YAML".to_string())
    }

    /// Write `value` as YAML to `path`.
    pub fn save<P: AsRef<Path>, T: Serialize + ?Sized>(value: &T, path: P) -> Result<()> {
        let path = io::resolve_path(path)?;
        let encoded = to_string(value)?;
        io::write_bytes_to_file(&path, encoded.as_bytes())?;
        debug!(path = %path.display(), format = "yaml", "saved");
        Ok(())
    }

    /// Read a YAML document from `path`.
    pub fn load<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
        let path = io::resolve_path(path)?;
        let data = io::read_file_to_bytes(&path)?;
        let text = String::from_utf8(data)
            .with_deserialization_context(|| format!("{} is not UTF-8", path.display()))?;
        debug!(path = %path.display(), format = "yaml", "loaded");
        from_str(&text)
    }
}

/// Binary object encoding via bincode.
///
/// The encoding is not self describing: a file can only be decoded into
/// the type that wrote it.
#[cfg(feature = "binary")]
pub mod binary {
    use std::path::Path;

    use tracing::debug;

    use crate::error::{ErrorContext, Result};
    use crate::io;

    /// Serialize to binary using bincode.
    pub fn to_bytes<T: bincode::Encode>(value: &T) -> Result<Vec<u8>> {
        bincode::encode_to_vec(value, bincode::config::standard())
            .with_serialization_context(|| "failed to encode binary object".to_string())
    }

    /// Deserialize from binary using bincode.
    pub fn from_bytes<T: bincode::Decode<()>>(data: &[u8]) -> Result<T> {
        let (result, _) = bincode::decode_from_slice(data, bincode::config::standard())
            .with_deserialization_context(|| "failed to decode binary object".to_string())?;
        Ok(result)
    }

    /// Write `value` in the binary format to `path`.
    pub fn save<P: AsRef<Path>, T: bincode::Encode>(value: &T, path: P) -> Result<()> {
        let path = io::resolve_path(path)?;
        let encoded = to_bytes(value)?;
        io::write_bytes_to_file(&path, &encoded)?;
        debug!(path = %path.display(), format = "binary", "saved");
        Ok(())
    }

    /// Read a binary object from `path`.
    pub fn load<P: AsRef<Path>, T: bincode::Decode<()>>(path: P) -> Result<T> {
        let path = io::resolve_path(path)?;
        let data = io::read_file_to_bytes(&path)?;
        debug!(path = %path.display(), format = "binary", "loaded");
        from_bytes(&data)
    }
}
