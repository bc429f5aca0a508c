//! The attribute-accessible ordered mapping.
//!
//! An [`AttrDict`] keeps string keys in insertion order. Every mapping it
//! holds is itself an `AttrDict`, and nested mappings take on their
//! parent's [`MissingKey`] mode when they are stored.
//!
//! # Missing keys
//!
//! In [`MissingKey::Strict`] mode reading an absent key fails with
//! `KeyNotFound`. In [`MissingKey::Default`] mode the read stores the
//! process-wide factory default under that key and returns it, so a read
//! can grow the mapping. [`AttrDict::get_item`] reports which of the two
//! happened through [`Lookup`].
//!
//! Concurrent mutation of one instance must be serialized by the caller.

use std::fmt;
use std::ops::Deref;
use std::sync::{PoisonError, RwLock};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::trace;

use nin_common::error::{CommonError, ErrorContext, Result};

use crate::value::Value;

static FACTORY_DEFAULT: RwLock<Value> = RwLock::new(Value::Null);

/// The value inserted for absent keys in [`MissingKey::Default`] mode.
pub fn factory_default() -> Value {
    FACTORY_DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the process-wide factory default, returning the previous one.
///
/// Keys inserted earlier keep the value they were given.
pub fn set_factory_default<V: Into<Value>>(value: V) -> Value {
    let mut current = FACTORY_DEFAULT
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *current, value.into())
}

/// How an [`AttrDict`] answers reads of absent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "binary", derive(bincode::Encode, bincode::Decode))]
pub enum MissingKey {
    /// Fail with `KeyNotFound`.
    #[default]
    Strict,
    /// Insert and return the factory default.
    Default,
}

/// Outcome of [`AttrDict::get_item`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The key was present.
    Found(&'a Value),
    /// The key was absent and the factory default was stored under it.
    Inserted(&'a Value),
}

impl<'a> Lookup<'a> {
    pub fn value(&self) -> &'a Value {
        match self {
            Lookup::Found(v) | Lookup::Inserted(v) => v,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Lookup::Inserted(_))
    }
}

impl Deref for Lookup<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        self.value()
    }
}

/// Ordered string-keyed mapping with attribute-style accessors.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "binary", derive(bincode::Encode, bincode::Decode))]
pub struct AttrDict {
    pub(crate) entries: Vec<(String, Value)>,
    mode: MissingKey,
}

/// Apply `mode` to mappings held directly by `value`, or held directly
/// inside a sequence it holds.
fn adopt(value: &mut Value, mode: MissingKey) {
    match value {
        Value::Map(dict) => dict.adopt_mode(mode),
        Value::Seq(items) => {
            for item in items.iter_mut() {
                if let Value::Map(dict) = item {
                    dict.adopt_mode(mode);
                }
            }
        }
        _ => {}
    }
}

impl AttrDict {
    /// Create an empty strict mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mapping in [`MissingKey::Default`] mode.
    pub fn with_defaults() -> Self {
        Self::with_mode(MissingKey::Default)
    }

    pub fn with_mode(mode: MissingKey) -> Self {
        Self {
            entries: Vec::new(),
            mode,
        }
    }

    /// Build a strict mapping from key-value pairs, in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs.into_iter().collect()
    }

    /// Build a mapping from any serializable struct or map.
    ///
    /// Field order follows the serialized order. Fails with
    /// `InvalidArgument` when `value` does not serialize to a map.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)
            .with_serialization_context(|| "failed to convert value to a mapping".to_string())?;
        Self::try_from(json)
    }

    /// Switch this mapping, and the mappings it wraps, to `mode`.
    pub fn into_mode(mut self, mode: MissingKey) -> Self {
        self.adopt_mode(mode);
        self
    }

    fn adopt_mode(&mut self, mode: MissingKey) {
        self.mode = mode;
        for (_, value) in self.entries.iter_mut() {
            adopt(value, mode);
        }
    }

    pub fn mode(&self) -> MissingKey {
        self.mode
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Look up `key` without side effects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|index| &self.entries[index].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.position(key).map(|index| &mut self.entries[index].1)
    }

    /// Read `key`, applying the missing-key mode.
    ///
    /// In default mode an absent key is appended with the factory default
    /// and reported as [`Lookup::Inserted`]; later reads return the stored
    /// value as [`Lookup::Found`].
    pub fn get_item(&mut self, key: &str) -> Result<Lookup<'_>> {
        if let Some(index) = self.position(key) {
            return Ok(Lookup::Found(&self.entries[index].1));
        }
        match self.mode {
            MissingKey::Strict => Err(CommonError::key_not_found(key)),
            MissingKey::Default => {
                let mut value = factory_default();
                adopt(&mut value, self.mode);
                trace!(key, "storing factory default for missing key");
                self.entries.push((key.to_string(), value));
                let index = self.entries.len() - 1;
                Ok(Lookup::Inserted(&self.entries[index].1))
            }
        }
    }

    /// Attribute-style spelling of [`AttrDict::get_item`].
    pub fn get_attr(&mut self, key: &str) -> Result<Lookup<'_>> {
        self.get_item(key)
    }

    /// Store `value` under `key`, returning the previous value.
    ///
    /// Nested mappings adopt this mapping's mode. An existing key keeps
    /// its position.
    pub fn set_item<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        let key = key.into();
        let mut value = value.into();
        adopt(&mut value, self.mode);
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Attribute-style spelling of [`AttrDict::set_item`].
    pub fn set_attr<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.set_item(key, value)
    }

    /// Remove `key`, failing with `KeyNotFound` if it is absent.
    pub fn del_item(&mut self, key: &str) -> Result<Value> {
        match self.position(key) {
            Some(index) => Ok(self.entries.remove(index).1),
            None => Err(CommonError::key_not_found(key)),
        }
    }

    /// Attribute-style spelling of [`AttrDict::del_item`].
    pub fn del_attr(&mut self, key: &str) -> Result<Value> {
        self.del_item(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }
}

impl PartialEq for AttrDict {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Borrowing iterator over `(key, value)` pairs in order.
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, (String, Value)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Mutable iterator over `(key, value)` pairs in order.
pub struct IterMut<'a> {
    inner: std::slice::IterMut<'a, (String, Value)>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a str, &'a mut Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IterMut<'_> {}

impl<'a> IntoIterator for &'a AttrDict {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut AttrDict {
    type Item = (&'a str, &'a mut Value);
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> IterMut<'a> {
        self.iter_mut()
    }
}

impl IntoIterator for AttrDict {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttrDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = AttrDict::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for AttrDict {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set_item(key, value);
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for AttrDict {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<serde_json::Value> for AttrDict {
    type Error = CommonError;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => Ok(AttrDict::from(map)),
            other => Err(CommonError::invalid_argument(format!(
                "expected an object, found {}",
                Value::from(other).kind()
            ))),
        }
    }
}

impl Serialize for AttrDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub(crate) struct AttrDictVisitor;

impl<'de> Visitor<'de> for AttrDictVisitor {
    type Value = AttrDict;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a mapping with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<AttrDict, A::Error> {
        let mut dict = AttrDict::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            dict.set_item(key, value);
        }
        Ok(dict)
    }
}

impl<'de> Deserialize<'de> for AttrDict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(AttrDictVisitor)
    }
}
