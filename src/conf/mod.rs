//! Hierarchical configuration objects
//!
//! A [`ConfigObject`] is a mapping loaded from YAML/TOML/JSON files (or built
//! from any `Serialize` value), adjusted with overrides and resolved with
//! `${...}` interpolation before it reaches a template.

pub mod interpolate;
pub mod load;
pub mod overrides;
pub mod path;

use crate::error::{Result, TextconfError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub use interpolate::MISSING;
pub use load::{load_files, FileFormat};
pub use overrides::{apply_overrides, Override};

/// Key holding the template name inside a config object.
pub const TEMPLATE_KEY: &str = "_template_";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigObject {
    value: Map<String, Value>,
    source: Option<PathBuf>,
}

impl ConfigObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { value: map, source: None }),
            other => Err(TextconfError::NotAMapping(path::type_name(&other))),
        }
    }

    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| TextconfError::Serialize(e.to_string()))?;
        Self::from_value(value)
    }

    /// Load and merge config files in order; the first file becomes the source.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let (value, source) = load::load_files(paths)?;
        let mut cfg = Self::from_value(value)?;
        cfg.source = source;
        Ok(cfg)
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// File this object was loaded from, when known.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.value
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.value)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.value.clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        let (head, rest) = match key.split_once('.') {
            Some((head, rest)) => (head, rest),
            None => (key, ""),
        };
        path::get(self.value.get(head)?, rest)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<Option<Value>> {
        self.with_root(|root| path::set(root, key, value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.with_root(|root| path::remove(root, key))
    }

    /// Deep-merge `other` over this object.
    pub fn merge(&mut self, other: Value) -> Result<()> {
        if !other.is_object() {
            return Err(TextconfError::NotAMapping(path::type_name(&other)));
        }
        self.with_root(|root| path::merge(root, other));
        Ok(())
    }

    /// Apply dotlist overrides. `strict` requires plain `key=value` keys to exist.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, items: &[S], strict: bool) -> Result<()> {
        self.with_root(|root| overrides::apply_overrides(root, items, strict))
    }

    /// Resolve interpolations, returning a new object with the same source.
    pub fn resolve(&self, strict: bool) -> Result<Self> {
        let resolved = interpolate::resolve(&self.to_value(), strict)?;
        let mut cfg = Self::from_value(resolved)?;
        cfg.source = self.source.clone();
        Ok(cfg)
    }

    /// Paths of mandatory values still set to `???`.
    pub fn missing(&self) -> Vec<String> {
        interpolate::missing_paths(&self.to_value())
    }

    /// Template name stored under `_template_`, if any.
    pub fn template_name(&self) -> Option<&str> {
        self.value.get(TEMPLATE_KEY).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Copy without private keys (`_template_` and anything starting with `_`).
    pub fn without_private(&self) -> Map<String, Value> {
        self.value
            .iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.value).map_err(|e| TextconfError::Serialize(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.value)
            .map(|s| s + "\n")
            .map_err(|e| TextconfError::Serialize(e.to_string()))
    }

    /// TOML has no null, so null values are dropped.
    pub fn to_toml(&self) -> Result<String> {
        let cleaned = strip_nulls(self.to_value());
        toml::to_string_pretty(&cleaned).map_err(|e| TextconfError::Serialize(e.to_string()))
    }

    fn with_root<R>(&mut self, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut root = Value::Object(std::mem::take(&mut self.value));
        let out = f(&mut root);
        if let Value::Object(map) = root {
            self.value = map;
        }
        out
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().filter(|v| !v.is_null()).map(strip_nulls).collect())
        }
        other => other,
    }
}

impl Serialize for ConfigObject {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl TryFrom<Value> for ConfigObject {
    type Error = TextconfError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}
