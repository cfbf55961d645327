//! Command-line style overrides (`key=value`, `+key=value`, `++key=value`, `~key`)

use super::path;
use crate::error::{Result, TextconfError};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// `key=value`: change an existing key.
    Change { key: String, value: Value },
    /// `+key=value`: add a key that must not exist yet.
    Add { key: String, value: Value },
    /// `++key=value`: set a key whether or not it exists.
    Force { key: String, value: Value },
    /// `~key`: delete a key.
    Delete { key: String },
}

impl Override {
    pub fn key(&self) -> &str {
        match self {
            Override::Change { key, .. }
            | Override::Add { key, .. }
            | Override::Force { key, .. }
            | Override::Delete { key } => key,
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(key) = input.strip_prefix('~') {
            let key = key.split_once('=').map(|(k, _)| k).unwrap_or(key);
            return Ok(Override::Delete { key: parse_key(input, key)? });
        }

        let (lhs, raw) = input
            .split_once('=')
            .ok_or(TextconfError::InvalidOverride(input.to_string(), "expected key=value"))?;
        let value = parse_value(raw);

        if let Some(key) = lhs.strip_prefix("++") {
            Ok(Override::Force { key: parse_key(input, key)?, value })
        } else if let Some(key) = lhs.strip_prefix('+') {
            Ok(Override::Add { key: parse_key(input, key)?, value })
        } else {
            Ok(Override::Change { key: parse_key(input, lhs)?, value })
        }
    }

    /// Apply to `root`. With `strict`, `key=value` requires the key to exist.
    pub fn apply(&self, root: &mut Value, strict: bool) -> Result<()> {
        match self {
            Override::Change { key, value } => {
                if strict && !path::contains(root, key) {
                    return Err(TextconfError::UnknownKey(key.clone()));
                }
                path::set(root, key, value.clone())?;
            }
            Override::Add { key, value } => {
                if path::contains(root, key) {
                    return Err(TextconfError::KeyExists(key.clone()));
                }
                path::set(root, key, value.clone())?;
            }
            Override::Force { key, value } => {
                path::set(root, key, value.clone())?;
            }
            Override::Delete { key } => {
                if path::remove(root, key).is_none() {
                    return Err(TextconfError::UnknownKey(key.clone()));
                }
            }
        }
        tracing::debug!("applied override {:?}", self);
        Ok(())
    }
}

fn parse_key(input: &str, key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(TextconfError::InvalidOverride(input.to_string(), "empty key"));
    }
    path::split_path(key)
        .map_err(|_| TextconfError::InvalidOverride(input.to_string(), "malformed key"))?;
    Ok(key.to_string())
}

/// Parse an override value the way YAML would read it.
///
/// Strings that fail to parse as YAML are kept verbatim.
pub fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw.to_string()),
    }
}

/// Parse and apply a list of overrides in order.
pub fn apply_overrides<S: AsRef<str>>(root: &mut Value, items: &[S], strict: bool) -> Result<()> {
    for item in items {
        Override::parse(item.as_ref())?.apply(root, strict)?;
    }
    Ok(())
}
