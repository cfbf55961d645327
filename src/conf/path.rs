//! Dotted key paths into configuration values
//!
//! `model.layers.0.size` walks mappings by key and lists by index.

use crate::error::{Result, TextconfError};
use serde_json::{Map, Value};

/// Split a dotted path into its segments, rejecting empty segments.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(TextconfError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(TextconfError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Join a parent path and a key, treating an empty parent as the root.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// Parent of a dotted path (`a.b.c` -> `a.b`, `a` -> ``).
pub fn parent(path: &str) -> &str {
    path.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    }
}

pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, child)
}

pub fn get_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut node = root;
    for segment in path.split('.') {
        node = child_mut(node, segment)?;
    }
    Some(node)
}

pub fn contains(root: &Value, path: &str) -> bool {
    get(root, path).is_some()
}

/// Set `value` at `path`, creating intermediate mappings as needed.
///
/// Returns the previous value, if any. Walking through a scalar, or indexing
/// a list out of range, is an error.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<Option<Value>> {
    let segments = split_path(path)?;
    let (last, parents) = segments.split_last().ok_or_else(|| invalid(path))?;

    let mut node = root;
    for segment in parents {
        node = match node {
            Value::Object(map) => {
                map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()))
            }
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| invalid(path))?;
                items.get_mut(index).ok_or_else(|| invalid(path))?
            }
            _ => return Err(invalid(path)),
        };
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
    }

    match node {
        Value::Object(map) => Ok(map.insert(last.to_string(), value)),
        Value::Array(items) => {
            let index = last.parse::<usize>().map_err(|_| invalid(path))?;
            let slot = items.get_mut(index).ok_or_else(|| invalid(path))?;
            Ok(Some(std::mem::replace(slot, value)))
        }
        _ => Err(invalid(path)),
    }
}

/// Remove the value at `path`, returning it when present.
pub fn remove(root: &mut Value, path: &str) -> Option<Value> {
    let (parent_path, last) = match path.rsplit_once('.') {
        Some((p, l)) => (p, l),
        None => ("", path),
    };
    match get_mut(root, parent_path)? {
        Value::Object(map) => map.remove(last),
        Value::Array(items) => {
            let index = last.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}

/// Deep-merge `overlay` into `base`: mappings merge key by key, everything
/// else is replaced.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn invalid(path: &str) -> TextconfError {
    TextconfError::InvalidPath(path.to_string())
}

/// Short name of a value's type for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
