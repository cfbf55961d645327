//! Template context assembly
//!
//! The context is built in a fixed order: the config object, then each
//! layer, then interpolation over the merged result, then flattening, then
//! extra values and finally derived values that no extra value shadows.

use crate::conf::{interpolate, overrides, path, ConfigObject};
use crate::domain::{ContextStyle, Settings};
use crate::error::{Result, TextconfError};
use serde_json::{Map, Value};
use tera::Context;

/// Something merged over the config object before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextLayer {
    /// Deep-merged mapping.
    Map(Value),
    /// `key=value` overrides, applied leniently.
    Dotlist(Vec<String>),
}

impl ContextLayer {
    pub fn dotlist<S: AsRef<str>>(items: &[S]) -> Self {
        ContextLayer::Dotlist(items.iter().map(|s| s.as_ref().to_string()).collect())
    }

    fn apply(&self, root: &mut Value) -> Result<()> {
        match self {
            ContextLayer::Map(value) => {
                if !value.is_object() {
                    return Err(TextconfError::NotAMapping(path::type_name(value)));
                }
                path::merge(root, value.clone());
                Ok(())
            }
            ContextLayer::Dotlist(items) => overrides::apply_overrides(root, items, false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextBuilder {
    style: ContextStyle,
    separator: String,
    strict: bool,
    layers: Vec<ContextLayer>,
    extras: Map<String, Value>,
    derived: Map<String, Value>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ContextBuilder {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            style: settings.context_style,
            separator: settings.separator.clone(),
            strict: settings.strict,
            layers: Vec::new(),
            extras: Map::new(),
            derived: Map::new(),
        }
    }

    pub fn style(mut self, style: ContextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn layer(mut self, layer: ContextLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layers(mut self, layers: impl IntoIterator<Item = ContextLayer>) -> Self {
        self.layers.extend(layers);
        self
    }

    /// Top-level values that win over everything else.
    pub fn extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras.extend(extras);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Values computed from the config; skipped when an extra has the same name.
    pub fn derived(mut self, derived: Map<String, Value>) -> Self {
        self.derived.extend(derived);
        self
    }

    /// Build the context as a plain mapping.
    pub fn build_value(&self, cfg: &ConfigObject) -> Result<Map<String, Value>> {
        let mut root = Value::Object(cfg.without_private());
        for layer in &self.layers {
            layer.apply(&mut root)?;
        }

        let resolved = interpolate::resolve(&root, self.strict)?;
        let map = match resolved {
            Value::Object(map) => map,
            other => return Err(TextconfError::NotAMapping(path::type_name(&other))),
        };

        let mut context = match self.style {
            ContextStyle::Nested => map,
            ContextStyle::Flat => flatten(&map, &self.separator)?,
        };
        tracing::debug!("context has {} top-level key(s) ({})", context.len(), self.style);

        for (key, value) in &self.extras {
            context.insert(key.clone(), value.clone());
        }
        for (key, value) in &self.derived {
            if self.extras.contains_key(key) {
                tracing::debug!("derived value '{}' shadowed by an explicit value", key);
                continue;
            }
            context.insert(key.clone(), value.clone());
        }
        Ok(context)
    }

    pub fn build(&self, cfg: &ConfigObject) -> Result<Context> {
        let mut context = Context::new();
        for (key, value) in self.build_value(cfg)? {
            context.insert(key, &value);
        }
        Ok(context)
    }
}

/// Join nested keys with `separator`. Lists and empty mappings are leaves.
pub fn flatten(map: &Map<String, Value>, separator: &str) -> Result<Map<String, Value>> {
    fn walk(
        prefix: &str,
        map: &Map<String, Value>,
        separator: &str,
        out: &mut Map<String, Value>,
    ) -> Result<()> {
        for (key, value) in map {
            let name =
                if prefix.is_empty() { key.clone() } else { format!("{prefix}{separator}{key}") };
            match value {
                Value::Object(inner) if !inner.is_empty() => walk(&name, inner, separator, out)?,
                leaf => {
                    if out.contains_key(&name) {
                        return Err(TextconfError::ContextCollision(name));
                    }
                    out.insert(name, leaf.clone());
                }
            }
        }
        Ok(())
    }

    let mut out = Map::new();
    walk("", map, separator, &mut out)?;
    Ok(out)
}
