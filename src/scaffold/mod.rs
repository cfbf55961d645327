//! Turn annotated text into a template plus a default config
//!
//! `lr={lr:.1e=3e-4}` becomes `lr={{ lr | fmt(spec=".1e") }}` in the template
//! and `lr: 0.0003` in the defaults.

pub mod kind;
pub mod params;

pub use kind::Kind;
pub use params::{placeholder_spans, Parameter};

use crate::conf::path;
use crate::error::{Result, TextconfError};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A parameter together with its inferred kind and typed default.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub parameter: Parameter,
    pub kind: Kind,
    pub default: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scaffold {
    template: String,
    defaults: Map<String, Value>,
    fields: Vec<Field>,
}

impl Scaffold {
    /// Scan `text` for parameters. With a `prefix`, every value nests under it.
    pub fn new(text: &str, prefix: Option<&str>) -> Result<Self> {
        let prefix = prefix.filter(|p| !p.is_empty());
        let mut template = String::with_capacity(text.len());
        let mut fields: Vec<Field> = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = 0;

        for span in placeholder_spans(text) {
            let Some(parameter) = Parameter::parse(&text[span.clone()]) else {
                continue;
            };
            if !seen.insert(parameter.name.clone()) {
                return Err(TextconfError::DuplicateParameter(parameter.name));
            }

            escape_into(&mut template, &text[cursor..span.start], true);
            template.push_str(&expression(&parameter, prefix));
            cursor = span.end;

            let kind = Kind::infer(&parameter.default);
            let default = kind.value(&parameter.default);
            fields.push(Field { parameter, kind, default });
        }
        escape_into(&mut template, &text[cursor..], false);

        let mut root = Value::Object(Map::new());
        for field in &fields {
            let key = match prefix {
                Some(prefix) => path::join(prefix, &field.parameter.name),
                None => field.parameter.name.clone(),
            };
            insert_default(&mut root, &key, field.default.clone())?;
        }
        let defaults = match root {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        tracing::debug!("scaffold found {} parameter(s)", fields.len());
        Ok(Self { template, defaults, fields })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn defaults_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.defaults).map_err(|e| TextconfError::Serialize(e.to_string()))
    }
}

fn expression(parameter: &Parameter, prefix: Option<&str>) -> String {
    let name = match prefix {
        Some(prefix) => format!("{}.{}", prefix, parameter.name),
        None => parameter.name.clone(),
    };
    match &parameter.fmt {
        Some(spec) => format!("{{{{ {} | fmt(spec=\"{}\") }}}}", name, spec),
        None => format!("{{{{ {} }}}}", name),
    }
}

/// Copy literal text, neutralising `{{`, `{%` and `{#`.
///
/// `before_tag` also escapes a trailing `{` that would merge with the next tag.
fn escape_into(out: &mut String, text: &str, before_tag: bool) {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(next) if matches!(next, '{' | '%' | '#') => {
                chars.next();
                out.push_str(&format!("{{{{ \"{{{}\" }}}}", next));
            }
            None if before_tag => out.push_str("{{ \"{\" }}"),
            _ => out.push('{'),
        }
    }
}

/// Insert at a dotted key, refusing to turn a value into a mapping or back.
fn insert_default(root: &mut Value, key: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = key.split('.').collect();
    let mut node = root;
    for (i, segment) in segments.iter().enumerate() {
        let Value::Object(map) = node else {
            return Err(TextconfError::ConflictingParameter(key.to_string()));
        };
        if i + 1 == segments.len() {
            if map.contains_key(*segment) {
                return Err(TextconfError::ConflictingParameter(key.to_string()));
            }
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        node = map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TemplateEngine;
    use serde_json::json;
    use tera::Context;

    #[test]
    fn builds_template_and_defaults() {
        let scaffold =
            Scaffold::new("python train.py --lr {lr:.2e=1e-3} --epochs {epochs=10}", None).unwrap();
        assert_eq!(
            scaffold.template(),
            "python train.py --lr {{ lr | fmt(spec=\".2e\") }} --epochs {{ epochs }}"
        );
        assert_eq!(Value::Object(scaffold.defaults().clone()), json!({"lr": 0.001, "epochs": 10}));
        assert_eq!(scaffold.fields()[0].kind, Kind::Float);
    }

    #[test]
    fn prefix_and_dotted_names_nest() {
        let text = "{model.name=mlp} {model.depth=4} {use_amp=true}";
        let scaffold = Scaffold::new(text, Some("train")).unwrap();
        assert_eq!(
            Value::Object(scaffold.defaults().clone()),
            json!({"train": {"model": {"name": "mlp", "depth": 4}, "use_amp": true}})
        );
        assert!(scaffold.template().starts_with("{{ train.model.name }}"));
        assert_eq!(
            scaffold.defaults_yaml().unwrap(),
            "train:\n  model:\n    depth: 4\n    name: mlp\n  use_amp: true\n"
        );
    }

    #[test]
    fn template_renders_back_to_the_default_text() {
        let text = "lr={lr:.2e=1e-3} layers={layers=[64,32]} {{keep}} {% raw %} {#x} {a}";
        let scaffold = Scaffold::new(text, Some("cfg")).unwrap();

        let mut engine = TemplateEngine::new();
        let context = Context::from_value(Value::Object(scaffold.defaults().clone())).unwrap();
        let out = engine.render_str(scaffold.template(), &context).unwrap();
        assert_eq!(out, "lr=1.00e-03 layers=[64, 32] {{keep}} {% raw %} {#x} {a}");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        assert!(matches!(
            Scaffold::new("{a=1} {a=2}", None),
            Err(TextconfError::DuplicateParameter(name)) if name == "a"
        ));
    }

    #[test]
    fn conflicting_shapes_are_rejected() {
        assert!(matches!(
            Scaffold::new("{a=1} {a.b=2}", None),
            Err(TextconfError::ConflictingParameter(key)) if key == "a.b"
        ));
        assert!(matches!(
            Scaffold::new("{a.b=2} {a=1}", None),
            Err(TextconfError::ConflictingParameter(key)) if key == "a"
        ));
    }

    #[test]
    fn text_without_parameters_is_escaped_only() {
        let scaffold = Scaffold::new("echo {{ not a param }}", None).unwrap();
        assert!(scaffold.fields().is_empty());
        assert_eq!(scaffold.template(), "echo {{ \"{{\" }} not a param }}");
        assert!(scaffold.defaults().is_empty());
    }
}
