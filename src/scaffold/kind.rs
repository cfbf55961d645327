//! Value kinds inferred from placeholder defaults

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt;

static INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid int regex"));
static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]*\.[0-9]*$").expect("valid decimal regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int,
    Float,
    Bool,
    Str,
    List(Box<Kind>),
}

impl Kind {
    pub fn infer(default: &str) -> Self {
        if is_int(default) {
            Kind::Int
        } else if is_float(default) {
            Kind::Float
        } else if is_bool(default) {
            Kind::Bool
        } else if let Some(items) = list_items(default) {
            Kind::List(Box::new(common_kind(items.iter().map(|item| Kind::infer(item)))))
        } else {
            Kind::Str
        }
    }

    /// Typed value for `default` under this kind.
    pub fn value(&self, default: &str) -> Value {
        match self {
            Kind::Int => match default.parse::<i64>() {
                Ok(n) => Value::from(n),
                Err(_) => Kind::Float.value(default),
            },
            Kind::Float => default
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(default.to_string())),
            Kind::Bool => Value::Bool(default.eq_ignore_ascii_case("true")),
            Kind::Str => Value::String(unquote(default).to_string()),
            Kind::List(item) => Value::Array(
                list_items(default)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|raw| item.value(raw))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::Bool => write!(f, "bool"),
            Kind::Str => write!(f, "str"),
            Kind::List(item) => write!(f, "list[{}]", item),
        }
    }
}

pub fn is_int(s: &str) -> bool {
    INT.is_match(s)
}

pub fn is_float(s: &str) -> bool {
    if s.len() <= 1 {
        return false;
    }
    if DECIMAL.is_match(s) {
        return true;
    }
    let lower = s.to_ascii_lowercase();
    match lower.split_once('e') {
        Some((mantissa, exponent)) if !exponent.contains('e') => {
            (is_float(mantissa) || is_int(mantissa)) && is_int(exponent)
        }
        _ => false,
    }
}

pub fn is_bool(s: &str) -> bool {
    matches!(s, "true" | "false" | "True" | "False")
}

fn list_items(s: &str) -> Option<Vec<&str>> {
    let inner = s.strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(inner.split(',').map(str::trim).collect())
}

/// Narrowest kind every item fits: ints widen to float, anything mixed is str.
fn common_kind(kinds: impl Iterator<Item = Kind>) -> Kind {
    let mut common: Option<Kind> = None;
    for kind in kinds {
        common = Some(match (common, kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(Kind::Int), Kind::Float) | (Some(Kind::Float), Kind::Int) => Kind::Float,
            _ => return Kind::Str,
        });
    }
    common.unwrap_or(Kind::Str)
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
