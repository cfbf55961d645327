//! `${...}` interpolation between config values
//!
//! Supported forms:
//! - `${a.b}` absolute reference, `${.x}` / `${..x}` relative to the
//!   containing mapping
//! - `${oc.env:NAME}` / `${oc.env:NAME,default}` (and `${env:...}`)
//! - `\${...}` for a literal `${...}`
//!
//! A string that is a single interpolation takes the referenced value with
//! its type. Interpolations inside a longer string are stringified.

use super::path;
use crate::error::{Result, TextconfError};
use serde_json::{Map, Value};

/// Marker for a mandatory value that has not been provided.
pub const MISSING: &str = "???";

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Text(String),
    Interp(&'a str),
}

fn tokenize<'a>(path: &str, s: &'a str) -> Result<Vec<Token<'a>>> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut rest = s;

    while let Some(pos) = rest.find("${") {
        if rest[..pos].ends_with('\\') {
            text.push_str(&rest[..pos - 1]);
            text.push_str("${");
            rest = &rest[pos + 2..];
            continue;
        }
        text.push_str(&rest[..pos]);
        let body = &rest[pos + 2..];
        let end = body.find('}').ok_or_else(|| invalid(s, path))?;
        let expr = &body[..end];
        if expr.contains("${") {
            return Err(invalid(s, path));
        }
        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }
        tokens.push(Token::Interp(expr));
        rest = &body[end + 1..];
    }
    text.push_str(rest);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

struct Resolver<'a> {
    root: &'a Value,
    strict: bool,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn node(&mut self, at: &str, node: &Value) -> Result<Value> {
        match node {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.node(&path::join(at, key), child)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, child)| self.node(&path::join(at, &i.to_string()), child))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::String(s) => self.string(at, s),
            other => Ok(other.clone()),
        }
    }

    fn string(&mut self, at: &str, s: &str) -> Result<Value> {
        if s == MISSING {
            if self.strict {
                return Err(TextconfError::MissingValue(at.to_string()));
            }
            return Ok(Value::String(s.to_string()));
        }

        let tokens = tokenize(at, s)?;
        if let [Token::Interp(expr)] = tokens.as_slice() {
            return self.evaluate(at, expr);
        }

        let mut out = String::new();
        for token in &tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Interp(expr) => out.push_str(&stringify(&self.evaluate(at, expr)?)),
            }
        }
        Ok(Value::String(out))
    }

    fn evaluate(&mut self, at: &str, expr: &str) -> Result<Value> {
        let expr = expr.trim();
        if let Some((resolver, args)) = expr.split_once(':') {
            return match resolver.trim() {
                "oc.env" | "env" => env_lookup(args),
                _ => Err(invalid(expr, at)),
            };
        }

        let target = self.target(at, expr)?;
        if target == at || at.starts_with(&format!("{}.", target)) || self.stack.contains(&target)
        {
            return Err(TextconfError::InterpolationCycle(target));
        }

        let node = path::get(self.root, &target).ok_or_else(|| {
            TextconfError::InterpolationKeyNotFound { key: target.clone(), from: at.to_string() }
        })?;

        tracing::debug!("resolving ${{{}}} at '{}'", target, at);
        self.stack.push(target.clone());
        let resolved = self.node(&target, node);
        self.stack.pop();
        resolved
    }

    /// Turn a (possibly relative) reference into an absolute dotted path.
    fn target(&self, at: &str, expr: &str) -> Result<String> {
        if expr.is_empty() || expr.contains(char::is_whitespace) {
            return Err(invalid(expr, at));
        }
        let dots = expr.chars().take_while(|&c| c == '.').count();
        if dots == 0 {
            path::split_path(expr).map_err(|_| invalid(expr, at))?;
            return Ok(expr.to_string());
        }

        let rest = &expr[dots..];
        if rest.is_empty() {
            return Err(invalid(expr, at));
        }
        path::split_path(rest).map_err(|_| invalid(expr, at))?;

        let mut base = path::parent(at);
        for _ in 1..dots {
            if base.is_empty() {
                return Err(invalid(expr, at));
            }
            base = path::parent(base);
        }
        Ok(path::join(base, rest))
    }
}

fn env_lookup(args: &str) -> Result<Value> {
    let (name, default) = match args.split_once(',') {
        Some((name, default)) => (name.trim(), Some(default.trim())),
        None => (args.trim(), None),
    };
    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(Value::String(value)),
        (Err(_), Some(default)) => Ok(Value::String(unquote(default).to_string())),
        (Err(_), None) => Err(TextconfError::EnvNotSet(name.to_string())),
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

/// Render a value for embedding inside a larger string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn invalid(expr: &str, at: &str) -> TextconfError {
    TextconfError::InvalidInterpolation { expr: expr.to_string(), path: at.to_string() }
}

/// Resolve every interpolation in `root`.
///
/// With `strict`, `???` values are errors; otherwise they are left in place.
pub fn resolve(root: &Value, strict: bool) -> Result<Value> {
    Resolver { root, strict, stack: Vec::new() }.node("", root)
}

/// Collect the paths of all `???` values.
pub fn missing_paths(root: &Value) -> Vec<String> {
    fn walk(at: &str, node: &Value, out: &mut Vec<String>) {
        match node {
            Value::Object(map) => {
                for (key, child) in map {
                    walk(&path::join(at, key), child, out);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    walk(&path::join(at, &i.to_string()), child, out);
                }
            }
            Value::String(s) if s == MISSING => out.push(at.to_string()),
            _ => {}
        }
    }
    let mut out = Vec::new();
    walk("", root, &mut out);
    out
}
