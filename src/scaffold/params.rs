//! `{name=default}` placeholders in annotated text

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("valid name regex")
});

/// Byte ranges of single-brace spans (`{...}`) without spaces or newlines.
///
/// A doubled `{{` is literal text and restarts the scan.
pub fn placeholder_spans(input: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut just_opened = false;

    for (index, c) in input.char_indices() {
        match c {
            '{' if just_opened => {
                start = None;
                just_opened = false;
            }
            '{' => {
                start = Some(index);
                just_opened = true;
            }
            '}' => {
                if let Some(begin) = start.take() {
                    spans.push(begin..index + 1);
                }
                just_opened = false;
            }
            ' ' | '\n' => {
                start = None;
                just_opened = false;
            }
            _ => just_opened = false,
        }
    }
    spans
}

/// A placeholder with a name, an optional format spec and a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub fmt: Option<String>,
    pub default: String,
}

impl Parameter {
    /// Parse `{name=default}` or `{name:fmt=default}`.
    ///
    /// Returns `None` for anything else, which is then kept as plain text.
    pub fn parse(span: &str) -> Option<Self> {
        let inner = span.strip_prefix('{')?.strip_suffix('}')?;
        let (head, default) = inner.split_once('=')?;
        if default.is_empty() || default.contains('=') {
            return None;
        }
        let (name, fmt) = match head.split_once(':') {
            Some((name, fmt)) if !fmt.is_empty() => (name, Some(fmt)),
            Some((name, _)) => (name, None),
            None => (head, None),
        };
        if !NAME.is_match(name) || fmt.is_some_and(|f| f.contains('"')) {
            return None;
        }
        Some(Parameter {
            name: name.to_string(),
            fmt: fmt.map(str::to_string),
            default: default.to_string(),
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fmt {
            Some(spec) => write!(f, "{{{}:{}={}}}", self.name, spec, self.default),
            None => write!(f, "{{{}={}}}", self.name, self.default),
        }
    }
}
