//! Tera-based template engine with built-in filters.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tera::{Context, Tera};

use super::filters;
use crate::error::{Result, TextconfError};

/// Name used for templates rendered from a string.
pub const INLINE_TEMPLATE: &str = "__inline__";

/// `{% include "x" %}`, `{% extends "x" %}`, `{% import "x" as m %}`
static TEMPLATE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{%-?\s*(?:include|extends|import)\s+["']([^"']+)["']"#)
        .expect("valid template reference regex")
});

/// Template engine wrapping Tera. Autoescaping is off: output is plain text.
pub struct TemplateEngine {
    tera: Tera,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.tera.get_template_names().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        filters::register_builtin(&mut tera);
        Self { tera }
    }

    pub fn register_filter<F: tera::Filter + 'static>(&mut self, name: &str, filter: F) {
        self.tera.register_filter(name, filter);
    }

    pub fn register_function<F: tera::Function + 'static>(&mut self, name: &str, function: F) {
        self.tera.register_function(name, function);
    }

    pub fn register_tester<T: tera::Test + 'static>(&mut self, name: &str, tester: T) {
        self.tera.register_tester(name, tester);
    }

    pub fn add_raw_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.tera.add_raw_template(name, source).map_err(|e| TextconfError::template(name, e))
    }

    /// Add a template file plus any templates it includes, extends or imports
    /// from the same directory. Returns the name to render it by.
    pub fn add_template_file(&mut self, path: &Path) -> Result<String> {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = file_name(path);

        let mut files: Vec<(PathBuf, Option<String>)> = Vec::new();
        let mut seen = BTreeSet::new();
        let mut pending = vec![(path.to_path_buf(), name.clone())];

        while let Some((file, key)) = pending.pop() {
            if !seen.insert(key.clone()) {
                continue;
            }
            let source = fs::read_to_string(&file).map_err(|e| TextconfError::io(&file, e))?;
            for reference in referenced_templates(&source) {
                let candidate = dir.join(&reference);
                if candidate.is_file() && !seen.contains(&reference) {
                    pending.push((candidate, reference));
                }
            }
            files.push((file, Some(key)));
        }

        tracing::debug!("loading {} template file(s) for '{}'", files.len(), name);
        self.tera.add_template_files(files).map_err(|e| TextconfError::template(&name, e))?;
        Ok(name)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        self.tera.render(name, context).map_err(|e| TextconfError::template(name, e))
    }

    /// Render a one-off template string.
    pub fn render_str(&mut self, source: &str, context: &Context) -> Result<String> {
        self.add_raw_template(INLINE_TEMPLATE, source)?;
        self.render(INLINE_TEMPLATE, context)
    }

    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("template").to_string()
}

/// Names of templates referenced by `include`, `extends` or `import` tags.
pub fn referenced_templates(source: &str) -> Vec<String> {
    TEMPLATE_REFERENCE.captures_iter(source).map(|c| c[1].to_string()).collect()
}
