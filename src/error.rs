//! Library error type

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = TextconfError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TextconfError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported config format '.{ext}' for file {}", .path.display())]
    UnsupportedFormat { path: PathBuf, ext: String },

    #[error("failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("config root must be a mapping, found {0}")]
    NotAMapping(&'static str),

    #[error("invalid path '{0}'")]
    InvalidPath(String),

    #[error("invalid override '{0}': {1}")]
    InvalidOverride(String, &'static str),

    #[error("could not override '{0}': key not found (use '+{0}=...' to add it)")]
    UnknownKey(String),

    #[error("could not add '{0}': key already exists (use '++{0}=...' to force)")]
    KeyExists(String),

    #[error("missing mandatory value: {0}")]
    MissingValue(String),

    #[error("interpolation cycle detected at '{0}'")]
    InterpolationCycle(String),

    #[error("interpolation key '{key}' not found (referenced from '{from}')")]
    InterpolationKeyNotFound { key: String, from: String },

    #[error("invalid interpolation '{expr}' at '{path}'")]
    InvalidInterpolation { expr: String, path: String },

    #[error("environment variable '{0}' is not set")]
    EnvNotSet(String),

    #[error("context keys collide after flattening: '{0}'")]
    ContextCollision(String),

    #[error("no template set (expected a `_template_` value or an explicit template)")]
    NoTemplate,

    #[error("template '{name}' not found; searched: {}", format_paths(.searched))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    #[error("template error in '{template}': {}", error_chain(.source))]
    Template {
        template: String,
        #[source]
        source: tera::Error,
    },

    #[error("no renderable registered for '{0}'")]
    NoRenderable(String),

    #[error("duplicate parameter name '{0}'")]
    DuplicateParameter(String),

    #[error("parameter '{0}' conflicts with another parameter of a different shape")]
    ConflictingParameter(String),

    #[error("failed to serialize: {0}")]
    Serialize(String),

    #[error("config does not match '{target}': {message}")]
    Convert { target: String, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for TextconfError {
    fn from(err: figment::Error) -> Self {
        TextconfError::Load(Box::new(err))
    }
}

impl TextconfError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TextconfError::Io { path: path.into(), source }
    }

    pub(crate) fn template(template: impl Into<String>, source: tera::Error) -> Self {
        TextconfError::Template { template: template.into(), source }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}

/// Tera nests the interesting message a few sources deep.
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = std::error::Error::source(inner);
    }
    parts.join(": ")
}
