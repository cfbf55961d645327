//! Shared types: tool settings and rendering options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How a configuration object is exposed to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextStyle {
    /// Pass the mapping through unchanged: `{{ model.lr }}`.
    #[default]
    Nested,
    /// Join nested keys with a separator: `{{ model_lr }}`.
    Flat,
}

impl FromStr for ContextStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nested" => Ok(ContextStyle::Nested),
            "flat" => Ok(ContextStyle::Flat),
            other => Err(format!("Invalid context style: {} (expected nested|flat)", other)),
        }
    }
}

impl fmt::Display for ContextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextStyle::Nested => write!(f, "nested"),
            ContextStyle::Flat => write!(f, "flat"),
        }
    }
}

/// Output format for `show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Toml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "toml" => Ok(OutputFormat::Toml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Invalid output format: {} (expected yaml|toml|json)", other)),
        }
    }
}

/// Tool settings, read from `textconf.toml` and `TEXTCONF_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extra directories searched for templates, after the working directory.
    pub template_dirs: Vec<PathBuf>,
    /// Subdirectory tried inside every search root (e.g. `templates`).
    pub template_subdir: Option<String>,
    pub context_style: ContextStyle,
    /// Separator for flattened keys.
    pub separator: String,
    /// Treat `???` values as errors and require override keys to exist.
    pub strict: bool,
    /// Base directory for relative output paths.
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_dirs: Vec::new(),
            template_subdir: None,
            context_style: ContextStyle::Nested,
            separator: "_".to_string(),
            strict: true,
            output_dir: None,
        }
    }
}
