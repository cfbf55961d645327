//! textconf: render config files and launch scripts from hierarchical configs
//!
//! A configuration object (merged YAML/TOML/JSON files plus `key=value`
//! overrides, with `${...}` interpolation) is turned into a Tera context and
//! rendered through a template found next to the config or in configured
//! template directories.

pub mod cli;
pub mod conf;
pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod scaffold;
pub mod testing;
pub mod utils;

pub use conf::ConfigObject;
pub use domain::{ContextStyle, OutputFormat, Settings};
pub use error::{Result, TextconfError};
pub use render::{
    ContextBuilder, ContextLayer, Dispatch, RenderOptions, Renderable, Renderer, TemplateEngine,
    TemplateLocator, WriteOutcome,
};
pub use scaffold::Scaffold;
