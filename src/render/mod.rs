//! Rendering: template lookup, context assembly, Tera rendering and output

pub mod context;
pub mod engine;
pub mod filters;
pub mod output;
pub mod renderable;
pub mod template;

pub use context::{flatten, ContextBuilder, ContextLayer};
pub use engine::TemplateEngine;
pub use output::{check_output, resolve_output_path, write_output, WriteOutcome};
pub use renderable::{Dispatch, RenderOptions, Renderable, Renderer};
pub use template::TemplateLocator;
