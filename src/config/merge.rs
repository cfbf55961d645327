//! CLI overrides applied on top of loaded settings

use crate::domain::{ContextStyle, Settings};
use std::path::PathBuf;

/// Values given on the command line. `None` / empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub template_dirs: Vec<PathBuf>,
    pub template_subdir: Option<String>,
    pub context_style: Option<ContextStyle>,
    pub separator: Option<String>,
    pub lenient: bool,
    pub output_dir: Option<PathBuf>,
}

/// Merge CLI values over settings (CLI > env > file > defaults).
///
/// Template directories from the CLI are searched before configured ones.
pub fn merge_cli_with_settings(mut settings: Settings, cli: CliOverrides) -> Settings {
    if !cli.template_dirs.is_empty() {
        let mut dirs = cli.template_dirs;
        dirs.extend(settings.template_dirs);
        settings.template_dirs = dirs;
    }
    if let Some(subdir) = cli.template_subdir {
        settings.template_subdir = Some(subdir);
    }
    if let Some(style) = cli.context_style {
        settings.context_style = style;
    }
    if let Some(separator) = cli.separator {
        settings.separator = separator;
    }
    if cli.lenient {
        settings.strict = false;
    }
    if let Some(dir) = cli.output_dir {
        settings.output_dir = Some(dir);
    }
    settings
}
