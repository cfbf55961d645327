//! Settings file loading

use crate::domain::Settings;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 2] = ["textconf.toml", ".textconf.toml"];
const ENV_PREFIX: &str = "TEXTCONF_";

/// Load settings: defaults, then the settings file, then `TEXTCONF_*` variables.
///
/// An explicit `settings_path` must parse. A discovered file that fails to
/// parse is skipped with a warning. Invalid environment values are errors.
/// `TEXTCONF_TEMPLATE_DIRS` is a path list split like `PATH`.
pub fn load_settings(start_dir: &Path, settings_path: Option<&Path>) -> Result<Settings> {
    load_with_prefix(start_dir, settings_path, ENV_PREFIX)
}

fn load_with_prefix(
    start_dir: &Path,
    settings_path: Option<&Path>,
    prefix: &str,
) -> Result<Settings> {
    let explicit = settings_path.is_some();
    let discovered = match settings_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_settings(start_dir),
    };

    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(file) = discovered {
        match read_settings_table(&file) {
            Ok(table) => {
                tracing::debug!("using settings file {}", file.display());
                figment = figment.merge(Serialized::defaults(table));
            }
            Err(e) if explicit => return Err(e),
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {:#}", file.display(), e);
            }
        }
    }

    figment = figment.merge(Env::prefixed(prefix).ignore(&["template_dirs"]));
    if let Some(raw) = std::env::var_os(format!("{prefix}TEMPLATE_DIRS")) {
        let dirs: Vec<PathBuf> = std::env::split_paths(&raw).collect();
        figment = figment.merge(Serialized::default("template_dirs", dirs));
    }
    figment
        .extract::<Settings>()
        .with_context(|| format!("Invalid settings from {prefix}* environment"))
}

/// Read a settings file, using its `[textconf]` table when present.
fn read_settings_table(path: &Path) -> Result<toml::Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed reading settings file: {}", path.display()))?;
    let raw: toml::Value = toml::from_str(&content)
        .with_context(|| format!("Invalid TOML syntax: {}", path.display()))?;
    let table = raw.get("textconf").cloned().unwrap_or(raw);

    // Validate eagerly so a bad explicit file fails with a useful message.
    let _: Settings = table
        .clone()
        .try_into()
        .with_context(|| format!("Invalid settings file: {}", path.display()))?;
    Ok(table)
}

/// Look for a settings file in `start_dir` and its ancestors.
pub fn discover_settings(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .flat_map(|dir| CANDIDATES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}
