//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::conf::overrides::parse_value;
use crate::conf::ConfigObject;
use crate::config::{load_settings, merge_cli_with_settings, CliOverrides};
use crate::domain::Settings;

/// Config sources shared by `render` and `show`.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Config file (YAML, TOML or JSON); repeat to merge several in order
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub configs: Vec<PathBuf>,

    /// Override: key=value, +key=value (add), ++key=value (force), ~key (delete)
    #[arg(short = 's', long = "set", value_name = "OVERRIDE", allow_hyphen_values = true)]
    pub overrides: Vec<String>,

    /// Settings file (default: textconf.toml found in the working directory or above)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,
}

/// Parse `KEY=VALUE`, reading VALUE as YAML (`3` is a number, `[a, b]` a list).
pub fn parse_key_value(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) =
        s.split_once('=').ok_or_else(|| format!("invalid value '{s}': expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid value '{s}': empty key"));
    }
    Ok((key.to_string(), parse_value(value)))
}

/// Load settings for the working directory and apply CLI values on top.
pub fn resolve_settings(settings_path: Option<&Path>, cli: CliOverrides) -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let settings = load_settings(&cwd, settings_path)?;
    Ok(merge_cli_with_settings(settings, cli))
}

/// Merge the config files, then apply overrides.
pub fn load_config_object(args: &ConfigArgs, strict: bool) -> Result<ConfigObject> {
    let mut cfg = if args.configs.is_empty() {
        ConfigObject::new()
    } else {
        ConfigObject::load(&args.configs).context("Failed to load config")?
    };
    // Nothing to check existence against without a config file.
    let strict = strict && !args.configs.is_empty();
    cfg.apply_overrides(&args.overrides, strict).context("Failed to apply overrides")?;
    Ok(cfg)
}
