//! Render command implementation

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::output;
use super::utils::{load_config_object, parse_key_value, resolve_settings, ConfigArgs};
use crate::config::CliOverrides;
use crate::domain::ContextStyle;
use crate::render::{check_output, resolve_output_path, write_output, RenderOptions, Renderer};

#[derive(Args)]
pub struct RenderArgs {
    /// Template name or path (default: the config's `_template_` value)
    #[arg(value_name = "TEMPLATE")]
    pub template: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Extra top-level template value, VALUE read as YAML (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, Value)>,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Do not write; exit with code 1 if the output file would change
    #[arg(long, requires = "output")]
    pub check: bool,

    /// Flatten nested keys into `parent_child` names
    #[arg(long)]
    pub flat: bool,

    /// Separator for flattened keys
    #[arg(long, value_name = "SEP")]
    pub separator: Option<String>,

    /// Directory searched for templates (repeatable; searched before configured ones)
    #[arg(long = "template-dir", value_name = "DIR")]
    pub template_dirs: Vec<PathBuf>,

    /// Subdirectory tried inside every template search root
    #[arg(long, value_name = "DIR")]
    pub template_subdir: Option<String>,

    /// Allow `???` values and overrides of keys that do not exist
    #[arg(long)]
    pub lenient: bool,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let cli_overrides = CliOverrides {
        template_dirs: args.template_dirs,
        template_subdir: args.template_subdir,
        context_style: args.flat.then_some(ContextStyle::Flat),
        separator: args.separator,
        lenient: args.lenient,
        output_dir: None,
    };
    let settings = resolve_settings(args.config.settings.as_deref(), cli_overrides)?;
    tracing::debug!("settings: {:?}", settings);

    let mut cfg = load_config_object(&args.config, settings.strict)?;

    let mut options = RenderOptions::new().extras(args.vars.into_iter().collect::<Map<_, _>>());
    if let Some(template) = args.template {
        options = options.template(template);
    }

    let renderer = Renderer::new(settings);
    let text = renderer.render(&mut cfg, &options).context("Failed to render")?;

    let Some(path) = args.output else {
        print!("{}", text);
        return Ok(());
    };
    let path = resolve_output_path(renderer.settings(), &path);

    if args.check {
        if check_output(&path, &text) {
            output::success(format!("{} is up to date", path.display()));
            return Ok(());
        }
        output::error(format!("{} would change", path.display()));
        std::process::exit(1);
    }

    let outcome = write_output(&path, &text)?;
    output::written(outcome, &path);
    Ok(())
}
