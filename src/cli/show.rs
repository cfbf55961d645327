//! Show command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{load_config_object, resolve_settings, ConfigArgs};
use crate::config::CliOverrides;
use crate::domain::OutputFormat;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format: yaml, toml or json
    #[arg(short, long, value_name = "FORMAT", default_value = "yaml")]
    pub format: OutputFormat,

    /// Print `${...}` interpolations as written
    #[arg(long)]
    pub no_resolve: bool,

    /// Allow `???` values and overrides of keys that do not exist
    #[arg(long)]
    pub lenient: bool,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let cli_overrides = CliOverrides { lenient: args.lenient, ..CliOverrides::default() };
    let settings = resolve_settings(args.config.settings.as_deref(), cli_overrides)?;

    let mut cfg = load_config_object(&args.config, settings.strict)?;
    if !args.no_resolve {
        cfg = cfg.resolve(settings.strict)?;
    }

    let text = match args.format {
        OutputFormat::Yaml => cfg.to_yaml()?,
        OutputFormat::Toml => cfg.to_toml()?,
        OutputFormat::Json => cfg.to_json()?,
    };
    print!("{}", text);
    Ok(())
}
