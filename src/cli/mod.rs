//! Command-line interface for textconf
//!
//! Provides `render`, `show`, `scaffold` and `completions` subcommands.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod output;
mod render;
mod scaffold;
mod show;
mod utils;

/// Render config files and launch scripts from hierarchical configs
#[derive(Parser)]
#[command(name = "textconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template from config files and overrides
    Render(Box<render::RenderArgs>),

    /// Print the merged and resolved configuration
    Show(show::ShowArgs),

    /// Turn text with `{name=default}` placeholders into a template and defaults
    Scaffold(scaffold::ScaffoldArgs),

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // A set RUST_LOG wins; otherwise --verbose picks DEBUG over the WARN default.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
        EnvFilter::default().add_directive(level.into())
    });
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Render(args) => render::run(*args),
        Commands::Show(args) => show::run(args),
        Commands::Scaffold(args) => scaffold::run(args),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "textconf", &mut std::io::stdout());
            Ok(())
        }
    }
}
