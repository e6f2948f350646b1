//! # lien
//!
//! Lien - Two-way data binding between a scope model and an element tree.
//!
//! ## Name Origin
//!
//! **Lien** (/ljɛ̃/) is French for "link" or "bond". The binder keeps a link
//! between a model and the elements that show it, in both directions. This
//! binary binds templates from the command line and checks expressions.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lien")]
#[command(about = "Two-way data binding between a scope model and an element tree", long_about = None)]
#[command(version, disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    version: (),
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind a template against a scope and print the rendered markup
    #[command(visible_alias = "atelier")]
    Render(commands::render::RenderArgs),

    /// Compile binding expressions and report whether they are two-way
    Check(commands::check::CheckArgs),
}

/// Log to stderr, filtered by `LIEN_LOG` (default `warn`)
fn init_logging() {
    let filter = EnvFilter::try_from_env("LIEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Check(args) => commands::check::run(args),
    }
}
