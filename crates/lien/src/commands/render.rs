//! Render command - Bind a template against a scope and print the result
//!
//! Loads the template into an in-memory element tree, seeds the global scope
//! from a JSON file, runs the declaration sweep and one sync, then prints the
//! visible markup.

use clap::{Args, ValueEnum};
use lien_armature::MarkupError;
use lien_atelier_dom::{BindError, Binder, MemoryDom, SyncReport};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{load_config, ConfigError};

#[derive(Args)]
pub struct RenderArgs {
    /// Template markup file
    pub template: PathBuf,

    /// JSON file holding the initial global scope (a mapping)
    #[arg(long, short)]
    pub scope: Option<PathBuf>,

    /// Options file (JSON or TOML); defaults to ./lien.config.json
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
}

/// JSON output structure
#[derive(Serialize)]
struct JsonOutput {
    markup: String,
    scope: Value,
    report: SyncReport,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse scope {}: {source}", path.display())]
    Scope {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("scope {} must hold a JSON object", path.display())]
    ScopeShape { path: PathBuf },

    #[error("failed to parse template: {0}")]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

pub fn run(args: RenderArgs) {
    match render(&args) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e}");
            std::process::exit(1);
        }
    }
}

fn render(args: &RenderArgs) -> Result<String, RenderError> {
    let config = load_config(args.config.as_deref())?;
    let markup = read(&args.template)?;
    let scope = match &args.scope {
        Some(path) => read_scope(path)?,
        None => Map::new(),
    };
    render_markup(&markup, scope, config.options, args.format)
}

fn read(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_scope(path: &Path) -> Result<Map<String, Value>, RenderError> {
    let content = read(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|source| RenderError::Scope {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RenderError::ScopeShape {
            path: path.to_path_buf(),
        }),
    }
}

/// Bind `markup` against `scope` and serialize the outcome
pub(crate) fn render_markup(
    markup: &str,
    scope: Map<String, Value>,
    options: lien_atelier_dom::BinderOptions,
    format: OutputFormat,
) -> Result<String, RenderError> {
    let mut dom = MemoryDom::parse(markup)?;
    let mut binder = Binder::with_scope(scope);
    binder.set_options(options);

    let root = dom.root();
    let created = binder.init(&mut dom, root, binder.global())?;
    let report = binder.sync(&mut dom)?;
    tracing::info!(
        bindings = created,
        passes = report.passes,
        converged = report.converged,
        "rendered"
    );

    Ok(match format {
        OutputFormat::Html => dom.render_visible(),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonOutput {
            markup: dom.render_visible(),
            scope: binder.scopes().as_value(binder.global()),
            report,
        })?,
    })
}
