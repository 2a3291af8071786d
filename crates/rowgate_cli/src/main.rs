//! ROWGATE CLI
//!
//! Compiles partially evaluated authorization policies into data store filters.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod config;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use commands::InputFormat;
use config::CliConfig;
use rowgate_backend::Backend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "rowgate_cli=info,rowgate_compile=info,rowgate_backend=info";

#[derive(Parser)]
#[command(name = "rowgate")]
#[command(about = "ROWGATE - Row-level authorization filters from policy residuals")]
#[command(long_about = None)]
struct Cli {
    /// Path to JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a residual into a backend filter
    Compile {
        /// Path to residual file
        #[arg(short, long)]
        residual: PathBuf,
        /// Residual file layout
        #[arg(short, long, value_enum, default_value_t = InputFormat::Native)]
        format: InputFormat,
        /// Target backend, overriding the config
        #[arg(short, long)]
        backend: Option<Backend>,
    },
    /// Print the compile API request for an input document
    Request {
        /// Path to input document
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Resolve a reference into collection and field path
    Resolve {
        /// Reference, e.g. data.elastic.posts[_].author
        reference: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Compile {
            residual,
            format,
            backend,
        } => commands::compile(&config, &residual, format, backend)?,
        Commands::Request { input } => commands::request(&config, &input)?,
        Commands::Resolve { reference } => commands::resolve(&reference)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
