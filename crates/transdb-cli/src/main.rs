//! transdb command-line client.
//!
//! Batch import and export of XLIFF files, plus language management, against
//! a local translation database.

mod commands;
mod formatter;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transdb_core::Engine;

/// transdb command-line client
#[derive(Parser, Debug)]
#[command(name = "transdb")]
#[command(version, about = "Import and export XLIFF translations")]
pub struct Args {
    /// Path to the SQLite database (created if missing)
    pub database: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import every .xliff file of a directory, in file name order
    Import { dir: PathBuf },
    /// Export a domain to one file per language
    Export { domain: String, dir: PathBuf },
    /// Manage registered languages
    #[command(subcommand)]
    Language(LanguageCommand),
    /// List domain names
    Domains,
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommand {
    /// Register a language
    Add { code: String, name: String },
    /// List registered languages
    List,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transdb=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let engine = Engine::open(&args.database)
        .with_context(|| format!("opening {}", args.database.display()))?;
    let output = commands::execute(&engine, args.command)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
