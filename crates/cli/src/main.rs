// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! mdag - maintenance tool for provenance graph write-ahead logs

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{compact, export, lineage, stats, verify};
use mdag_engine::EngineConfig;
use output::OutputFormat;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "mdag",
    version,
    about = "Inspect, verify and compact provenance graph logs"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Engine config file; supplies the WAL path when none is given
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore the graph and check every hash and endpoint
    Verify(verify::VerifyArgs),
    /// Summarize the graph by node type and operation
    Stats(stats::StatsArgs),
    /// Rewrite the log without malformed or duplicate entries
    Compact(compact::CompactArgs),
    /// Write the whole graph as one JSON document
    Export(export::ExportArgs),
    /// Build a fresh log from an exported graph
    Import(export::ImportArgs),
    /// Show the transitions that led to a node
    Lineage(lineage::LineageArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit WAL argument, else the configured one
fn resolve_wal(explicit: Option<PathBuf>, config: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    Ok(config.wal_path)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let format = cli.format;

    match cli.command {
        Commands::Verify(args) => verify::run(&resolve_wal(args.wal, config)?, format),
        Commands::Stats(args) => stats::run(&resolve_wal(args.wal, config)?, format),
        Commands::Compact(args) => compact::run(&resolve_wal(args.wal, config)?, format),
        Commands::Export(args) => {
            let wal = resolve_wal(args.wal, config)?;
            export::export(&wal, args.output.as_deref(), format)
        }
        Commands::Import(args) => {
            let wal = resolve_wal(args.wal, config)?;
            export::import(&args.input, &wal, args.force, format)
        }
        Commands::Lineage(args) => {
            let wal = resolve_wal(args.wal, config)?;
            lineage::run(&wal, &args.node_id, format)
        }
    }
}
