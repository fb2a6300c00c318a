// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mdag export` and `mdag import`

use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Args;
use mdag_core::GraphExport;
use mdag_storage::WalCompactor;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ExportArgs {
    /// WAL file to export
    pub wal: Option<PathBuf>,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Exported graph document
    pub input: PathBuf,
    /// WAL file to create
    pub wal: Option<PathBuf>,
    /// Replace an existing, non-empty WAL
    #[arg(long)]
    pub force: bool,
}

#[derive(Serialize)]
struct TransferReport {
    action: &'static str,
    path: PathBuf,
    nodes: usize,
    edges: usize,
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} nodes and {} edges: {}",
            self.action,
            self.nodes,
            self.edges,
            self.path.display()
        )
    }
}

pub fn export(wal: &Path, output_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let graph = super::restore_graph(wal)?;
    let json = graph.export().to_json()?;

    let Some(path) = output_path else {
        println!("{}", json);
        return Ok(());
    };
    std::fs::write(path, json + "\n")
        .with_context(|| format!("cannot write {}", path.display()))?;

    let report = TransferReport {
        action: "Exported",
        path: path.to_path_buf(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };
    output::print(&report, format)
}

pub fn import(input: &Path, wal: &Path, force: bool, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("cannot read {}", input.display()))?;
    let graph = GraphExport::from_json(&content)?
        .into_graph()
        .with_context(|| format!("invalid graph in {}", input.display()))?;
    graph
        .verify_integrity()
        .with_context(|| format!("invalid graph in {}", input.display()))?;

    let occupied = std::fs::metadata(wal).map(|m| m.len() > 0).unwrap_or(false);
    if occupied && !force {
        bail!(
            "{} already exists; pass --force to replace it",
            wal.display()
        );
    }

    WalCompactor::new()
        .write_graph(wal, &graph)
        .with_context(|| format!("cannot write {}", wal.display()))?;

    let report = TransferReport {
        action: "Imported",
        path: wal.to_path_buf(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };
    output::print(&report, format)
}
