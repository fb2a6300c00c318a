// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mdag verify`

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use mdag_storage::WalReader;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct VerifyArgs {
    /// WAL file to verify
    pub wal: Option<PathBuf>,
}

#[derive(Serialize)]
struct VerifyReport {
    wal: PathBuf,
    valid_entries: u64,
    skipped_lines: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_skipped: Option<String>,
    nodes: usize,
    edges: usize,
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: ok", self.wal.display())?;
        writeln!(f, "  nodes: {}  edges: {}", self.nodes, self.edges)?;
        writeln!(
            f,
            "  entries: {} valid, {} skipped",
            self.valid_entries, self.skipped_lines
        )?;
        if let Some(first) = &self.first_skipped {
            writeln!(f, "  first skipped: {}", first)?;
        }
        Ok(())
    }
}

pub fn run(wal: &Path, format: OutputFormat) -> Result<()> {
    let graph = super::restore_graph(wal)?;
    let validation = WalReader::open_or_empty(wal).validate()?;

    let report = VerifyReport {
        wal: wal.to_path_buf(),
        valid_entries: validation.valid_entries,
        skipped_lines: validation.skipped_lines,
        first_skipped: validation
            .first_skipped
            .map(|s| format!("line {}: {}", s.line, s.reason)),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    };
    output::print(&report, format)
}
