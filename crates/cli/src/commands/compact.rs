// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mdag compact`

use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Args;
use mdag_storage::{CompactionResult, WalCompactor};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct CompactArgs {
    /// WAL file to compact in place; stop all writers first
    pub wal: Option<PathBuf>,
}

#[derive(Serialize)]
struct CompactReport {
    wal: PathBuf,
    #[serde(flatten)]
    result: CompactionResult,
}

impl fmt::Display for CompactReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Compacted {}: {} -> {} entries, {} bytes reclaimed",
            self.wal.display(),
            self.result.entries_before,
            self.result.entries_after,
            self.result.bytes_reclaimed
        )
    }
}

pub fn run(wal: &Path, format: OutputFormat) -> Result<()> {
    if !wal.is_file() {
        bail!("WAL not found: {}", wal.display());
    }
    let result = WalCompactor::new()
        .compact(wal)
        .with_context(|| format!("cannot compact {}", wal.display()))?;

    let report = CompactReport {
        wal: wal.to_path_buf(),
        result,
    };
    output::print(&report, format)
}
