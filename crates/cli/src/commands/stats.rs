// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mdag stats`

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use mdag_core::StateProjector;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct StatsArgs {
    /// WAL file to summarize
    pub wal: Option<PathBuf>,
}

pub fn run(wal: &Path, format: OutputFormat) -> Result<()> {
    let graph = super::restore_graph(wal)?;
    let mut metadata = BTreeMap::new();
    metadata.insert("wal".to_string(), wal.display().to_string());

    let state = StateProjector::new().project_current_state(&graph, metadata);
    output::print(&state, format)
}
