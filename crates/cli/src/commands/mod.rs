// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod compact;
pub mod export;
pub mod lineage;
pub mod stats;
pub mod verify;

use anyhow::{bail, Context, Result};
use mdag_core::DagGraph;
use mdag_storage::{DurableGraph, FileWal, GraphPersistence};
use std::path::Path;

/// Rebuild the graph from an existing WAL, leaving the file as it was
pub(crate) fn restore_graph(wal: &Path) -> Result<DagGraph> {
    if !wal.is_file() {
        bail!("WAL not found: {}", wal.display());
    }
    let persistence =
        FileWal::open(wal).with_context(|| format!("cannot open {}", wal.display()))?;
    let (graph, persistence) = DurableGraph::restore(persistence)
        .with_context(|| format!("cannot restore {}", wal.display()))?
        .into_parts();
    persistence.close()?;
    tracing::debug!(
        wal = %wal.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph restored"
    );
    Ok(graph)
}
