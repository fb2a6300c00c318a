// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Offline WAL compaction
//!
//! Rewrites a log as its minimal equivalent: every node in dependency order,
//! then every edge in insertion order. Malformed and duplicate lines are
//! dropped. The rewrite goes to a sibling temp file that is renamed over the
//! original, so a crash leaves either the old log or the new one.
//!
//! Writers must be quiesced while compaction runs.

use crate::durable::{DurableGraph, RestoreError};
use crate::file_wal::FileWal;
use crate::persistence::{GraphPersistence, PersistenceError};
use crate::reader::WalReader;
use mdag_core::{DagGraph, GraphError};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const TEMP_SUFFIX: &str = ".compact.tmp";

/// Errors from compaction; the original log is untouched when one is returned
#[derive(Debug, Error)]
pub enum CompactionError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot restore WAL: {0}")]
    Restore(#[from] RestoreError),
    #[error("cannot order nodes: {0}")]
    Graph(#[from] GraphError),
    #[error("cannot write compacted WAL: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Result of a compaction operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactionResult {
    /// Non-empty lines in the original log, malformed ones included
    pub entries_before: u64,
    pub entries_after: u64,
    pub bytes_reclaimed: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WalCompactor;

impl WalCompactor {
    pub fn new() -> Self {
        Self
    }

    pub fn compact(&self, wal_path: &Path) -> Result<CompactionResult, CompactionError> {
        let bytes_before = fs::metadata(wal_path)?.len();
        let validation = WalReader::open_or_empty(wal_path).validate()?;
        let entries_before = validation.valid_entries + validation.skipped_lines;

        let (graph, source) = DurableGraph::restore(FileWal::open(wal_path)?)?.into_parts();
        source.close()?;

        let entries_after = self.write_graph(wal_path, &graph)?;

        let bytes_after = fs::metadata(wal_path)?.len();
        let result = CompactionResult {
            entries_before,
            entries_after,
            bytes_reclaimed: bytes_before.saturating_sub(bytes_after),
        };

        tracing::info!(
            path = %wal_path.display(),
            entries_before = result.entries_before,
            entries_after = result.entries_after,
            bytes_reclaimed = result.bytes_reclaimed,
            "WAL compacted"
        );
        Ok(result)
    }

    /// Replace the log at `wal_path` with `graph` in its minimal form
    ///
    /// The log is written beside the target and renamed over it; on failure
    /// any existing file at `wal_path` is left as it was. Returns the number
    /// of entries written.
    pub fn write_graph(&self, wal_path: &Path, graph: &DagGraph) -> Result<u64, CompactionError> {
        let temp_path = temp_path_for(wal_path);
        let written = match write_compacted(&temp_path, graph) {
            Ok(count) => count,
            Err(e) => {
                discard(&temp_path);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&temp_path, wal_path) {
            discard(&temp_path);
            return Err(e.into());
        }
        sync_parent_dir(wal_path);
        Ok(written)
    }
}

fn temp_path_for(wal_path: &Path) -> PathBuf {
    let mut name = wal_path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_compacted(temp_path: &Path, graph: &DagGraph) -> Result<u64, CompactionError> {
    let order = graph.topological_sort()?;
    let wal = FileWal::create(temp_path)?;
    for node in order {
        wal.append_node(node)?;
    }
    for edge in graph.edges() {
        wal.append_edge(edge)?;
    }
    wal.flush()?;
    wal.close()?;
    Ok(wal.appended())
}

fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove compaction temp file");
        }
    }
}

fn sync_parent_dir(path: &Path) {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return;
    };
    if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
        tracing::debug!(dir = %parent.display(), error = %e, "directory fsync skipped");
    }
}

#[cfg(test)]
#[path = "compactor_tests.rs"]
mod tests;
