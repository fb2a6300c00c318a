// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persistence contract the durable graph is written against

use crate::entry::{decode_line, WalEntry, WalRecord};
use chrono::Utc;
use mdag_core::{MonadNode, TransitionEdge};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a persistence backend
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write-ahead log is closed")]
    Closed,
}

/// Lazy, finite stream of replayed records
pub type ReplayIter<'a> = Box<dyn Iterator<Item = Result<WalRecord, PersistenceError>> + Send + 'a>;

/// An append-only log of graph mutations
///
/// `replay` restarts from the first entry on every call. Malformed entries
/// are skipped; only backend failures surface as `Err` items.
pub trait GraphPersistence: Send + Sync {
    fn append_node(&self, node: &MonadNode) -> Result<(), PersistenceError>;

    fn append_edge(&self, edge: &TransitionEdge) -> Result<(), PersistenceError>;

    /// Durability boundary: appends before a successful flush survive a crash
    fn flush(&self) -> Result<(), PersistenceError>;

    fn replay(&self) -> Result<ReplayIter<'_>, PersistenceError>;

    fn close(&self) -> Result<(), PersistenceError>;
}

impl<P: GraphPersistence + ?Sized> GraphPersistence for Arc<P> {
    fn append_node(&self, node: &MonadNode) -> Result<(), PersistenceError> {
        (**self).append_node(node)
    }

    fn append_edge(&self, edge: &TransitionEdge) -> Result<(), PersistenceError> {
        (**self).append_edge(edge)
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        (**self).flush()
    }

    fn replay(&self) -> Result<ReplayIter<'_>, PersistenceError> {
        (**self).replay()
    }

    fn close(&self) -> Result<(), PersistenceError> {
        (**self).close()
    }
}

#[derive(Debug, Default)]
struct MemoryLog {
    lines: Vec<String>,
    closed: bool,
}

/// In-process log holding serialized lines
///
/// Uses the same line format as [`crate::FileWal`], so corrupted input can be
/// injected with [`MemoryWal::push_raw_line`].
#[derive(Debug, Default)]
pub struct MemoryWal {
    log: Mutex<MemoryLog>,
}

impl MemoryWal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line verbatim, bypassing encoding
    pub fn push_raw_line(&self, line: impl Into<String>) {
        self.log.lock().lines.push(line.into());
    }

    pub fn lines(&self) -> Vec<String> {
        self.log.lock().lines.clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn append_entry(&self, entry: WalEntry) -> Result<(), PersistenceError> {
        let line = entry.to_line()?;
        let mut log = self.log.lock();
        if log.closed {
            return Err(PersistenceError::Closed);
        }
        log.lines.push(line);
        Ok(())
    }
}

impl GraphPersistence for MemoryWal {
    fn append_node(&self, node: &MonadNode) -> Result<(), PersistenceError> {
        self.append_entry(WalEntry::for_node(node, Utc::now())?)
    }

    fn append_edge(&self, edge: &TransitionEdge) -> Result<(), PersistenceError> {
        self.append_entry(WalEntry::for_edge(edge, Utc::now())?)
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn replay(&self) -> Result<ReplayIter<'_>, PersistenceError> {
        let lines = self.lines();
        let records = lines
            .into_iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                match decode_line(line) {
                    Ok(record) => Some(Ok(record)),
                    Err(reason) => {
                        tracing::warn!(line = index + 1, %reason, "skipping malformed WAL line");
                        None
                    }
                }
            });
        Ok(Box::new(records))
    }

    fn close(&self) -> Result<(), PersistenceError> {
        self.log.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
