// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Graph plus write-ahead log, with crash recovery
//!
//! Mutations are validated against the in-memory graph, appended to the
//! log, and only then applied. A failed append leaves the graph untouched.

use crate::entry::WalRecord;
use crate::persistence::{GraphPersistence, PersistenceError};
use mdag_core::{CancelFlag, DagGraph, GraphError, MonadNode, TransitionEdge};
use thiserror::Error;

/// Number of replay failures quoted in a restore error
const REPLAY_ERROR_SUMMARY: usize = 5;

/// Errors from restoring a graph out of its log
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("{total} WAL entries failed to apply: {summary}")]
    Replay { total: usize, summary: String },
    #[error("restored graph failed integrity check: {0}")]
    Integrity(GraphError),
    #[error("restore cancelled")]
    Cancelled,
}

/// Errors from a durable mutation
#[derive(Debug, Error)]
pub enum DurableError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A [`DagGraph`] whose every mutation is logged
pub struct DurableGraph<P> {
    graph: DagGraph,
    persistence: P,
}

impl<P: GraphPersistence> DurableGraph<P> {
    /// Empty graph over a fresh log
    pub fn new(persistence: P) -> Self {
        Self {
            graph: DagGraph::new(),
            persistence,
        }
    }

    /// Rebuild the graph by replaying the log from the start
    pub fn restore(persistence: P) -> Result<Self, RestoreError> {
        Self::restore_cancellable(persistence, &CancelFlag::new())
    }

    /// Like [`DurableGraph::restore`], checking `cancel` between entries
    ///
    /// A cancelled restore drops the partial graph.
    pub fn restore_cancellable(persistence: P, cancel: &CancelFlag) -> Result<Self, RestoreError> {
        let mut graph = DagGraph::new();
        let mut failures: Vec<String> = Vec::new();
        let mut applied = 0usize;
        let mut duplicates = 0usize;

        for record in persistence.replay()? {
            if cancel.is_cancelled() {
                tracing::info!(applied, "WAL restore cancelled");
                return Err(RestoreError::Cancelled);
            }
            match apply_record(&mut graph, record?) {
                Ok(Applied::New) => applied += 1,
                Ok(Applied::Duplicate) => duplicates += 1,
                Err(e) => failures.push(e.to_string()),
            }
        }
        if cancel.is_cancelled() {
            return Err(RestoreError::Cancelled);
        }

        if !failures.is_empty() {
            let total = failures.len();
            let mut summary = failures
                .into_iter()
                .take(REPLAY_ERROR_SUMMARY)
                .collect::<Vec<_>>()
                .join("; ");
            if total > REPLAY_ERROR_SUMMARY {
                summary.push_str(&format!(" (and {} more)", total - REPLAY_ERROR_SUMMARY));
            }
            tracing::warn!(total, "WAL restore failed");
            return Err(RestoreError::Replay { total, summary });
        }

        graph.verify_integrity().map_err(RestoreError::Integrity)?;

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            applied,
            duplicates,
            "restored graph from WAL"
        );
        Ok(Self { graph, persistence })
    }

    /// Validate, log, then insert a node
    pub fn add_node_durable(&mut self, node: MonadNode) -> Result<(), DurableError> {
        self.graph.check_node(&node)?;
        self.persistence.append_node(&node)?;
        self.graph.add_node(node)?;
        Ok(())
    }

    /// Validate, log, then insert an edge
    pub fn add_edge_durable(&mut self, edge: TransitionEdge) -> Result<(), DurableError> {
        self.graph.check_edge(&edge)?;
        self.persistence.append_edge(&edge)?;
        self.graph.add_edge(edge)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), PersistenceError> {
        self.persistence.flush()
    }

    pub fn close(&self) -> Result<(), PersistenceError> {
        self.persistence.close()
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_parts(self) -> (DagGraph, P) {
        (self.graph, self.persistence)
    }
}

enum Applied {
    New,
    Duplicate,
}

/// Apply one replayed record, treating an identical re-append as a no-op
fn apply_record(graph: &mut DagGraph, record: WalRecord) -> Result<Applied, GraphError> {
    match record {
        WalRecord::AddNode(node) => {
            if graph.node(&node.id()).is_some_and(|n| n.hash() == node.hash()) {
                return Ok(Applied::Duplicate);
            }
            graph.add_node(node)?;
        }
        WalRecord::AddEdge(edge) => {
            if graph.edge(&edge.id()).is_some_and(|e| e.hash() == edge.hash()) {
                return Ok(Applied::Duplicate);
            }
            graph.add_edge(edge)?;
        }
    }
    Ok(Applied::New)
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
