// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State projection: numbered aggregate snapshots of the graph
//!
//! The projector owns the epoch counter and the snapshot history. Projecting
//! is a pure read of the graph; only [`StateProjector::create_snapshot`]
//! advances the epoch.

use crate::clock::{Clock, SystemClock};
use crate::graph::DagGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors from snapshot lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("epoch not found in snapshot history: {0}")]
    EpochNotFound(u64),
}

/// Point-in-time aggregate of the whole graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalNetworkState {
    pub epoch: u64,
    pub timestamp: DateTime<Utc>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_counts_by_type: BTreeMap<String, usize>,
    pub edge_counts_by_operation: BTreeMap<String, usize>,
    pub root_node_ids: Vec<Uuid>,
    pub leaf_node_ids: Vec<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<u64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl fmt::Display for GlobalNetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "epoch {} at {}", self.epoch, self.timestamp.to_rfc3339())?;
        writeln!(
            f,
            "  nodes: {}  edges: {}  roots: {}  leaves: {}",
            self.total_nodes,
            self.total_edges,
            self.root_node_ids.len(),
            self.leaf_node_ids.len()
        )?;
        for (type_name, count) in &self.node_counts_by_type {
            writeln!(f, "  node {:<24} {}", type_name, count)?;
        }
        for (operation, count) in &self.edge_counts_by_operation {
            writeln!(f, "  edge {:<24} {}", operation, count)?;
        }
        if let Some(confidence) = self.average_confidence {
            writeln!(f, "  average confidence: {:.3}", confidence)?;
        }
        if let Some(duration) = self.total_duration_ms {
            writeln!(f, "  total duration: {}ms", duration)?;
        }
        Ok(())
    }
}

/// Difference between two snapshots in history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDelta {
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub node_delta: i64,
    pub edge_delta: i64,
    pub timestamp: DateTime<Utc>,
    /// Per-type node count changes (zero changes omitted)
    pub node_type_deltas: BTreeMap<String, i64>,
    /// Per-operation edge count changes (zero changes omitted)
    pub operation_deltas: BTreeMap<String, i64>,
}

/// Aggregates a graph into an append-only history of numbered snapshots
#[derive(Debug, Clone)]
pub struct StateProjector<C: Clock = SystemClock> {
    clock: C,
    epoch: u64,
    history: Vec<GlobalNetworkState>,
}

impl StateProjector<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for StateProjector<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> StateProjector<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            epoch: 0,
            history: Vec::new(),
        }
    }

    /// Epoch the next snapshot will carry
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn history(&self) -> &[GlobalNetworkState] {
        &self.history
    }

    /// Aggregate the graph without touching epoch or history
    pub fn project_current_state(
        &self,
        graph: &DagGraph,
        metadata: BTreeMap<String, String>,
    ) -> GlobalNetworkState {
        let mut node_counts_by_type: BTreeMap<String, usize> = BTreeMap::new();
        for node in graph.nodes() {
            *node_counts_by_type
                .entry(node.type_name().to_string())
                .or_default() += 1;
        }

        let mut edge_counts_by_operation: BTreeMap<String, usize> = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut confidence_count = 0usize;
        let mut total_duration: Option<u64> = None;
        for edge in graph.edges() {
            *edge_counts_by_operation
                .entry(edge.operation_name().to_string())
                .or_default() += 1;
            if let Some(confidence) = edge.confidence() {
                confidence_sum += confidence;
                confidence_count += 1;
            }
            if let Some(duration) = edge.duration_ms() {
                total_duration = Some(total_duration.unwrap_or(0).saturating_add(duration));
            }
        }

        GlobalNetworkState {
            epoch: self.epoch,
            timestamp: self.clock.now(),
            total_nodes: graph.node_count(),
            total_edges: graph.edge_count(),
            node_counts_by_type,
            edge_counts_by_operation,
            root_node_ids: graph.root_nodes().iter().map(|n| n.id()).collect(),
            leaf_node_ids: graph.leaf_nodes().iter().map(|n| n.id()).collect(),
            average_confidence: (confidence_count > 0)
                .then(|| confidence_sum / confidence_count as f64),
            total_duration_ms: total_duration,
            metadata,
        }
    }

    /// Project, append to history and advance the epoch
    pub fn create_snapshot(
        &mut self,
        graph: &DagGraph,
        metadata: BTreeMap<String, String>,
    ) -> GlobalNetworkState {
        let snapshot = self.project_current_state(graph, metadata);
        self.history.push(snapshot.clone());
        self.epoch += 1;
        tracing::debug!(
            epoch = snapshot.epoch,
            nodes = snapshot.total_nodes,
            edges = snapshot.total_edges,
            "snapshot created"
        );
        snapshot
    }

    pub fn snapshot(&self, epoch: u64) -> Option<&GlobalNetworkState> {
        self.history.iter().find(|s| s.epoch == epoch)
    }

    pub fn latest_snapshot(&self) -> Option<&GlobalNetworkState> {
        self.history.last()
    }

    /// Count differences from `from_epoch` to `to_epoch`
    pub fn compute_delta(&self, from_epoch: u64, to_epoch: u64) -> Result<StateDelta, ProjectionError> {
        let from = self
            .snapshot(from_epoch)
            .ok_or(ProjectionError::EpochNotFound(from_epoch))?;
        let to = self
            .snapshot(to_epoch)
            .ok_or(ProjectionError::EpochNotFound(to_epoch))?;

        Ok(StateDelta {
            from_epoch,
            to_epoch,
            node_delta: to.total_nodes as i64 - from.total_nodes as i64,
            edge_delta: to.total_edges as i64 - from.total_edges as i64,
            timestamp: from.timestamp.max(to.timestamp),
            node_type_deltas: count_deltas(&from.node_counts_by_type, &to.node_counts_by_type),
            operation_deltas: count_deltas(
                &from.edge_counts_by_operation,
                &to.edge_counts_by_operation,
            ),
        })
    }
}

fn count_deltas(
    from: &BTreeMap<String, usize>,
    to: &BTreeMap<String, usize>,
) -> BTreeMap<String, i64> {
    from.keys()
        .chain(to.keys())
        .filter_map(|key| {
            let before = from.get(key).copied().unwrap_or(0) as i64;
            let after = to.get(key).copied().unwrap_or(0) as i64;
            (after != before).then(|| (key.clone(), after - before))
        })
        .collect()
}

#[cfg(test)]
#[path = "projector_tests.rs"]
mod tests;
