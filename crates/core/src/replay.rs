// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lineage replay and read-only queries over a graph
//!
//! Lineage reconstruction follows a single canonical path: at each step it
//! takes the first incoming edge (insertion order) and that edge's first
//! input. Nodes with several parents therefore report one path, not all of
//! them.

use crate::edge::TransitionEdge;
use crate::graph::{DagGraph, GraphError};
use crate::node::MonadNode;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Read-only query engine borrowing a graph
#[derive(Debug, Clone, Copy)]
pub struct ReplayEngine<'g> {
    graph: &'g DagGraph,
}

impl<'g> ReplayEngine<'g> {
    pub fn new(graph: &'g DagGraph) -> Self {
        Self { graph }
    }

    /// Edges leading to `target`, ordered root-first
    pub fn replay_path_to_node(&self, target: Uuid) -> Result<Vec<&'g TransitionEdge>, GraphError> {
        if !self.graph.contains_node(&target) {
            return Err(GraphError::NodeNotFound(target));
        }

        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = target;
        visited.insert(current);

        while let Some(edge) = self.graph.incoming_edges(&current).next() {
            let Some(&previous) = edge.input_ids().first() else {
                break;
            };
            if !visited.insert(previous) {
                return Err(GraphError::CycleDetected(previous));
            }
            path.push(edge);
            current = previous;
        }

        path.reverse();
        Ok(path)
    }

    /// Nodes along the replayed path, root first and ending at `target`
    pub fn lineage_nodes(&self, target: Uuid) -> Result<Vec<&'g MonadNode>, GraphError> {
        let path = self.replay_path_to_node(target)?;
        let mut ids: Vec<Uuid> = path
            .iter()
            .filter_map(|e| e.input_ids().first().copied())
            .collect();
        ids.push(target);
        Ok(ids.iter().filter_map(|id| self.graph.node(id)).collect())
    }

    /// Chains starting at each edge named `operation`, extended forward
    /// through the first outgoing edge of each output
    pub fn transition_chains_by_operation(&self, operation: &str) -> Vec<Vec<&'g TransitionEdge>> {
        self.graph
            .edges()
            .filter(|e| e.operation_name() == operation)
            .map(|start| self.extend_forward(start))
            .collect()
    }

    fn extend_forward(&self, start: &'g TransitionEdge) -> Vec<&'g TransitionEdge> {
        let mut chain = vec![start];
        let mut seen = HashSet::from([start.id()]);
        let mut current = start.output_id();

        while let Some(next) = self.graph.outgoing_edges(&current).next() {
            if !seen.insert(next.id()) {
                break;
            }
            chain.push(next);
            current = next.output_id();
        }
        chain
    }

    pub fn query_nodes<F>(&self, predicate: F) -> Vec<&'g MonadNode>
    where
        F: Fn(&MonadNode) -> bool,
    {
        self.graph.nodes().filter(|n| predicate(*n)).collect()
    }

    pub fn query_transitions<F>(&self, predicate: F) -> Vec<&'g TransitionEdge>
    where
        F: Fn(&TransitionEdge) -> bool,
    {
        self.graph.edges().filter(|e| predicate(*e)).collect()
    }

    /// Nodes created within `[start, end]`
    pub fn nodes_in_time_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&'g MonadNode> {
        self.query_nodes(|n| n.created_at() >= start && n.created_at() <= end)
    }

    /// Edges created within `[start, end]`
    pub fn transitions_in_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&'g TransitionEdge> {
        self.query_transitions(|e| e.created_at() >= start && e.created_at() <= end)
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
