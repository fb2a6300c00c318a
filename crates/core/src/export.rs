// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-graph export and import
//!
//! The export format is a single JSON document:
//!
//! ```text
//! {"nodes": [{"id","typeName","payloadJson","createdAt","parentIds","hash"}],
//!  "edges": [{"id","inputIds","outputId","operationName","operationSpecJson",
//!             "createdAt","confidence?","durationMs?","hash"}]}
//! ```

use crate::edge::TransitionEdge;
use crate::graph::{DagGraph, GraphError};
use crate::node::MonadNode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use uuid::Uuid;

/// Errors from export/import
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Serializable snapshot of every node and edge in a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    #[serde(default)]
    pub nodes: Vec<MonadNode>,
    #[serde(default)]
    pub edges: Vec<TransitionEdge>,
}

impl GraphExport {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild a graph from the export.
    ///
    /// Nodes are ordered by their `parentIds` first so parents are inserted
    /// before children; parents that are not part of the export are ignored.
    /// Edges are inserted afterwards in document order.
    pub fn into_graph(self) -> Result<DagGraph, ExportError> {
        let ordered = order_by_parents(self.nodes)?;
        let mut graph = DagGraph::new();
        for node in ordered {
            graph.add_node(node)?;
        }
        for edge in self.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

impl DagGraph {
    /// Export every node and edge in insertion order
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
    }
}

fn order_by_parents(nodes: Vec<MonadNode>) -> Result<Vec<MonadNode>, GraphError> {
    let mut present = HashSet::with_capacity(nodes.len());
    for node in &nodes {
        if !present.insert(node.id()) {
            return Err(GraphError::DuplicateNode(node.id()));
        }
    }
    let mut pending: HashMap<Uuid, usize> = HashMap::new();
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();

    for (index, node) in nodes.iter().enumerate() {
        let mut count = 0;
        for parent in node.parent_ids() {
            if present.contains(parent) && *parent != node.id() {
                children.entry(*parent).or_default().push(index);
                count += 1;
            } else if *parent == node.id() {
                return Err(GraphError::CycleDetected(node.id()));
            }
        }
        pending.insert(node.id(), count);
    }

    let mut queue: VecDeque<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| pending.get(&n.id()) == Some(&0))
        .map(|(i, _)| i)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(index) = queue.pop_front() {
        order.push(index);
        let id = nodes[index].id();
        for child in children.get(&id).into_iter().flatten() {
            let child_id = nodes[*child].id();
            if let Some(count) = pending.get_mut(&child_id) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*child);
                }
            }
        }
    }

    if order.len() < nodes.len() {
        let placed: HashSet<usize> = order.iter().copied().collect();
        let stuck = (0..nodes.len())
            .find(|i| !placed.contains(i))
            .map(|i| nodes[i].id())
            .unwrap_or_default();
        return Err(GraphError::CycleDetected(stuck));
    }

    let mut slots: Vec<Option<MonadNode>> = nodes.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots.get_mut(i).and_then(Option::take))
        .collect())
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
