// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provenance DAG
//!
//! `DagGraph` owns every node and edge plus the adjacency indices derived
//! from them. It grows monotonically: there is no removal and no in-place
//! update. Cycle-freedom is checked on demand by [`DagGraph::topological_sort`]
//! rather than enforced on insertion.
//!
//! The graph performs no internal locking. Mutation takes `&mut self`, so
//! callers sharing a graph across threads wrap it in a lock of their own.

use crate::edge::TransitionEdge;
use crate::node::MonadNode;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors from graph operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node already exists: {0}")]
    DuplicateNode(Uuid),
    #[error("edge already exists: {0}")]
    DuplicateEdge(Uuid),
    #[error("edge {edge} references missing node {node}")]
    MissingEndpoint { edge: Uuid, node: Uuid },
    #[error("edge {0} has no input nodes")]
    EmptyInputs(Uuid),
    #[error("node not found: {0}")]
    NodeNotFound(Uuid),
    #[error("cycle detected at node {0}")]
    CycleDetected(Uuid),
    #[error("integrity check failed: {0}")]
    Integrity(IntegrityReport),
}

/// A single integrity problem found by [`DagGraph::integrity_report`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    #[error("node {0} hash does not match its contents")]
    NodeHash(Uuid),
    #[error("edge {0} hash does not match its contents")]
    EdgeHash(Uuid),
    #[error("edge {edge} references missing node {node}")]
    DanglingEndpoint { edge: Uuid, node: Uuid },
}

/// All integrity problems found in a graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.first() {
            None => write!(f, "no violations"),
            Some(first) if self.violations.len() == 1 => write!(f, "{}", first),
            Some(first) => write!(
                f,
                "{} (and {} more violations)",
                first,
                self.violations.len() - 1
            ),
        }
    }
}

/// Content-addressed provenance graph
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: HashMap<Uuid, MonadNode>,
    edges: HashMap<Uuid, TransitionEdge>,
    node_order: Vec<Uuid>,
    edge_order: Vec<Uuid>,
    /// input node id -> edges consuming it, in insertion order
    outgoing: HashMap<Uuid, Vec<Uuid>>,
    /// output node id -> edges producing it, in insertion order
    incoming: HashMap<Uuid, Vec<Uuid>>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `node` could be added without mutating the graph
    pub fn check_node(&self, node: &MonadNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id()) {
            return Err(GraphError::DuplicateNode(node.id()));
        }
        Ok(())
    }

    /// Check whether `edge` could be added without mutating the graph
    pub fn check_edge(&self, edge: &TransitionEdge) -> Result<(), GraphError> {
        if self.edges.contains_key(&edge.id()) {
            return Err(GraphError::DuplicateEdge(edge.id()));
        }
        if edge.input_ids().is_empty() {
            return Err(GraphError::EmptyInputs(edge.id()));
        }
        let output = edge.output_id();
        let endpoints = edge.input_ids().iter().chain(std::iter::once(&output));
        for node in endpoints {
            if !self.nodes.contains_key(node) {
                return Err(GraphError::MissingEndpoint {
                    edge: edge.id(),
                    node: *node,
                });
            }
        }
        Ok(())
    }

    /// Add a node; fails if its id is already present
    pub fn add_node(&mut self, node: MonadNode) -> Result<(), GraphError> {
        self.check_node(&node)?;
        let id = node.id();
        self.node_order.push(id);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Add an edge; fails on a duplicate id or a missing endpoint
    pub fn add_edge(&mut self, edge: TransitionEdge) -> Result<(), GraphError> {
        self.check_edge(&edge)?;
        let id = edge.id();

        let mut seen_inputs = Vec::with_capacity(edge.input_ids().len());
        for input in edge.input_ids() {
            if !seen_inputs.contains(input) {
                seen_inputs.push(*input);
                self.outgoing.entry(*input).or_default().push(id);
            }
        }
        self.incoming.entry(edge.output_id()).or_default().push(id);

        self.edge_order.push(id);
        self.edges.insert(id, edge);
        Ok(())
    }

    pub fn node(&self, id: &Uuid) -> Option<&MonadNode> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &Uuid) -> Option<&TransitionEdge> {
        self.edges.get(id)
    }

    pub fn contains_node(&self, id: &Uuid) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn contains_edge(&self, id: &Uuid) -> bool {
        self.edges.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &MonadNode> + '_ {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &TransitionEdge> + '_ {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    /// Edges that consume `id` as an input, in insertion order
    pub fn outgoing_edges<'a>(&'a self, id: &Uuid) -> impl Iterator<Item = &'a TransitionEdge> + 'a {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Edges that produce `id` as their output, in insertion order
    pub fn incoming_edges<'a>(&'a self, id: &Uuid) -> impl Iterator<Item = &'a TransitionEdge> + 'a {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|edge_id| self.edges.get(edge_id))
    }

    /// Nodes with no incoming edges
    pub fn root_nodes(&self) -> Vec<&MonadNode> {
        self.nodes()
            .filter(|n| self.incoming.get(&n.id()).map_or(true, Vec::is_empty))
            .collect()
    }

    /// Nodes with no outgoing edges
    pub fn leaf_nodes(&self) -> Vec<&MonadNode> {
        self.nodes()
            .filter(|n| self.outgoing.get(&n.id()).map_or(true, Vec::is_empty))
            .collect()
    }

    /// Order nodes so every edge's inputs and every resolvable parent come
    /// before the node that depends on them.
    ///
    /// Kahn's algorithm seeded in insertion order. Fails with
    /// [`GraphError::CycleDetected`] instead of looping when the graph has a
    /// cycle.
    pub fn topological_sort(&self) -> Result<Vec<&MonadNode>, GraphError> {
        let mut in_degree: HashMap<Uuid, usize> =
            self.node_order.iter().map(|id| (*id, 0)).collect();
        let mut dependents: HashMap<Uuid, Vec<Uuid>> = HashMap::new();

        let mut depend = |from: Uuid, to: Uuid, in_degree: &mut HashMap<Uuid, usize>| {
            dependents.entry(from).or_default().push(to);
            if let Some(d) = in_degree.get_mut(&to) {
                *d += 1;
            }
        };

        for edge in self.edges() {
            for input in edge.input_ids() {
                depend(*input, edge.output_id(), &mut in_degree);
            }
        }
        for node in self.nodes() {
            for parent in node.parent_ids() {
                if self.nodes.contains_key(parent) {
                    depend(*parent, node.id(), &mut in_degree);
                }
            }
        }

        let mut queue: VecDeque<Uuid> = self
            .node_order
            .iter()
            .filter(|id| in_degree.get(id) == Some(&0))
            .copied()
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            if let Some(node) = self.nodes.get(&id) {
                sorted.push(node);
            }
            for next in dependents.get(&id).into_iter().flatten() {
                if let Some(d) = in_degree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(*next);
                    }
                }
            }
        }

        if sorted.len() < self.nodes.len() {
            let stuck = self
                .node_order
                .iter()
                .find(|id| in_degree.get(id).is_some_and(|d| *d > 0))
                .copied()
                .unwrap_or_default();
            return Err(GraphError::CycleDetected(stuck));
        }
        Ok(sorted)
    }

    /// Recompute every hash and re-check every edge endpoint
    pub fn integrity_report(&self) -> IntegrityReport {
        let mut violations = Vec::new();
        for node in self.nodes() {
            if !node.verify_hash() {
                violations.push(IntegrityViolation::NodeHash(node.id()));
            }
        }
        for edge in self.edges() {
            if !edge.verify_hash() {
                violations.push(IntegrityViolation::EdgeHash(edge.id()));
            }
            let output = edge.output_id();
            let endpoints = edge.input_ids().iter().chain(std::iter::once(&output));
            for node in endpoints {
                if !self.nodes.contains_key(node) {
                    violations.push(IntegrityViolation::DanglingEndpoint {
                        edge: edge.id(),
                        node: *node,
                    });
                }
            }
        }
        IntegrityReport { violations }
    }

    /// Fail with every integrity violation if any are found
    pub fn verify_integrity(&self) -> Result<(), GraphError> {
        let report = self.integrity_report();
        if report.is_valid() {
            Ok(())
        } else {
            Err(GraphError::Integrity(report))
        }
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
