// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discrete divergence and rotation over graph neighborhoods
//!
//! Embeddings come from the caller through [`EmbeddingSource`]; the analyzer
//! does not care how they are produced. A neighbor without an embedding is
//! treated as the zero vector, which contributes nothing.
//!
//! - divergence > 0: the node fans out into semantically related successors (source)
//! - divergence < 0: the node consolidates its inputs (sink)
//! - rotation: mean cross-product magnitude between consecutive neighbors,
//!   using only the first three embedding dimensions

use crate::graph::DagGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Divergence magnitude below which a node counts as neutral
pub const FLOW_TOLERANCE: f64 = 1e-6;

/// Lookup from node id to embedding vector
pub trait EmbeddingSource: Sync {
    fn embedding(&self, id: Uuid) -> Option<Vec<f32>>;
}

impl<F> EmbeddingSource for F
where
    F: Fn(Uuid) -> Option<Vec<f32>> + Sync,
{
    fn embedding(&self, id: Uuid) -> Option<Vec<f32>> {
        self(id)
    }
}

/// Semantic flow classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowClass {
    Source,
    Sink,
    Neutral,
}

/// Normalized dot product; 0 for empty, mismatched or zero-magnitude input
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let similarity = dot / denom;
    if similarity.is_finite() {
        similarity.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn first_three(v: &[f32]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (slot, value) in out.iter_mut().zip(v) {
        *slot = f64::from(*value);
    }
    out
}

fn cross_magnitude(a: &[f32], b: &[f32]) -> f64 {
    let [a1, a2, a3] = first_three(a);
    let [b1, b2, b3] = first_three(b);
    let x = a2 * b3 - a3 * b2;
    let y = a3 * b1 - a1 * b3;
    let z = a1 * b2 - a2 * b1;
    (x * x + y * y + z * z).sqrt()
}

fn push_unique(out: &mut Vec<Uuid>, id: Uuid) {
    if !out.contains(&id) {
        out.push(id);
    }
}

/// Vector-field metrics over a borrowed graph
pub struct VectorFieldAnalyzer<'g, E> {
    graph: &'g DagGraph,
    embeddings: E,
}

impl<'g, E: EmbeddingSource> VectorFieldAnalyzer<'g, E> {
    pub fn new(graph: &'g DagGraph, embeddings: E) -> Self {
        Self { graph, embeddings }
    }

    /// Distinct outputs of the node's outgoing edges
    fn outgoing_neighbors(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        for edge in self.graph.outgoing_edges(&id) {
            push_unique(&mut out, edge.output_id());
        }
        out
    }

    /// Distinct inputs of the node's incoming edges
    fn incoming_neighbors(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        for edge in self.graph.incoming_edges(&id) {
            for input in edge.input_ids() {
                push_unique(&mut out, *input);
            }
        }
        out
    }

    fn similarity_to(&self, center: &[f32], neighbor: Uuid) -> f64 {
        self.embeddings
            .embedding(neighbor)
            .map(|v| cosine_similarity(center, &v))
            .unwrap_or(0.0)
    }

    /// Outgoing similarity minus incoming similarity
    pub fn divergence(&self, id: Uuid) -> f64 {
        if !self.graph.contains_node(&id) {
            return 0.0;
        }
        let Some(center) = self.embeddings.embedding(id) else {
            return 0.0;
        };
        let outflow: f64 = self
            .outgoing_neighbors(id)
            .into_iter()
            .map(|n| self.similarity_to(&center, n))
            .sum();
        let inflow: f64 = self
            .incoming_neighbors(id)
            .into_iter()
            .map(|n| self.similarity_to(&center, n))
            .sum();
        outflow - inflow
    }

    /// Mean 3D cross-product magnitude around the node's neighbor ring
    pub fn rotation(&self, id: Uuid) -> f64 {
        if !self.graph.contains_node(&id) {
            return 0.0;
        }
        let mut neighbors = self.outgoing_neighbors(id);
        for n in self.incoming_neighbors(id) {
            push_unique(&mut neighbors, n);
        }
        if neighbors.len() < 2 {
            return 0.0;
        }

        let vectors: Vec<Vec<f32>> = neighbors
            .iter()
            .map(|n| self.embeddings.embedding(*n).unwrap_or_default())
            .collect();
        let total: f64 = (0..vectors.len())
            .map(|i| cross_magnitude(&vectors[i], &vectors[(i + 1) % vectors.len()]))
            .sum();
        total / vectors.len() as f64
    }

    pub fn classify(&self, id: Uuid) -> FlowClass {
        let divergence = self.divergence(id);
        if divergence > FLOW_TOLERANCE {
            FlowClass::Source
        } else if divergence < -FLOW_TOLERANCE {
            FlowClass::Sink
        } else {
            FlowClass::Neutral
        }
    }

    /// Divergence of every node, computed in parallel
    pub fn divergence_field(&self) -> HashMap<Uuid, f64> {
        let ids: Vec<Uuid> = self.graph.nodes().map(|n| n.id()).collect();
        ids.par_iter().map(|id| (*id, self.divergence(*id))).collect()
    }

    /// Rotation of every node, computed in parallel
    pub fn rotation_field(&self) -> HashMap<Uuid, f64> {
        let ids: Vec<Uuid> = self.graph.nodes().map(|n| n.id()).collect();
        ids.par_iter().map(|id| (*id, self.rotation(*id))).collect()
    }
}

#[cfg(test)]
#[path = "vector_field_tests.rs"]
mod tests;
