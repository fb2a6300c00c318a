// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transition edges: operation-labelled, multi-input transformations

use crate::hash::content_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A directed, operation-labelled transformation from one or more input
/// nodes to a single output node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionEdge {
    id: Uuid,
    input_ids: Vec<Uuid>,
    output_id: Uuid,
    operation_name: String,
    operation_spec_json: String,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    hash: String,
}

impl TransitionEdge {
    /// Start building an edge with a fresh id, stamped with the current time
    pub fn builder(
        input_ids: Vec<Uuid>,
        output_id: Uuid,
        operation_name: impl Into<String>,
    ) -> EdgeBuilder {
        EdgeBuilder {
            id: Uuid::new_v4(),
            input_ids,
            output_id,
            operation_name: operation_name.into(),
            operation_spec_json: "{}".to_string(),
            created_at: Utc::now(),
            confidence: None,
            duration_ms: None,
        }
    }

    /// Shorthand for a single-input edge with default spec
    pub fn new(input_id: Uuid, output_id: Uuid, operation_name: impl Into<String>) -> Self {
        Self::builder(vec![input_id], output_id, operation_name).build()
    }

    /// Re-derive the hash and compare it with the stored one
    pub fn verify_hash(&self) -> bool {
        self.hash == self.derive_hash()
    }

    fn derive_hash(&self) -> String {
        let inputs = self
            .input_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let output = self.output_id.to_string();
        let millis = self.created_at.timestamp_millis().to_string();
        // Shortest round-trip form; serde_json parses it back bit-for-bit
        let confidence = self
            .confidence
            .map(|c| c.to_string())
            .unwrap_or_default();
        let duration = self.duration_ms.map(|d| d.to_string()).unwrap_or_default();
        content_hash([
            inputs.as_str(),
            output.as_str(),
            self.operation_name.as_str(),
            self.operation_spec_json.as_str(),
            millis.as_str(),
            confidence.as_str(),
            duration.as_str(),
        ])
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn input_ids(&self) -> &[Uuid] {
        &self.input_ids
    }

    pub fn output_id(&self) -> Uuid {
        self.output_id
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn operation_spec_json(&self) -> &str {
        &self.operation_spec_json
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// Builder for [`TransitionEdge`]; the hash is computed by [`EdgeBuilder::build`]
#[derive(Debug, Clone)]
pub struct EdgeBuilder {
    id: Uuid,
    input_ids: Vec<Uuid>,
    output_id: Uuid,
    operation_name: String,
    operation_spec_json: String,
    created_at: DateTime<Utc>,
    confidence: Option<f64>,
    duration_ms: Option<u64>,
}

impl EdgeBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn spec_json(mut self, spec: impl Into<String>) -> Self {
        self.operation_spec_json = spec.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Confidence is clamped to `0.0..=1.0`; NaN is dropped
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            None
        } else {
            Some(confidence.clamp(0.0, 1.0))
        };
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn build(self) -> TransitionEdge {
        let mut edge = TransitionEdge {
            id: self.id,
            input_ids: self.input_ids,
            output_id: self.output_id,
            operation_name: self.operation_name,
            operation_spec_json: self.operation_spec_json,
            created_at: self.created_at,
            confidence: self.confidence,
            duration_ms: self.duration_ms,
            hash: String::new(),
        };
        edge.hash = edge.derive_hash();
        edge
    }
}

#[cfg(test)]
#[path = "edge_tests.rs"]
mod tests;
