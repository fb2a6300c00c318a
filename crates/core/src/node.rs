// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monad nodes: immutable, self-hashing records of reified values

use crate::hash::content_hash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One reified value in the provenance graph (a reasoning state, a tool
/// result, an ingested batch, ...).
///
/// The payload is opaque to the graph. The hash covers the type tag, the
/// payload, the parent ids and the creation time at millisecond precision,
/// and is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonadNode {
    id: Uuid,
    type_name: String,
    payload_json: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    parent_ids: Vec<Uuid>,
    hash: String,
}

impl MonadNode {
    /// Create a node with a fresh id, stamped with the current time
    pub fn new(
        type_name: impl Into<String>,
        payload_json: impl Into<String>,
        parent_ids: Vec<Uuid>,
    ) -> Self {
        Self::from_parts(Uuid::new_v4(), type_name, payload_json, Utc::now(), parent_ids)
    }

    /// Create a node from explicit parts
    pub fn from_parts(
        id: Uuid,
        type_name: impl Into<String>,
        payload_json: impl Into<String>,
        created_at: DateTime<Utc>,
        parent_ids: Vec<Uuid>,
    ) -> Self {
        let type_name = type_name.into();
        let payload_json = payload_json.into();
        let hash = Self::compute_hash(&type_name, &payload_json, &parent_ids, created_at);
        Self {
            id,
            type_name,
            payload_json,
            created_at,
            parent_ids,
            hash,
        }
    }

    /// Derive the content hash for the given fields
    pub fn compute_hash(
        type_name: &str,
        payload_json: &str,
        parent_ids: &[Uuid],
        created_at: DateTime<Utc>,
    ) -> String {
        let parents = parent_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let millis = created_at.timestamp_millis().to_string();
        content_hash([type_name, payload_json, parents.as_str(), millis.as_str()])
    }

    /// Re-derive the hash and compare it with the stored one
    pub fn verify_hash(&self) -> bool {
        self.hash
            == Self::compute_hash(
                &self.type_name,
                &self.payload_json,
                &self.parent_ids,
                self.created_at,
            )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload_json(&self) -> &str {
        &self.payload_json
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn parent_ids(&self) -> &[Uuid] {
        &self.parent_ids
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
