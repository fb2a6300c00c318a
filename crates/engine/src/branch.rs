// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named branches of reasoning over the shared graph

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The tip of one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchHandle {
    pub name: String,
    /// Most recent node recorded on, or produced for, this branch
    pub head: Option<Uuid>,
    pub node_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Branch name to handle; branches are created on first use
#[derive(Debug, Default)]
pub struct BranchArena {
    branches: BTreeMap<String, BranchHandle>,
}

impl BranchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the branch did not exist before
    fn touch(&mut self, name: &str, now: DateTime<Utc>) -> (&mut BranchHandle, bool) {
        let created = !self.branches.contains_key(name);
        let handle = self
            .branches
            .entry(name.to_string())
            .or_insert_with(|| BranchHandle {
                name: name.to_string(),
                head: None,
                node_count: 0,
                created_at: now,
            });
        (handle, created)
    }

    /// Advance the branch to a newly recorded node
    pub fn record_node(&mut self, name: &str, node_id: Uuid, now: DateTime<Utc>) -> bool {
        let (handle, created) = self.touch(name, now);
        handle.head = Some(node_id);
        handle.node_count += 1;
        created
    }

    /// Move the branch head to a transition's output
    pub fn record_transition(&mut self, name: &str, output_id: Uuid, now: DateTime<Utc>) -> bool {
        let (handle, created) = self.touch(name, now);
        handle.head = Some(output_id);
        created
    }

    pub fn get(&self, name: &str) -> Option<&BranchHandle> {
        self.branches.get(name)
    }

    /// All branches, ordered by name
    pub fn list(&self) -> Vec<BranchHandle> {
        self.branches.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
