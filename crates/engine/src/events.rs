// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifications emitted after each committed update

use serde::Serialize;
use uuid::Uuid;

/// Something the coordinator committed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent {
    NodeRecorded {
        branch: String,
        node_id: Uuid,
        type_name: String,
    },
    TransitionRecorded {
        branch: String,
        edge_id: Uuid,
        operation: String,
        output_id: Uuid,
    },
    SnapshotCreated {
        epoch: u64,
        total_nodes: usize,
        total_edges: usize,
    },
    BranchCreated {
        name: String,
    },
}

impl GraphEvent {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::NodeRecorded { .. } => "node_recorded",
            GraphEvent::TransitionRecorded { .. } => "transition_recorded",
            GraphEvent::SnapshotCreated { .. } => "snapshot_created",
            GraphEvent::BranchCreated { .. } => "branch_created",
        }
    }
}
