// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mdag lineage`

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use mdag_core::ReplayEngine;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Args)]
pub struct LineageArgs {
    /// Node whose history to show
    pub node_id: String,
    /// WAL file to read
    pub wal: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineageStep {
    edge_id: Uuid,
    operation: String,
    input_ids: Vec<Uuid>,
    output_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LineageReport {
    target: Uuid,
    steps: Vec<LineageStep>,
}

impl fmt::Display for LineageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return writeln!(f, "{} has no recorded transitions", self.target);
        }
        for (i, step) in self.steps.iter().enumerate() {
            let inputs: Vec<String> = step.input_ids.iter().map(Uuid::to_string).collect();
            write!(
                f,
                "{:>3}. {} [{}] -> {}",
                i + 1,
                step.operation,
                inputs.join(", "),
                step.output_id
            )?;
            if let Some(confidence) = step.confidence {
                write!(f, " ({:.2})", confidence)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn run(wal: &Path, node_id: &str, format: OutputFormat) -> Result<()> {
    let target: Uuid = node_id
        .parse()
        .with_context(|| format!("invalid node id: {}", node_id))?;
    let graph = super::restore_graph(wal)?;

    let steps = ReplayEngine::new(&graph)
        .replay_path_to_node(target)?
        .into_iter()
        .map(|edge| LineageStep {
            edge_id: edge.id(),
            operation: edge.operation_name().to_string(),
            input_ids: edge.input_ids().to_vec(),
            output_id: edge.output_id(),
            confidence: edge.confidence(),
        })
        .collect();

    output::print(&LineageReport { target, steps }, format)
}
