// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! mdag-core: the provenance DAG model
//!
//! This crate provides:
//! - Content-hashed records for reasoning states and the transitions between them
//! - An in-memory DAG with integrity verification and topological ordering
//! - Epoch snapshots, lineage replay, and vector-field analysis over the graph
//!
//! Nothing here touches the filesystem; durability lives in `mdag-storage`.

pub mod cancel;
pub mod clock;
pub mod edge;
pub mod export;
pub mod graph;
pub mod hash;
pub mod node;
pub mod projector;
pub mod replay;
pub mod vector_field;

pub use cancel::CancelFlag;
pub use clock::{Clock, FakeClock, SystemClock};
pub use edge::{EdgeBuilder, TransitionEdge};
pub use export::{ExportError, GraphExport};
pub use graph::{DagGraph, GraphError, IntegrityReport, IntegrityViolation};
pub use node::MonadNode;
pub use projector::{GlobalNetworkState, ProjectionError, StateDelta, StateProjector};
pub use replay::ReplayEngine;
pub use vector_field::{cosine_similarity, EmbeddingSource, FlowClass, VectorFieldAnalyzer};
