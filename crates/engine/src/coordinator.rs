// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serialized access to one durable graph
//!
//! A single reader-writer lock covers the graph, its projector and the
//! branch arena. Writers log, apply, and update branch state under the
//! lock; events are published and effects queued after it is released.

use crate::branch::{BranchArena, BranchHandle};
use crate::config::EngineConfig;
use crate::effects::{EffectLog, EffectWorker, PostUpdateEffect};
use crate::error::EngineError;
use crate::events::GraphEvent;
use mdag_core::{
    Clock, DagGraph, GlobalNetworkState, MonadNode, StateProjector, SystemClock, TransitionEdge,
};
use mdag_storage::{DurableGraph, FileWal, GraphPersistence};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

/// Events buffered per subscriber before slow receivers lag
const EVENT_BUFFER: usize = 256;

struct CoordinatorState<P, C: Clock> {
    durable: DurableGraph<P>,
    projector: StateProjector<C>,
    branches: BranchArena,
    appends_since_flush: u64,
    appends_since_snapshot: u64,
}

/// Owner of a durable graph shared between concurrent producers
pub struct GraphCoordinator<P, C: Clock = SystemClock> {
    state: RwLock<CoordinatorState<P, C>>,
    events: broadcast::Sender<GraphEvent>,
    effects: EffectWorker,
    config: EngineConfig,
    clock: C,
}

impl GraphCoordinator<FileWal> {
    /// Restore the graph from `config.wal_path` and start the effect worker
    pub async fn open(
        config: EngineConfig,
        effects: Vec<Arc<dyn PostUpdateEffect>>,
    ) -> Result<Self, EngineError> {
        let path = config.wal_path.clone();
        let durable = tokio::task::spawn_blocking(move || -> Result<_, EngineError> {
            let wal = FileWal::open(&path)?;
            Ok(DurableGraph::restore(wal)?)
        })
        .await??;

        tracing::info!(
            wal = %config.wal_path.display(),
            nodes = durable.graph().node_count(),
            edges = durable.graph().edge_count(),
            "coordinator opened"
        );
        Ok(Self::new(durable, config, effects))
    }
}

impl<P: GraphPersistence> GraphCoordinator<P> {
    pub fn new(
        durable: DurableGraph<P>,
        config: EngineConfig,
        effects: Vec<Arc<dyn PostUpdateEffect>>,
    ) -> Self {
        Self::with_clock(durable, config, effects, SystemClock)
    }
}

impl<P: GraphPersistence, C: Clock> GraphCoordinator<P, C> {
    /// Must be called from within a tokio runtime
    pub fn with_clock(
        durable: DurableGraph<P>,
        config: EngineConfig,
        effects: Vec<Arc<dyn PostUpdateEffect>>,
        clock: C,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let worker = EffectWorker::spawn(effects, config.effect_queue_capacity);
        Self {
            state: RwLock::new(CoordinatorState {
                durable,
                projector: StateProjector::with_clock(clock.clone()),
                branches: BranchArena::new(),
                appends_since_flush: 0,
                appends_since_snapshot: 0,
            }),
            events,
            effects: worker,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Log and insert a node, advancing `branch` to it
    pub async fn record_node(&self, branch: &str, node: MonadNode) -> Result<Uuid, EngineError> {
        let id = node.id();
        let type_name = node.type_name().to_string();
        let mut events = Vec::new();

        let result = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            state.durable.add_node_durable(node)?;
            if state.branches.record_node(branch, id, self.clock.now()) {
                events.push(GraphEvent::BranchCreated {
                    name: branch.to_string(),
                });
            }
            events.push(GraphEvent::NodeRecorded {
                branch: branch.to_string(),
                node_id: id,
                type_name,
            });
            self.after_append(state, &mut events)
        };

        self.publish(events);
        result.map(|()| id)
    }

    /// Log and insert an edge, moving `branch` to its output
    pub async fn record_transition(
        &self,
        branch: &str,
        edge: TransitionEdge,
    ) -> Result<Uuid, EngineError> {
        let id = edge.id();
        let output_id = edge.output_id();
        let operation = edge.operation_name().to_string();
        let mut events = Vec::new();

        let result = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            state.durable.add_edge_durable(edge)?;
            if state
                .branches
                .record_transition(branch, output_id, self.clock.now())
            {
                events.push(GraphEvent::BranchCreated {
                    name: branch.to_string(),
                });
            }
            events.push(GraphEvent::TransitionRecorded {
                branch: branch.to_string(),
                edge_id: id,
                operation,
                output_id,
            });
            self.after_append(state, &mut events)
        };

        self.publish(events);
        result.map(|()| id)
    }

    /// Periodic flush and snapshot, per config
    fn after_append(
        &self,
        state: &mut CoordinatorState<P, C>,
        events: &mut Vec<GraphEvent>,
    ) -> Result<(), EngineError> {
        state.appends_since_flush += 1;
        state.appends_since_snapshot += 1;

        if self.config.snapshot_every > 0
            && state.appends_since_snapshot >= self.config.snapshot_every
        {
            state.appends_since_snapshot = 0;
            let mut metadata = BTreeMap::new();
            metadata.insert("trigger".to_string(), "auto".to_string());
            let snapshot = state
                .projector
                .create_snapshot(state.durable.graph(), metadata);
            events.push(snapshot_event(&snapshot));
        }

        if self.config.flush_every > 0 && state.appends_since_flush >= self.config.flush_every {
            state.durable.flush()?;
            state.appends_since_flush = 0;
        }
        Ok(())
    }

    fn publish(&self, events: Vec<GraphEvent>) {
        for event in events {
            tracing::debug!(event = event.kind(), "graph event");
            // No subscribers is fine
            let _ = self.events.send(event.clone());
            self.effects.submit(event);
        }
    }

    /// Record a numbered snapshot of the current graph
    pub async fn snapshot(&self, metadata: BTreeMap<String, String>) -> GlobalNetworkState {
        let snapshot = {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            state.appends_since_snapshot = 0;
            state
                .projector
                .create_snapshot(state.durable.graph(), metadata)
        };
        self.publish(vec![snapshot_event(&snapshot)]);
        snapshot
    }

    pub async fn flush(&self) -> Result<(), EngineError> {
        let mut state = self.state.write().await;
        state.durable.flush()?;
        state.appends_since_flush = 0;
        Ok(())
    }

    /// Run `f` against the graph under the shared lock
    pub async fn read<R>(&self, f: impl FnOnce(&DagGraph) -> R) -> R {
        let state = self.state.read().await;
        f(state.durable.graph())
    }

    /// Run `f` against the snapshot history under the shared lock
    pub async fn with_projector<R>(&self, f: impl FnOnce(&StateProjector<C>) -> R) -> R {
        let state = self.state.read().await;
        f(&state.projector)
    }

    pub async fn branch(&self, name: &str) -> Option<BranchHandle> {
        self.state.read().await.branches.get(name).cloned()
    }

    pub async fn branches(&self) -> Vec<BranchHandle> {
        self.state.read().await.branches.list()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    pub fn effect_status(&self) -> EffectLog {
        self.effects.status()
    }

    /// Drain queued effects, then flush and close the log
    pub async fn shutdown(mut self) -> Result<(), EngineError> {
        self.effects.shutdown().await?;
        let state = self.state.into_inner();
        state.durable.flush()?;
        state.durable.close()?;
        tracing::info!("coordinator shut down");
        Ok(())
    }
}

fn snapshot_event(snapshot: &GlobalNetworkState) -> GraphEvent {
    GraphEvent::SnapshotCreated {
        epoch: snapshot.epoch,
        total_nodes: snapshot.total_nodes,
        total_edges: snapshot.total_edges,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
