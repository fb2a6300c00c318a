// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-update side effects
//!
//! Effects run on a background worker fed by a bounded channel, so a slow
//! effect never holds the graph lock. Each invocation runs in its own task;
//! an error or a panic is recorded in the [`EffectLog`] and the worker
//! carries on with the next effect.

use crate::events::GraphEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Failures kept in the log
const RECENT_FAILURES: usize = 16;

/// Error returned by a post-update effect
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EffectError(pub String);

impl EffectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Work to run after an update commits (persisting elsewhere, exporting
/// facts, notifying listeners)
#[async_trait]
pub trait PostUpdateEffect: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn apply(&self, event: &GraphEvent) -> Result<(), EffectError>;
}

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectFailure {
    pub effect: String,
    pub event: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Outcome counters for the effect worker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectLog {
    pub succeeded: u64,
    pub failed: u64,
    /// Events not queued because the channel was full or closed
    pub dropped: u64,
    pub recent_failures: VecDeque<EffectFailure>,
}

impl EffectLog {
    fn record_failure(&mut self, failure: EffectFailure) {
        self.failed += 1;
        if self.recent_failures.len() == RECENT_FAILURES {
            self.recent_failures.pop_front();
        }
        self.recent_failures.push_back(failure);
    }
}

/// Background runner for post-update effects
pub struct EffectWorker {
    tx: Option<mpsc::Sender<GraphEvent>>,
    handle: Option<JoinHandle<()>>,
    log: Arc<Mutex<EffectLog>>,
}

impl EffectWorker {
    /// Start the worker; must be called from within a tokio runtime
    pub fn spawn(effects: Vec<Arc<dyn PostUpdateEffect>>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let log = Arc::new(Mutex::new(EffectLog::default()));
        let handle = tokio::spawn(run_effects(effects, rx, Arc::clone(&log)));
        Self {
            tx: Some(tx),
            handle: Some(handle),
            log,
        }
    }

    /// Queue an event without waiting; a full queue drops it
    pub fn submit(&self, event: GraphEvent) {
        let Some(tx) = &self.tx else {
            self.log.lock().dropped += 1;
            return;
        };
        if let Err(e) = tx.try_send(event) {
            tracing::warn!(error = %e, "post-update effect queue rejected event");
            self.log.lock().dropped += 1;
        }
    }

    pub fn status(&self) -> EffectLog {
        self.log.lock().clone()
    }

    /// Close the queue, let queued events finish, and join the worker
    pub async fn shutdown(&mut self) -> Result<(), tokio::task::JoinError> {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}

async fn run_effects(
    effects: Vec<Arc<dyn PostUpdateEffect>>,
    mut rx: mpsc::Receiver<GraphEvent>,
    log: Arc<Mutex<EffectLog>>,
) {
    while let Some(event) = rx.recv().await {
        for effect in &effects {
            let task_effect = Arc::clone(effect);
            let task_event = event.clone();
            let outcome =
                tokio::spawn(async move { task_effect.apply(&task_event).await }).await;

            let message = match outcome {
                Ok(Ok(())) => {
                    log.lock().succeeded += 1;
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("effect task failed: {}", e),
            };
            tracing::warn!(
                effect = effect.name(),
                event = event.kind(),
                error = %message,
                "post-update effect failed"
            );
            log.lock().record_failure(EffectFailure {
                effect: effect.name().to_string(),
                event: event.kind(),
                message,
                at: Utc::now(),
            });
        }
    }
    tracing::debug!("effect worker stopped");
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod tests;
