// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the coordinator

use mdag_storage::{DurableError, PersistenceError, RestoreError};
use thiserror::Error;

/// Errors that can occur in the coordinator
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Durable(#[from] DurableError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("restore failed: {0}")]
    Restore(#[from] RestoreError),
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
