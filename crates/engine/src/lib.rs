// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Coordinator for concurrent producers of a provenance graph

mod branch;
mod config;
mod coordinator;
mod effects;
mod error;
mod events;

pub use branch::{BranchArena, BranchHandle};
pub use config::{ConfigError, EngineConfig, DEFAULT_EFFECT_QUEUE_CAPACITY};
pub use coordinator::GraphCoordinator;
pub use effects::{EffectError, EffectFailure, EffectLog, EffectWorker, PostUpdateEffect};
pub use error::EngineError;
pub use events::GraphEvent;
