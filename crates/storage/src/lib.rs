// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! mdag-storage: durable persistence for the provenance graph
//!
//! The log is newline-delimited JSON. [`DurableGraph`] writes every mutation
//! to a [`GraphPersistence`] backend before applying it, and rebuilds the
//! graph from the log on restore.

mod compactor;
mod durable;
mod entry;
mod file_wal;
mod persistence;
mod reader;

pub use compactor::{CompactionError, CompactionResult, WalCompactor};
pub use durable::{DurableError, DurableGraph, RestoreError};
pub use entry::{decode_line, MalformedLine, WalEntry, WalEntryType, WalRecord};
pub use file_wal::FileWal;
pub use persistence::{GraphPersistence, MemoryWal, PersistenceError, ReplayIter};
pub use reader::{SkippedLine, WalEntryIter, WalReader, WalValidation};
