// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WAL line format with optional checksum verification
//!
//! Each line is one JSON object: the entry type, the time it was appended,
//! the serialized record, and a CRC32 of the serialized payload.

use chrono::{DateTime, Utc};
use mdag_core::{MonadNode, TransitionEdge};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Kind of mutation recorded by a WAL line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalEntryType {
    AddNode,
    AddEdge,
}

/// A decoded mutation, in append order
#[derive(Debug, Clone, PartialEq)]
pub enum WalRecord {
    AddNode(MonadNode),
    AddEdge(TransitionEdge),
}

impl WalRecord {
    pub fn entry_type(&self) -> WalEntryType {
        match self {
            WalRecord::AddNode(_) => WalEntryType::AddNode,
            WalRecord::AddEdge(_) => WalEntryType::AddEdge,
        }
    }
}

/// Reasons a line is skipped on replay
#[derive(Debug, Error)]
pub enum MalformedLine {
    #[error("not a WAL entry: {0}")]
    Parse(serde_json::Error),
    #[error("checksum mismatch: stored {stored}, computed {computed}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("undecodable payload: {0}")]
    Payload(serde_json::Error),
    #[error("line is not valid UTF-8")]
    Encoding,
}

/// A single line of the write-ahead log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    #[serde(rename = "type")]
    pub entry_type: WalEntryType,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<u32>,
}

impl WalEntry {
    pub fn for_node(node: &MonadNode, timestamp: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        Ok(Self::with_payload(
            WalEntryType::AddNode,
            timestamp,
            serde_json::to_value(node)?,
        ))
    }

    pub fn for_edge(
        edge: &TransitionEdge,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::with_payload(
            WalEntryType::AddEdge,
            timestamp,
            serde_json::to_value(edge)?,
        ))
    }

    pub fn for_record(
        record: &WalRecord,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        match record {
            WalRecord::AddNode(node) => Self::for_node(node, timestamp),
            WalRecord::AddEdge(edge) => Self::for_edge(edge, timestamp),
        }
    }

    fn with_payload(entry_type: WalEntryType, timestamp: DateTime<Utc>, payload: Value) -> Self {
        let checksum = Some(Self::calculate_checksum(&payload));
        Self {
            entry_type,
            timestamp,
            payload,
            checksum,
        }
    }

    /// CRC32 of the compact payload text
    fn calculate_checksum(payload: &Value) -> u32 {
        crc32fast::hash(payload.to_string().as_bytes())
    }

    /// Entries written without a checksum always verify
    pub fn verify(&self) -> Result<(), MalformedLine> {
        let Some(stored) = self.checksum else {
            return Ok(());
        };
        let computed = Self::calculate_checksum(&self.payload);
        if stored == computed {
            Ok(())
        } else {
            Err(MalformedLine::ChecksumMismatch { stored, computed })
        }
    }

    /// Serialize to a single line of JSON, without the trailing newline
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, MalformedLine> {
        serde_json::from_str(line).map_err(MalformedLine::Parse)
    }

    pub fn into_record(self) -> Result<WalRecord, MalformedLine> {
        self.verify()?;
        match self.entry_type {
            WalEntryType::AddNode => serde_json::from_value(self.payload)
                .map(WalRecord::AddNode)
                .map_err(MalformedLine::Payload),
            WalEntryType::AddEdge => serde_json::from_value(self.payload)
                .map(WalRecord::AddEdge)
                .map_err(MalformedLine::Payload),
        }
    }
}

/// Parse, verify and decode one line
pub fn decode_line(line: &str) -> Result<WalRecord, MalformedLine> {
    WalEntry::from_line(line)?.into_record()
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
