// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::entry::{WalEntryType, WalRecord};
use mdag_core::{MonadNode, TransitionEdge};
use std::collections::BTreeSet;
use std::io::Write;
use tempfile::tempdir;

fn hashes(graph: &DagGraph) -> BTreeSet<String> {
    graph
        .nodes()
        .map(|n| n.hash().to_string())
        .chain(graph.edges().map(|e| e.hash().to_string()))
        .collect()
}

/// Log whose edges are interleaved with nodes, plus noise
fn messy_wal(path: &Path) -> DagGraph {
    let wal = FileWal::create(path).unwrap();
    let a = MonadNode::new("prompt", "{}", vec![]);
    let b = MonadNode::new("draft", "{}", vec![a.id()]);
    let c = MonadNode::new("answer", "{}", vec![b.id()]);
    let ab = TransitionEdge::new(a.id(), b.id(), "generate");
    let bc = TransitionEdge::new(b.id(), c.id(), "refine");

    wal.append_node(&a).unwrap();
    wal.append_node(&b).unwrap();
    wal.append_edge(&ab).unwrap();
    wal.append_node(&c).unwrap();
    wal.append_node(&a).unwrap();
    wal.append_edge(&bc).unwrap();
    wal.close().unwrap();

    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    writeln!(file, "{{\"type\":\"AddEdge\"").unwrap();

    let (graph, _) = DurableGraph::restore(FileWal::open(path).unwrap())
        .unwrap()
        .into_parts();
    graph
}

#[test]
fn compaction_preserves_hashes_and_drops_noise() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let before = messy_wal(&path);

    let result = WalCompactor::new().compact(&path).unwrap();
    assert_eq!(result.entries_before, 7);
    assert_eq!(result.entries_after, 5);
    assert!(result.bytes_reclaimed > 0);

    let (after, _) = DurableGraph::restore(FileWal::open(&path).unwrap())
        .unwrap()
        .into_parts();
    assert_eq!(hashes(&after), hashes(&before));
    assert!(WalReader::open_or_empty(&path).validate().unwrap().is_clean());
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn compacted_log_lists_nodes_before_edges() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    messy_wal(&path);

    WalCompactor::new().compact(&path).unwrap();

    let kinds: Vec<WalEntryType> = WalReader::open_or_empty(&path)
        .entries()
        .unwrap()
        .map(|r| r.unwrap().entry_type())
        .collect();
    assert_eq!(
        kinds,
        vec![
            WalEntryType::AddNode,
            WalEntryType::AddNode,
            WalEntryType::AddNode,
            WalEntryType::AddEdge,
            WalEntryType::AddEdge,
        ]
    );

    let records: Vec<WalRecord> = WalReader::open_or_empty(&path)
        .entries()
        .unwrap()
        .map(Result::unwrap)
        .collect();
    let WalRecord::AddNode(first) = &records[0] else {
        panic!("expected a node first");
    };
    assert_eq!(first.type_name(), "prompt");
}

#[test]
fn compacting_twice_is_stable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    messy_wal(&path);

    WalCompactor::new().compact(&path).unwrap();
    let second = WalCompactor::new().compact(&path).unwrap();
    assert_eq!(second.entries_before, second.entries_after);
}

#[test]
fn failed_restore_leaves_original_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    let wal = FileWal::create(&path).unwrap();
    let a = MonadNode::new("prompt", "{}", vec![]);
    wal.append_edge(&TransitionEdge::new(a.id(), a.id(), "loop"))
        .unwrap();
    wal.close().unwrap();
    let original = std::fs::read(&path).unwrap();

    let err = WalCompactor::new().compact(&path).unwrap_err();
    assert!(matches!(err, CompactionError::Restore(_)));
    assert_eq!(std::fs::read(&path).unwrap(), original);
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn write_graph_replaces_existing_log() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("source.jsonl");
    let target = dir.path().join("target.jsonl");
    let graph = messy_wal(&source);
    std::fs::write(&target, "stale\n").unwrap();

    let written = WalCompactor::new().write_graph(&target, &graph).unwrap();

    assert_eq!(written, 5);
    let restored = DurableGraph::restore(FileWal::open(&target).unwrap()).unwrap();
    assert_eq!(hashes(restored.graph()), hashes(&graph));
    assert!(!temp_path_for(&target).exists());
}

#[test]
fn write_graph_failure_keeps_existing_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.jsonl");
    std::fs::write(&path, "original\n").unwrap();

    let mut graph = DagGraph::new();
    let a = MonadNode::new("prompt", "{}", vec![]);
    let a_id = a.id();
    graph.add_node(a).unwrap();
    graph
        .add_edge(TransitionEdge::new(a_id, a_id, "loop"))
        .unwrap();

    let err = WalCompactor::new().write_graph(&path, &graph).unwrap_err();
    assert!(matches!(err, CompactionError::Graph(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "original\n");
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn failed_rename_discards_temp_file() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("occupied");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep"), "x").unwrap();
    let graph = messy_wal(&dir.path().join("source.jsonl"));

    let err = WalCompactor::new().write_graph(&target, &graph).unwrap_err();
    assert!(matches!(err, CompactionError::Io(_)));
    assert!(target.join("keep").exists());
    assert!(!temp_path_for(&target).exists());
}

#[test]
fn missing_wal_is_an_error() {
    let dir = tempdir().unwrap();
    let err = WalCompactor::new()
        .compact(&dir.path().join("absent.jsonl"))
        .unwrap_err();
    assert!(matches!(err, CompactionError::Io(_)));
}
