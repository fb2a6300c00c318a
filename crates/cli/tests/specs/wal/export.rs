//! `mdag export` and `mdag import` specs

use crate::prelude::*;

#[test]
fn export_to_stdout_is_json() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    let output = temp.mdag().args(&["export", "wal.jsonl"]).passes();
    let export = output.json();
    assert_eq!(export["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(export["edges"].as_array().unwrap().len(), 2);
    assert!(output.stdout().contains(&sample.answer));
}

#[test]
fn export_then_import_round_trips() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&["export", "wal.jsonl", "-o", "graph.json"])
        .passes()
        .stdout_has("Exported 3 nodes and 2 edges");
    temp.mdag()
        .args(&["import", "graph.json", "copy.jsonl"])
        .passes()
        .stdout_has("Imported 3 nodes and 2 edges");

    temp.mdag()
        .args(&["verify", "copy.jsonl"])
        .passes()
        .stdout_has("nodes: 3  edges: 2");
    temp.mdag()
        .args(&["lineage", &sample.answer, "copy.jsonl"])
        .passes()
        .stdout_has("refine");
}

#[test]
fn import_refuses_to_overwrite_without_force() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");
    temp.mdag()
        .args(&["export", "wal.jsonl", "-o", "graph.json"])
        .passes();

    temp.mdag()
        .args(&["import", "graph.json", "wal.jsonl"])
        .fails()
        .stderr_has("--force");
    temp.mdag()
        .args(&["import", "graph.json", "wal.jsonl", "--force"])
        .passes();
}

#[test]
fn import_rejects_invalid_document() {
    let temp = Project::empty();
    temp.file("graph.json", "{\"nodes\": 7}");

    temp.mdag()
        .args(&["import", "graph.json", "wal.jsonl"])
        .fails();
    assert!(!temp.path("wal.jsonl").exists());
}

#[test]
fn failed_forced_import_keeps_existing_wal() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");
    let original = temp.read("wal.jsonl");

    // Hashes verify, but the self-loop has no dependency order
    let mut graph = mdag_core::DagGraph::new();
    let node = mdag_core::MonadNode::new("retry", "{}", vec![]);
    let id = node.id();
    graph.add_node(node).unwrap();
    graph
        .add_edge(mdag_core::TransitionEdge::new(id, id, "retry"))
        .unwrap();
    temp.file("loop.json", &graph.export().to_json().unwrap());

    temp.mdag()
        .args(&["import", "loop.json", "wal.jsonl", "--force"])
        .fails()
        .stderr_has("cycle");
    assert_eq!(temp.read("wal.jsonl"), original);
    temp.mdag().args(&["verify", "wal.jsonl"]).passes();
}
