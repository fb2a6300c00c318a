//! `mdag stats` specs

use crate::prelude::*;

#[test]
fn stats_counts_types_and_operations() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&["stats", "wal.jsonl"])
        .passes()
        .stdout_has("nodes: 3  edges: 2  roots: 1  leaves: 1")
        .stdout_has("generate")
        .stdout_has("total duration: 40ms");
}

#[test]
fn stats_json_output() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    let output = temp
        .mdag()
        .args(&["stats", "wal.jsonl", "--format", "json"])
        .passes();
    let state = output.json();
    assert_eq!(state["totalNodes"], 3);
    assert_eq!(state["nodeCountsByType"]["draft"], 1);
    assert_eq!(state["edgeCountsByOperation"]["refine"], 1);
    assert_eq!(state["rootNodeIds"][0], sample.prompt.as_str());
    assert!((state["averageConfidence"].as_f64().unwrap() - 0.7).abs() < 1e-9);
}
