//! `mdag lineage` specs

use crate::prelude::*;

#[test]
fn lineage_lists_transitions_oldest_first() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    let output = temp
        .mdag()
        .args(&["lineage", &sample.answer, "wal.jsonl"])
        .passes();
    let generate = output.stdout().find("generate").unwrap();
    let refine = output.stdout().find("refine").unwrap();
    assert!(generate < refine);
    output.stdout_has("(0.90)");
}

#[test]
fn lineage_of_root_is_empty() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&["lineage", &sample.prompt, "wal.jsonl"])
        .passes()
        .stdout_eq(&format!("{} has no recorded transitions\n", sample.prompt));
}

#[test]
fn lineage_of_unknown_node_fails() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&[
            "lineage",
            "00000000-0000-4000-8000-000000000000",
            "wal.jsonl",
        ])
        .fails()
        .stderr_has("node not found");
}

#[test]
fn lineage_json_output() {
    let temp = Project::empty();
    let sample = temp.sample_wal("wal.jsonl");

    let output = temp
        .mdag()
        .args(&["--format", "json", "lineage", &sample.draft, "wal.jsonl"])
        .passes();
    let report = output.json();
    let steps = report["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["operation"], "generate");
    assert_eq!(steps[0]["inputIds"][0], sample.prompt.as_str());
}
