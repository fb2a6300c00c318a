//! `mdag verify` specs

use crate::prelude::*;

#[test]
fn verify_reports_counts() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&["verify", "wal.jsonl"])
        .passes()
        .stdout_has("wal.jsonl: ok")
        .stdout_has("nodes: 3  edges: 2")
        .stdout_has("entries: 5 valid, 0 skipped");
}

#[test]
fn verify_tolerates_corrupted_line() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");
    temp.append_line("wal.jsonl", r#"{"type":"AddNode","payl"#);

    temp.mdag()
        .args(&["verify", "wal.jsonl"])
        .passes()
        .stdout_has("entries: 5 valid, 1 skipped")
        .stdout_has("first skipped: line 6");
}

#[test]
fn verify_json_output() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    let output = temp
        .mdag()
        .args(&["verify", "wal.jsonl", "--format", "json"])
        .passes();
    let report = output.json();
    assert_eq!(report["nodes"], 3);
    assert_eq!(report["edges"], 2);
    assert_eq!(report["skipped_lines"], 0);
}

#[test]
fn verify_rejects_tampered_node() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    // Rewrite the first node's payload without updating its hash
    let content = temp.read("wal.jsonl");
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let mut entry: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    entry["payload"]["payloadJson"] = serde_json::Value::String("{}".into());
    entry.as_object_mut().unwrap().remove("checksum");
    lines[0] = entry.to_string();
    temp.file("wal.jsonl", &(lines.join("\n") + "\n"));

    temp.mdag()
        .args(&["verify", "wal.jsonl"])
        .fails()
        .stderr_has("integrity");
}
