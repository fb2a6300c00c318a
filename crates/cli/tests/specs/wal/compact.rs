//! `mdag compact` specs

use crate::prelude::*;

#[test]
fn compact_drops_malformed_lines() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");
    temp.append_line("wal.jsonl", "not json at all");

    temp.mdag()
        .args(&["compact", "wal.jsonl"])
        .passes()
        .stdout_has("6 -> 5 entries");

    temp.mdag()
        .args(&["verify", "wal.jsonl"])
        .passes()
        .stdout_has("entries: 5 valid, 0 skipped");
    assert!(!temp.path("wal.jsonl.compact.tmp").exists());
}

#[test]
fn compact_json_output() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    let output = temp
        .mdag()
        .args(&["--format", "json", "compact", "wal.jsonl"])
        .passes();
    let report = output.json();
    assert_eq!(report["entries_before"], 5);
    assert_eq!(report["entries_after"], 5);
}
