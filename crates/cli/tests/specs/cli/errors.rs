//! Error reporting specs

use crate::prelude::*;

#[test]
fn missing_wal_fails() {
    let temp = Project::empty();

    temp.mdag()
        .args(&["verify", "absent.jsonl"])
        .fails()
        .stderr_has("WAL not found");
}

#[test]
fn unknown_subcommand_fails() {
    let temp = Project::empty();

    temp.mdag().args(&["rewind"]).fails();
}

#[test]
fn malformed_node_id_fails() {
    let temp = Project::empty();
    temp.sample_wal("wal.jsonl");

    temp.mdag()
        .args(&["lineage", "not-a-uuid", "wal.jsonl"])
        .fails()
        .stderr_has("invalid node id");
}

#[test]
fn bad_config_fails() {
    let temp = Project::empty();
    temp.file("mdag.toml", "flush_every = \"often\"\n");

    temp.mdag()
        .args(&["--config", "mdag.toml", "verify"])
        .fails()
        .stderr_has("TOML parse error");
}

#[test]
fn config_supplies_wal_path() {
    let temp = Project::empty();
    temp.sample_wal("data/graph.jsonl");
    temp.file("mdag.toml", "wal_path = \"data/graph.jsonl\"\n");

    temp.mdag()
        .args(&["--config", "mdag.toml", "verify"])
        .passes()
        .stdout_has("nodes: 3  edges: 2");
}
