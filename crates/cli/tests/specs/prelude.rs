//! Shared helpers for CLI specs

#![allow(dead_code)]

use assert_cmd::Command;
use mdag_core::{MonadNode, TransitionEdge};
use mdag_storage::{DurableGraph, FileWal};
use std::path::PathBuf;
use tempfile::TempDir;

pub use predicates::prelude::*;

/// A scratch directory the CLI runs in
pub struct Project {
    dir: TempDir,
}

/// Ids written by [`Project::sample_wal`]
pub struct Sample {
    pub prompt: String,
    pub draft: String,
    pub answer: String,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path(rel)).unwrap()
    }

    pub fn append_line(&self, rel: &str, line: &str) {
        let mut content = self.read(rel);
        content.push_str(line);
        content.push('\n');
        std::fs::write(self.path(rel), content).unwrap();
    }

    /// prompt -> draft -> answer, linked by "generate" and "refine"
    pub fn sample_wal(&self, rel: &str) -> Sample {
        let prompt = MonadNode::new("prompt", r#"{"text":"why?"}"#, vec![]);
        let draft = MonadNode::new("draft", r#"{"text":"because"}"#, vec![prompt.id()]);
        let answer = MonadNode::new("answer", r#"{"text":"because."}"#, vec![draft.id()]);
        let generate = TransitionEdge::builder(vec![prompt.id()], draft.id(), "generate")
            .confidence(0.5)
            .build();
        let refine = TransitionEdge::builder(vec![draft.id()], answer.id(), "refine")
            .confidence(0.9)
            .duration_ms(40)
            .build();

        let sample = Sample {
            prompt: prompt.id().to_string(),
            draft: draft.id().to_string(),
            answer: answer.id().to_string(),
        };

        let mut durable = DurableGraph::new(FileWal::create(&self.path(rel)).unwrap());
        durable.add_node_durable(prompt).unwrap();
        durable.add_node_durable(draft).unwrap();
        durable.add_node_durable(answer).unwrap();
        durable.add_edge_durable(generate).unwrap();
        durable.add_edge_durable(refine).unwrap();
        durable.flush().unwrap();
        durable.close().unwrap();
        sample
    }

    pub fn mdag(&self) -> Cli {
        let mut cmd = Command::cargo_bin("mdag").unwrap();
        cmd.current_dir(self.dir.path()).env_remove("RUST_LOG");
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Hand off to `assert_cmd` for predicate-based checks
    pub fn assert(mut self) -> assert_cmd::assert::Assert {
        self.cmd.assert()
    }

    fn run(mut self) -> (bool, Output) {
        let output = self.cmd.output().unwrap();
        (
            output.status.success(),
            Output {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
        )
    }

    pub fn passes(self) -> Output {
        let (success, output) = self.run();
        assert!(
            success,
            "expected success\nstdout:\n{}\nstderr:\n{}",
            output.stdout, output.stderr
        );
        output
    }

    pub fn fails(self) -> Output {
        let (success, output) = self.run();
        assert!(!success, "expected failure\nstdout:\n{}", output.stdout);
        output
    }
}

pub struct Output {
    stdout: String,
    stderr: String,
}

impl Output {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        assert!(
            self.stdout.contains(expected),
            "stdout missing {:?}\nstdout:\n{}",
            expected,
            self.stdout
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        assert!(
            self.stderr.contains(expected),
            "stderr missing {:?}\nstderr:\n{}",
            expected,
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
