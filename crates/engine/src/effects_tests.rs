// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct Counting {
    seen: AtomicUsize,
}

#[async_trait]
impl PostUpdateEffect for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    async fn apply(&self, _event: &GraphEvent) -> Result<(), EffectError> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Failing;

#[async_trait]
impl PostUpdateEffect for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn apply(&self, _event: &GraphEvent) -> Result<(), EffectError> {
        Err(EffectError::new("export target unreachable"))
    }
}

struct Panicking;

#[async_trait]
impl PostUpdateEffect for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn apply(&self, _event: &GraphEvent) -> Result<(), EffectError> {
        panic!("effect bug");
    }
}

fn branch_event(name: &str) -> GraphEvent {
    GraphEvent::BranchCreated {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn shutdown_drains_queued_events() {
    let counting = Arc::new(Counting::default());
    let effects: Vec<Arc<dyn PostUpdateEffect>> = vec![counting.clone()];
    let mut worker = EffectWorker::spawn(effects, 8);

    for i in 0..5 {
        worker.submit(branch_event(&format!("b{}", i)));
    }
    worker.shutdown().await.unwrap();

    assert_eq!(counting.seen.load(Ordering::SeqCst), 5);
    let status = worker.status();
    assert_eq!(status.succeeded, 5);
    assert_eq!(status.failed, 0);
}

#[tokio::test]
async fn failures_are_recorded_and_later_effects_still_run() {
    let counting = Arc::new(Counting::default());
    let effects: Vec<Arc<dyn PostUpdateEffect>> =
        vec![Arc::new(Failing), Arc::new(Panicking), counting.clone()];
    let mut worker = EffectWorker::spawn(effects, 8);

    worker.submit(branch_event("main"));
    worker.shutdown().await.unwrap();

    let status = worker.status();
    assert_eq!(status.failed, 2);
    assert_eq!(status.succeeded, 1);
    assert_eq!(counting.seen.load(Ordering::SeqCst), 1);
    let failures: Vec<_> = status.recent_failures.iter().collect();
    assert_eq!(failures[0].effect, "failing");
    assert_eq!(failures[0].message, "export target unreachable");
    assert_eq!(failures[0].event, "branch_created");
    assert_eq!(failures[1].effect, "panicking");
}

#[tokio::test]
async fn submit_after_shutdown_is_dropped() {
    let mut worker = EffectWorker::spawn(vec![], 1);
    worker.shutdown().await.unwrap();

    worker.submit(branch_event("late"));
    assert_eq!(worker.status().dropped, 1);
}

#[test]
fn failure_log_is_bounded() {
    let mut log = EffectLog::default();
    for i in 0..(RECENT_FAILURES + 4) {
        log.record_failure(EffectFailure {
            effect: "e".to_string(),
            event: "branch_created",
            message: i.to_string(),
            at: Utc::now(),
        });
    }

    assert_eq!(log.failed, (RECENT_FAILURES + 4) as u64);
    assert_eq!(log.recent_failures.len(), RECENT_FAILURES);
    assert_eq!(log.recent_failures.front().unwrap().message, "4");
}
