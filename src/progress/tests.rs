use super::*;
use crate::dispatch::RunState;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

#[test]
fn test_rate_and_eta() {
    let snapshot = ProgressSnapshot::compute(50, 0, 200, Duration::from_secs(10));
    assert_eq!(snapshot.rate, 5.0);
    assert_eq!(snapshot.eta_secs, Some(30.0));
    assert_eq!(snapshot.percent(), 25.0);
}

#[test]
fn test_zero_elapsed_has_zero_rate_and_unknown_eta() {
    let snapshot = ProgressSnapshot::compute(50, 0, 200, Duration::ZERO);
    assert_eq!(snapshot.rate, 0.0);
    assert_eq!(snapshot.eta_secs, None);
}

#[test]
fn test_zero_rate_has_unknown_eta() {
    let snapshot = ProgressSnapshot::compute(0, 10, 200, Duration::from_secs(3));
    assert_eq!(snapshot.rate, 0.0);
    assert_eq!(snapshot.eta_secs, None);
    assert_eq!(snapshot.failed, 10);
}

#[test]
fn test_finished_run_has_zero_eta() {
    let snapshot = ProgressSnapshot::compute(200, 0, 200, Duration::from_secs(4));
    assert_eq!(snapshot.eta_secs, Some(0.0));
    assert_eq!(snapshot.percent(), 100.0);
}

#[test]
fn test_zero_total_percent() {
    let snapshot = ProgressSnapshot::compute(0, 0, 0, Duration::from_secs(1));
    assert_eq!(snapshot.percent(), 0.0);
}

#[test]
fn test_display() {
    let snapshot = ProgressSnapshot::compute(50, 0, 200, Duration::from_secs(10));
    assert_eq!(
        snapshot.to_string(),
        "Progress: 50/200 (25.0%) | Rate: 5 logs/sec | ETA: 30s"
    );

    let unknown = ProgressSnapshot::compute(0, 0, 200, Duration::ZERO);
    assert_eq!(
        unknown.to_string(),
        "Progress: 0/200 (0.0%) | Rate: 0 logs/sec | ETA: unknown"
    );
}

#[test]
fn test_snapshot_reads_shared_counters() {
    let state = Arc::new(RunState::new());
    state.record_inserted(40);
    state.record_failed(10);
    let tracker = ProgressTracker::new(state, 100, Duration::from_secs(5));

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.inserted, 40);
    assert_eq!(snapshot.failed, 10);
    assert_eq!(snapshot.total, 100);
}

#[tokio::test]
async fn test_snapshots_follow_counters_until_done() {
    let state = Arc::new(RunState::new());
    let tracker = ProgressTracker::new(state.clone(), 100, Duration::from_millis(20));
    let done = CancellationToken::new();
    let mut stream = Box::pin(tracker.snapshots(done.clone()));

    state.record_inserted(10);
    let first = timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.inserted, 10);

    state.record_inserted(15);
    let second = timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.inserted, 25);
    assert!(second.elapsed >= first.elapsed);

    done.cancel();
    let end = timeout(Duration::from_secs(1), stream.next()).await.unwrap();
    assert!(end.is_none());
}

#[tokio::test]
async fn test_report_stops_on_done() {
    let state = Arc::new(RunState::new());
    let tracker = ProgressTracker::new(state, 10, Duration::from_millis(10));
    let done = CancellationToken::new();

    let handle = tokio::spawn(tracker.report(done.clone()));
    tokio::time::sleep(Duration::from_millis(35)).await;
    done.cancel();

    timeout(Duration::from_secs(1), handle)
        .await
        .expect("report should finish after cancellation")
        .unwrap();
}
