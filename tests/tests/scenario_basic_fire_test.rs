mod common;

use chrono::{TimeZone, Utc};
use common::{task_params, CountingCollector, FakeTaskConfigPort, RecordingReporter};
use fleet_agent_application::registry::CollectorRegistry;
use fleet_agent_application::use_cases::{TaskReconciler, TimeGridExecutor};
use fleet_agent_domain::{IntervalTag, RemoteTaskRecord};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// S1 (basic fire): one task with a single `1m` interval, registered
/// collector counts calls. Three simulated ticks one minute apart each
/// fire the task once, each producing a success report.
#[tokio::test]
async fn s1_basic_fire_three_ticks_three_calls_three_successes() {
    let registry = Arc::new(CollectorRegistry::new());
    let collector = Arc::new(CountingCollector::default());
    registry.register("ex", "kline", collector.clone()).unwrap();

    let task_config = Arc::new(FakeTaskConfigPort::new(vec![RemoteTaskRecord {
        task_id: "t1".into(),
        node_id: "n1".into(),
        params: task_params(&["1m"]),
        invalid: 0,
    }]));
    let reporter = Arc::new(RecordingReporter::default());
    let reconciler = Arc::new(TaskReconciler::new(
        "n1".into(),
        task_config,
        registry,
        reporter.clone(),
    ));
    reconciler.sync().await;

    let executor = TimeGridExecutor::new(reconciler, reporter.clone(), CancellationToken::new());

    let base = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    executor.tick_scheduled(base).await;
    executor.tick_scheduled(base + chrono::Duration::minutes(1)).await;
    executor.tick_scheduled(base + chrono::Duration::minutes(2)).await;

    assert_eq!(collector.call_count(), 3);
    assert_eq!(reporter.success_count(), 3);
    assert_eq!(reporter.failed_count(), 0);
}

/// S2 (multi-interval): a task firing `1m`, `5m`, `1h` all lines up at
/// `12:00` (three work items); at `12:01` only `1m` is due.
#[tokio::test]
async fn s2_multi_interval_fires_all_at_alignment_then_only_fastest() {
    let registry = Arc::new(CollectorRegistry::new());
    let collector = Arc::new(CountingCollector::default());
    registry.register("ex", "kline", collector.clone()).unwrap();

    let task_config = Arc::new(FakeTaskConfigPort::new(vec![RemoteTaskRecord {
        task_id: "t1".into(),
        node_id: "n1".into(),
        params: task_params(&["1m", "5m", "1h"]),
        invalid: 0,
    }]));
    let reporter = Arc::new(RecordingReporter::default());
    let reconciler = Arc::new(TaskReconciler::new(
        "n1".into(),
        task_config,
        registry,
        reporter.clone(),
    ));
    reconciler.sync().await;

    let executor = TimeGridExecutor::new(reconciler, reporter, CancellationToken::new());

    let noon = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
    executor.tick_scheduled(noon).await;
    assert_eq!(collector.call_count(), 3);
    assert_eq!(collector.calls_for_interval(IntervalTag::M1), 1);
    assert_eq!(collector.calls_for_interval(IntervalTag::M5), 1);
    assert_eq!(collector.calls_for_interval(IntervalTag::H1), 1);

    executor.tick_scheduled(noon + chrono::Duration::minutes(1)).await;
    assert_eq!(collector.call_count(), 4);
    assert_eq!(collector.calls_for_interval(IntervalTag::M1), 2);
    assert_eq!(collector.calls_for_interval(IntervalTag::M5), 1);
}
