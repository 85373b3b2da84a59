mod common;

use chrono::{TimeZone, Utc};
use common::{RecordingReporter, SleepingCollector};
use fleet_agent_application::registry::CollectorRegistry;
use fleet_agent_application::use_cases::{TaskReconciler, TimeGridExecutor};
use fleet_agent_domain::RemoteTaskRecord;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Property 5 (executor parallelism): N distinct tasks all firing in the
/// same tick, each sleeping S, complete in close to S wall time rather
/// than N*S — the tick dispatches every due work item concurrently via
/// `join_all`, not one at a time.
#[tokio::test]
async fn tick_dispatches_work_items_concurrently() {
    const N: usize = 8;
    const SLEEP: Duration = Duration::from_millis(200);

    let registry = Arc::new(CollectorRegistry::new());
    for i in 0..N {
        registry
            .register("ex", format!("kline{i}"), Arc::new(SleepingCollector { sleep: SLEEP }))
            .unwrap();
    }

    let records: Vec<RemoteTaskRecord> = (0..N)
        .map(|i| RemoteTaskRecord {
            task_id: format!("t{i}"),
            node_id: "n1".into(),
            params: task_params_for(i, &["1m"]),
            invalid: 0,
        })
        .collect();

    let task_config = Arc::new(common::FakeTaskConfigPort::new(records));
    let reporter = Arc::new(RecordingReporter::default());
    let reconciler = Arc::new(TaskReconciler::new(
        "n1".into(),
        task_config,
        registry,
        reporter.clone(),
    ));
    reconciler.sync().await;
    assert_eq!(reconciler.running_count().await, N);

    let executor = TimeGridExecutor::new(reconciler, reporter.clone(), CancellationToken::new());
    let now = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();

    let start = Instant::now();
    executor.tick_scheduled(now).await;
    let elapsed = start.elapsed();

    assert_eq!(reporter.success_count(), N as u32);
    // Sequential dispatch would take N*SLEEP (1.6s for N=8); concurrent
    // dispatch should finish well under half that.
    assert!(
        elapsed < SLEEP * 2,
        "tick took {elapsed:?}, expected close to {SLEEP:?} if dispatched concurrently"
    );
}

fn task_params_for(i: usize, intervals: &[&str]) -> String {
    serde_json::json!({
        "data_type": format!("kline{i}"),
        "data_source": "ex",
        "inst_type": "SPOT",
        "symbol": "BTC-USDT",
        "intervals": intervals,
    })
    .to_string()
}
