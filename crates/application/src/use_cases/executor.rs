use crate::ports::{Collector, ReportStatus, StatusReporterPort};
use crate::use_cases::reconciler::TaskReconciler;
use chrono::{DateTime, Utc};
use fleet_agent_domain::{CollectParams, IntervalTag};
use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Dispatches `Collect` calls for the reconciler's running roster. Two
/// modes, per the grid:
///
/// - *Scheduled*: [`tick_scheduled`] is driven once a minute by the
///   periodic driver; it fires every `(task, interval)` pair whose
///   interval is due at `now`.
/// - *Immediate*: [`execute_immediate`] runs a single task/interval pair
///   out of band, e.g. in response to a control-plane command, without
///   waiting for the interval's next natural tick.
///
/// [`tick_scheduled`]: TimeGridExecutor::tick_scheduled
/// [`execute_immediate`]: TimeGridExecutor::execute_immediate
pub struct TimeGridExecutor {
    reconciler: Arc<TaskReconciler>,
    status_reporter: Arc<dyn StatusReporterPort>,
    shutdown: CancellationToken,
}

impl TimeGridExecutor {
    pub fn new(
        reconciler: Arc<TaskReconciler>,
        status_reporter: Arc<dyn StatusReporterPort>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            reconciler,
            status_reporter,
            shutdown,
        }
    }

    /// Fires every due `(task, interval)` pair concurrently and waits
    /// for all of them to finish before returning, so two ticks of the
    /// same minute can never overlap.
    pub async fn tick_scheduled(&self, now: DateTime<Utc>) {
        let snapshot = self.reconciler.snapshot().await;
        let mut work = Vec::new();
        for (instance, collector) in snapshot {
            for interval in &instance.intervals {
                if fleet_agent_domain::should_fire(*interval, now) {
                    work.push((instance.clone(), Arc::clone(&collector), *interval));
                }
            }
        }

        if work.is_empty() {
            return;
        }

        let futures = work.into_iter().map(|(instance, collector, interval)| {
            let status_reporter = Arc::clone(&self.status_reporter);
            let shutdown = self.shutdown.clone();
            async move {
                dispatch_one(collector, status_reporter, shutdown, &instance.task_id, instance.inst_type.clone(), instance.symbol.clone(), interval).await;
            }
        });
        join_all(futures).await;
    }

    /// Dispatches a single task/interval pair out of band. Looks the
    /// task up in the current snapshot; a task that has since been
    /// removed by the reconciler is a no-op, not an error — commands
    /// racing a reconciliation are expected.
    pub async fn execute_immediate(&self, task_id: &str, interval: IntervalTag) {
        let snapshot = self.reconciler.snapshot().await;
        let Some((instance, collector)) = snapshot.into_iter().find(|(i, _)| i.task_id == task_id) else {
            warn!(task_id = %task_id, "execute_immediate: task not running, ignored");
            return;
        };
        dispatch_one(
            collector,
            Arc::clone(&self.status_reporter),
            self.shutdown.clone(),
            &instance.task_id,
            instance.inst_type,
            instance.symbol,
            interval,
        )
        .await;
    }
}

async fn dispatch_one(
    collector: Arc<dyn Collector>,
    status_reporter: Arc<dyn StatusReporterPort>,
    shutdown: CancellationToken,
    task_id: &str,
    inst_type: fleet_agent_domain::InstType,
    symbol: String,
    interval: IntervalTag,
) {
    let params = CollectParams {
        task_id: task_id.to_string(),
        inst_type,
        symbol,
        interval,
    };
    match collector.collect(shutdown, &params).await {
        Ok(()) => {
            status_reporter.report_async(task_id.to_string(), ReportStatus::Success, "", String::new());
        }
        Err(e) => {
            info!(task_id = %task_id, interval = %interval, error = %e, "collect failed");
            status_reporter.report_async(task_id.to_string(), ReportStatus::Failed, e.error_type(), e.to_string());
        }
    }
}
