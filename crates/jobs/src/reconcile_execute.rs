use chrono::Utc;
use fleet_agent_application::use_cases::{TaskReconciler, TimeGridExecutor};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_TICK_SECS: u64 = 60;

/// The one-minute ticker: on every tick, reconciliation completes
/// before execution begins (strictly serial — the two awaits are
/// sequential in the same loop iteration, so they never overlap), and
/// a missed tick (reconcile+execute ran long) is skipped rather than
/// queued.
pub struct ReconcileExecuteJob {
    reconciler: Arc<TaskReconciler>,
    executor: Arc<TimeGridExecutor>,
    tick_secs: u64,
    shutdown: CancellationToken,
}

impl ReconcileExecuteJob {
    pub fn new(reconciler: Arc<TaskReconciler>, executor: Arc<TimeGridExecutor>) -> Self {
        Self {
            reconciler,
            executor,
            tick_secs: DEFAULT_TICK_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_tick_secs(mut self, secs: u64) -> Self {
        self.tick_secs = secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(tick_secs = self.tick_secs, "starting reconcile+execute job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.tick_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("reconcile+execute job shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.reconciler.sync().await;
                        self.executor.tick_scheduled(Utc::now()).await;
                    }
                }
            }
        });
    }
}
