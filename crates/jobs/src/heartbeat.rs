use fleet_agent_application::use_cases::TaskReconciler;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Periodic liveness signal: an `info`-level log line carrying the
/// current roster size. The control plane already learns this node is
/// up from keepalive responses and task-config fetches; this job gives
/// operators a local, always-on heartbeat independent of control-plane
/// connectivity.
pub struct HeartbeatJob {
    node_id: String,
    reconciler: Arc<TaskReconciler>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl HeartbeatJob {
    pub fn new(node_id: String, reconciler: Arc<TaskReconciler>) -> Self {
        Self {
            node_id,
            reconciler,
            interval_secs: DEFAULT_HEARTBEAT_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "starting heartbeat job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("heartbeat job shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let running = self.reconciler.running_count().await;
                        info!(node_id = %self.node_id, running_tasks = running, "heartbeat");
                    }
                }
            }
        });
    }
}
