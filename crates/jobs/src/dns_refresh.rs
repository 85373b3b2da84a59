use fleet_agent_application::use_cases::DnsOptimizer;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

const DEFAULT_REFRESH_SECS: u64 = 300;

/// DNS pool refresh runs on its own, typically longer-period, ticker —
/// independent of the reconcile+execute minute ticker.
pub struct DnsRefreshJob {
    optimizer: Arc<DnsOptimizer>,
    refresh_secs: u64,
    shutdown: CancellationToken,
}

impl DnsRefreshJob {
    pub fn new(optimizer: Arc<DnsOptimizer>) -> Self {
        Self {
            optimizer,
            refresh_secs: DEFAULT_REFRESH_SECS,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_refresh_secs(mut self, secs: u64) -> Self {
        self.refresh_secs = secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(refresh_secs = self.refresh_secs, "starting DNS pool refresh job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.refresh_secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("DNS pool refresh job shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.optimizer.refresh_all().await;
                    }
                }
            }
        });
    }
}
