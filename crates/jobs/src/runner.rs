use crate::{DnsRefreshJob, HeartbeatJob, ReconcileExecuteJob};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Builder collecting the driver's three jobs and the shared shutdown
/// token, modeled on the teacher's `JobRunner` (`with_*` methods, a
/// single `start()` that spawns everything).
pub struct PeriodicDriver {
    reconcile_execute: Option<ReconcileExecuteJob>,
    dns_refresh: Option<DnsRefreshJob>,
    heartbeat: Option<HeartbeatJob>,
    shutdown: Option<CancellationToken>,
}

impl PeriodicDriver {
    pub fn new() -> Self {
        Self {
            reconcile_execute: None,
            dns_refresh: None,
            heartbeat: None,
            shutdown: None,
        }
    }

    pub fn with_reconcile_execute(mut self, job: ReconcileExecuteJob) -> Self {
        self.reconcile_execute = Some(job);
        self
    }

    pub fn with_dns_refresh(mut self, job: DnsRefreshJob) -> Self {
        self.dns_refresh = Some(job);
        self
    }

    pub fn with_heartbeat(mut self, job: HeartbeatJob) -> Self {
        self.heartbeat = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub async fn start(self) {
        info!("starting periodic driver");

        if let Some(job) = self.reconcile_execute {
            let job = match &self.shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            Arc::new(job).start().await;
        }

        if let Some(job) = self.dns_refresh {
            let job = match &self.shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            Arc::new(job).start().await;
        }

        if let Some(job) = self.heartbeat {
            let job = match &self.shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            Arc::new(job).start().await;
        }

        info!("all periodic jobs started");
    }
}

impl Default for PeriodicDriver {
    fn default() -> Self {
        Self::new()
    }
}
