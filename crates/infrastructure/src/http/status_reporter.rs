//! Fire-and-forget status reporting. Bounded by a `Semaphore`, the same
//! "owned permit guards an async unit of work" idiom the teacher uses
//! for its UDP socket pool (`dns::transport::udp_pool::UdpSocketPool`) —
//! here guarding outbound report POSTs instead of sockets. Over
//! capacity, a report is dropped with a warning rather than queued,
//! since the data path must never stall on telemetry.

use chrono::Utc;
use fleet_agent_application::ports::{ReportStatus, StatusReporterPort};
use fleet_agent_domain::SharedServerAddress;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ReportTaskErrorRequest {
    task_id: String,
    node_id: String,
    error_type: String,
    error_msg: String,
    timestamp: chrono::DateTime<Utc>,
}

pub struct HttpStatusReporter {
    client: reqwest::Client,
    server_address: Arc<SharedServerAddress>,
    node_id: String,
    semaphore: Arc<Semaphore>,
}

impl HttpStatusReporter {
    pub fn new(server_address: Arc<SharedServerAddress>, node_id: String, max_in_flight: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            server_address,
            node_id,
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
        }
    }
}

impl StatusReporterPort for HttpStatusReporter {
    fn report_async(&self, task_id: String, status: ReportStatus, error_type: &'static str, message: String) {
        // Only failures cross the network; a success is implicit in the
        // absence of an error report and is logged locally.
        if matches!(status, ReportStatus::Success) {
            debug!(task_id, "collect succeeded");
            return;
        }

        let permit = match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(task_id, "status reporter at capacity, dropping report");
                return;
            }
        };

        let client = self.client.clone();
        let base = self.server_address.get().base_url();
        let node_id = self.node_id.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let url = format!("{base}/gateway/collectmgr/ReportTaskError");
            let body = ReportTaskErrorRequest {
                task_id: task_id.clone(),
                node_id,
                error_type: error_type.to_string(),
                error_msg: message,
                timestamp: Utc::now(),
            };

            match client.post(&url).json(&body).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(task_id, "status report delivered");
                }
                Ok(resp) => {
                    warn!(task_id, status = %resp.status(), "status report rejected, treated as transient");
                }
                Err(e) => {
                    warn!(task_id, error = %e, "status report failed, treated as transient");
                }
            }
        });
    }
}
