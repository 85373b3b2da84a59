use crate::ports::{Collector, ReportStatus, StatusReporterPort};
use crate::registry::CollectorRegistry;
use chrono::{DateTime, Utc};
use fleet_agent_domain::{
    CollectParams, DomainError, InstType, NodeInfo, ServerAddress, SharedNodeOverrides, SharedServerAddress,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Inbound event shape, exactly spec.md §6:
/// `{action, source, timestamp, request_id, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeepaliveEvent {
    pub action: String,
    #[serde(default)]
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    #[serde(default)]
    pub data: Value,
}

/// Outbound response shape, exactly spec.md §6:
/// `{success, message, data, request_id, timestamp}`.
#[derive(Debug, Clone, Serialize)]
pub struct KeepaliveResponse {
    pub success: bool,
    pub message: String,
    pub data: Value,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl KeepaliveResponse {
    fn ok(request_id: String, message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            request_id,
            timestamp: Utc::now(),
        }
    }

    fn err(request_id: String, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Value::Null,
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct KeepaliveHints {
    internal_ip: Option<String>,
    server_port: Option<u16>,
    probe_node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TaskExecutePayload {
    task_id: String,
    data_source: String,
    data_type: String,
    inst_type: String,
    symbol: String,
    intervals: Vec<String>,
}

/// Handles the control plane's out-of-band event channel: keepalive
/// pings that may carry fresh server-address/node-identity hints, and
/// `task` commands that trigger immediate (non-grid-aligned) collector
/// execution. Never clock-driven — fully request/response.
pub struct KeepaliveResponder {
    node_info: NodeInfo,
    server_address: Arc<SharedServerAddress>,
    node_overrides: Arc<SharedNodeOverrides>,
    registry: Arc<CollectorRegistry>,
    status_reporter: Arc<dyn StatusReporterPort>,
}

impl KeepaliveResponder {
    pub fn new(
        node_info: NodeInfo,
        server_address: Arc<SharedServerAddress>,
        node_overrides: Arc<SharedNodeOverrides>,
        registry: Arc<CollectorRegistry>,
        status_reporter: Arc<dyn StatusReporterPort>,
    ) -> Self {
        Self {
            node_info,
            server_address,
            node_overrides,
            registry,
            status_reporter,
        }
    }

    pub async fn handle(&self, event: KeepaliveEvent) -> KeepaliveResponse {
        match event.action.as_str() {
            "keepalive" | "health" => self.handle_keepalive(event),
            "task" => self.handle_task(event).await,
            other => {
                warn!(action = %other, "keepalive_parse_failed: unknown action");
                KeepaliveResponse::err(event.request_id, format!("unknown action: {other}"))
            }
        }
    }

    fn handle_keepalive(&self, event: KeepaliveEvent) -> KeepaliveResponse {
        if !event.data.is_null() {
            match serde_json::from_value::<KeepaliveHints>(event.data.clone()) {
                Ok(hints) => {
                    if let (Some(ip), Some(port)) = (hints.internal_ip, hints.server_port) {
                        self.server_address.set(ServerAddress { ip, port });
                    }
                    if let Some(node_id) = hints.probe_node_id {
                        self.node_overrides.set_probe_node_id(node_id);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "keepalive_parse_failed: hints payload malformed, ignored");
                }
            }
        }

        let data = serde_json::to_value(&self.node_info).unwrap_or(Value::Null);
        KeepaliveResponse::ok(event.request_id, "ok", data)
    }

    async fn handle_task(&self, event: KeepaliveEvent) -> KeepaliveResponse {
        let payload: TaskExecutePayload = match serde_json::from_value(event.data) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "keepalive_parse_failed: task payload malformed");
                return KeepaliveResponse::err(event.request_id, format!("keepalive_parse_failed: {e}"));
            }
        };

        let Some(collector) = self.registry.get(&payload.data_source, &payload.data_type) else {
            let err = DomainError::CollectorNotFound(payload.data_source.clone(), payload.data_type.clone());
            let msg = err.to_string();
            self.status_reporter
                .report_async(payload.task_id.clone(), ReportStatus::Failed, err.error_type(), msg.clone());
            return KeepaliveResponse::err(event.request_id, msg);
        };

        let inst_type = InstType::from(payload.inst_type.as_str());
        let mut last_err: Option<DomainError> = None;
        let mut any_ran = false;

        for raw_interval in &payload.intervals {
            let Ok(interval) = raw_interval.parse() else {
                warn!(interval = %raw_interval, "unknown interval tag in task event, ignored");
                continue;
            };
            any_ran = true;
            let params = CollectParams {
                task_id: payload.task_id.clone(),
                inst_type: inst_type.clone(),
                symbol: payload.symbol.clone(),
                interval,
            };
            if let Err(e) = collector.collect(CancellationToken::new(), &params).await {
                last_err = Some(e);
            }
        }

        let (status, error_type, message) = match (&last_err, any_ran) {
            (None, true) => (ReportStatus::Success, "", String::new()),
            (None, false) => {
                let err = DomainError::ConfigInvalid(payload.task_id.clone(), "no valid intervals in task event".to_string());
                let msg = err.to_string();
                (ReportStatus::Failed, err.error_type(), msg)
            }
            (Some(e), _) => (ReportStatus::Failed, e.error_type(), e.to_string()),
        };
        let success = matches!(status, ReportStatus::Success);
        self.status_reporter
            .report_async(payload.task_id.clone(), status, error_type, message.clone());

        if success {
            KeepaliveResponse::ok(event.request_id, "task executed", Value::Null)
        } else {
            KeepaliveResponse::err(event.request_id, message)
        }
    }
}
