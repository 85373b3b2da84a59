//! Control-plane task-roster client: `GET
//! {base}/gateway/collectmgr/GetNodeTasks?node_id=...`, returning a
//! bare JSON array of task records (open question resolved in
//! DESIGN.md — the control-plane wire format itself is out of scope,
//! this is the shape the client expects).

use async_trait::async_trait;
use fleet_agent_application::ports::TaskConfigPort;
use fleet_agent_domain::{DomainError, RemoteTaskRecord, SharedServerAddress};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct HttpTaskConfigClient {
    client: reqwest::Client,
    server_address: Arc<SharedServerAddress>,
}

impl HttpTaskConfigClient {
    pub fn new(server_address: Arc<SharedServerAddress>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, server_address }
    }
}

#[async_trait]
impl TaskConfigPort for HttpTaskConfigClient {
    async fn fetch_tasks(&self, node_id: &str) -> Result<Vec<RemoteTaskRecord>, DomainError> {
        let base = self.server_address.get().base_url();
        let url = format!("{base}/gateway/collectmgr/GetNodeTasks?node_id={node_id}");
        debug!(url = %url, "fetching task roster");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::TransientNetwork(format!("GetNodeTasks request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::TransientNetwork(format!(
                "GetNodeTasks returned HTTP {status}"
            )));
        }

        response
            .json::<Vec<RemoteTaskRecord>>()
            .await
            .map_err(|e| DomainError::TransientNetwork(format!("malformed GetNodeTasks response: {e}")))
    }
}
