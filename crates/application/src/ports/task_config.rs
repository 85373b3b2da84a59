use async_trait::async_trait;
use fleet_agent_domain::{DomainError, RemoteTaskRecord};

/// Read-only access to the authoritative task list for this node.
/// An empty list is a normal "no tasks" result, not an error.
#[async_trait]
pub trait TaskConfigPort: Send + Sync {
    async fn fetch_tasks(&self, node_id: &str) -> Result<Vec<RemoteTaskRecord>, DomainError>;
}
