use fleet_agent_application::use_cases::KeepaliveResponder;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub keepalive: Arc<KeepaliveResponder>,
}

impl AppState {
    pub fn new(keepalive: Arc<KeepaliveResponder>) -> Self {
        Self { keepalive }
    }
}
