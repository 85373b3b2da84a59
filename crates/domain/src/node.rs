use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity and capability snapshot for this node, built once at
/// startup. The `server` address is the only piece that later moves
/// (via keepalive updates), so it's kept as a separate global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub node_id: String,
    pub node_type: String,
    pub region: String,
    pub namespace: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub metadata: std::collections::HashMap<String, String>,
}

/// Control-plane address. Reads are racy-tolerant (last write wins);
/// writes come from keepalive events carrying fresher hints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerAddress {
    pub ip: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}

/// Process-global, lock-free accessor for the control-plane address.
/// Grounded on the same `arc-swap` crate the teacher uses for
/// hot-reloadable state — here applied to a single small value instead
/// of a large filter table, but the same "swap the whole thing
/// atomically, readers never block" contract.
pub struct SharedServerAddress {
    inner: ArcSwap<ServerAddress>,
}

impl SharedServerAddress {
    pub fn new(initial: ServerAddress) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
        }
    }

    pub fn get(&self) -> Arc<ServerAddress> {
        self.inner.load_full()
    }

    pub fn set(&self, addr: ServerAddress) {
        self.inner.store(Arc::new(addr));
    }
}

/// Mutable node-identity overrides a keepalive event may carry (e.g. a
/// probe node-ID hint). Kept separate from the immutable startup
/// `NodeInfo` fields that never change post-boot.
pub struct SharedNodeOverrides {
    inner: ArcSwap<Option<String>>,
}

impl SharedNodeOverrides {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(None)),
        }
    }

    pub fn probe_node_id(&self) -> Option<String> {
        (*self.inner.load_full()).clone()
    }

    pub fn set_probe_node_id(&self, node_id: String) {
        self.inner.store(Arc::new(Some(node_id)));
    }
}

impl Default for SharedNodeOverrides {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_address_updates_are_visible_immediately() {
        let shared = SharedServerAddress::new(ServerAddress {
            ip: "10.0.0.1".into(),
            port: 9000,
        });
        assert_eq!(shared.get().port, 9000);

        shared.set(ServerAddress {
            ip: "10.0.0.2".into(),
            port: 9100,
        });
        let now = shared.get();
        assert_eq!(now.ip, "10.0.0.2");
        assert_eq!(now.port, 9100);
    }
}
