mod dns_optimizer;
mod executor;
mod keepalive;
mod reconciler;

pub use dns_optimizer::{DnsOptimizer, DomainTarget};
pub use executor::TimeGridExecutor;
pub use keepalive::{KeepaliveEvent, KeepaliveResponder, KeepaliveResponse};
pub use reconciler::{RunningTaskHandle, TaskReconciler};
