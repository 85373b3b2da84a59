mod collector;
mod dns_optimizer;
mod http_client;
mod ip_pool;
mod status_reporter;
mod task_config;

pub use collector::Collector;
pub use dns_optimizer::{DnsFanoutPort, ProbeEnginePort};
pub use http_client::HttpClientPort;
pub use ip_pool::IpPoolPort;
pub use status_reporter::{ReportStatus, StatusReporterPort};
pub use task_config::TaskConfigPort;
