pub mod config;
pub mod errors;
pub mod grid;
pub mod ip_pool;
pub mod node;
pub mod task;

pub use config::{AgentConfig, CliOverrides};
pub use errors::{ConfigError, DomainError};
pub use grid::{should_fire, IntervalTag, UnknownInterval};
pub use ip_pool::{DnsRecord, IpInfo, ProbeConfig};
pub use node::{NodeInfo, ServerAddress, SharedNodeOverrides, SharedServerAddress};
pub use task::{CollectParams, InstType, RemoteTaskRecord, TaskInstance, TaskParamsPayload};
