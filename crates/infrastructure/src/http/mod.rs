mod ip_pinned_client;
mod status_reporter;
mod task_config_client;

pub use ip_pinned_client::IpPinnedHttpClient;
pub use status_reporter::HttpStatusReporter;
pub use task_config_client::HttpTaskConfigClient;
