mod fanout;
mod ip_pool;
mod probe;

pub use fanout::UdpDnsFanout;
pub use ip_pool::InMemoryIpPool;
pub use probe::DefaultProbeEngine;
