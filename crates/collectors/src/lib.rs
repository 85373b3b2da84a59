mod http_json;

pub use http_json::HttpJsonCollector;

use fleet_agent_application::ports::HttpClientPort;
use fleet_agent_application::registry::CollectorRegistry;
use fleet_agent_domain::DomainError;
use std::sync::Arc;

/// Registers every collector this binary ships with. Bootstrap calls
/// this once before starting the periodic driver; a duplicate
/// `(source, data_type)` registration is a startup bug and this
/// propagates it rather than swallowing it.
pub fn register_builtin_collectors(
    registry: &CollectorRegistry,
    http_client: Arc<dyn HttpClientPort>,
) -> Result<(), DomainError> {
    registry.register(
        "binance",
        "kline",
        Arc::new(HttpJsonCollector::new(
            Arc::clone(&http_client),
            "api.binance.com",
            "/api/v3/klines",
            "symbol={symbol}&interval={interval}&limit=1",
        )),
    )?;

    Ok(())
}
