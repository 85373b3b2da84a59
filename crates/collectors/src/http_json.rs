//! A generic JSON-over-HTTPS collector: the one concrete plug-in this
//! agent ships out of the box, parameterized by an upstream's path/query
//! template. Real deployments are expected to add source-specific
//! collectors behind the same [`Collector`] contract; this one exists so
//! `register_builtin_collectors` has something to register and so the
//! executor/reconciler tests exercise a real network call shape.

use async_trait::async_trait;
use fleet_agent_application::ports::{Collector, HttpClientPort};
use fleet_agent_domain::{CollectParams, DomainError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fetches one JSON document per `Collect` call. `path_template` and
/// `query_template` may contain `{symbol}` and `{interval}`
/// placeholders, substituted from the per-call [`CollectParams`].
pub struct HttpJsonCollector {
    http_client: Arc<dyn HttpClientPort>,
    domain: String,
    path_template: String,
    query_template: String,
}

impl HttpJsonCollector {
    pub fn new(
        http_client: Arc<dyn HttpClientPort>,
        domain: impl Into<String>,
        path_template: impl Into<String>,
        query_template: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            domain: domain.into(),
            path_template: path_template.into(),
            query_template: query_template.into(),
        }
    }

    fn render(template: &str, symbol: &str, interval: &str) -> String {
        template.replace("{symbol}", symbol).replace("{interval}", interval)
    }
}

#[async_trait]
impl Collector for HttpJsonCollector {
    async fn collect(&self, ctx: CancellationToken, params: &CollectParams) -> Result<(), DomainError> {
        let path = Self::render(&self.path_template, &params.symbol, params.interval.as_str());
        let query = Self::render(&self.query_template, &params.symbol, params.interval.as_str());

        debug!(task_id = %params.task_id, domain = %self.domain, path, "collecting");

        let fetch = self.http_client.get_json(&self.domain, &path, &query);
        let value = tokio::select! {
            _ = ctx.cancelled() => {
                warn!(task_id = %params.task_id, "collect cancelled before completion");
                return Err(DomainError::Other("cancelled".to_string()));
            }
            result = fetch => result?,
        };

        let record_count = value.as_array().map(|a| a.len()).unwrap_or(1);
        info!(task_id = %params.task_id, record_count, "collect completed");
        Ok(())
    }
}
