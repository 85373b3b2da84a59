use crate::ports::Collector;
use dashmap::DashMap;
use fleet_agent_domain::DomainError;
use std::sync::Arc;

/// Process-wide `(source, data_type) -> Collector` table. Built once
/// during bootstrap by `register_builtin_collectors()`; double
/// registration of the same key is a startup error, not a silent
/// overwrite — a plug-in that accidentally shadows another is a bug
/// worth failing loudly on, not a runtime surprise.
#[derive(Default)]
pub struct CollectorRegistry {
    collectors: DashMap<(String, String), Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        source: impl Into<String>,
        data_type: impl Into<String>,
        collector: Arc<dyn Collector>,
    ) -> Result<(), DomainError> {
        let key = (source.into(), data_type.into());
        if self.collectors.contains_key(&key) {
            return Err(DomainError::Other(format!(
                "collector already registered for ({}, {})",
                key.0, key.1
            )));
        }
        self.collectors.insert(key, collector);
        Ok(())
    }

    pub fn get(&self, source: &str, data_type: &str) -> Option<Arc<dyn Collector>> {
        self.collectors
            .get(&(source.to_string(), data_type.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }
}
