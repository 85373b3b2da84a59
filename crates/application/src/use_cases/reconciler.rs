use crate::ports::{Collector, ReportStatus, StatusReporterPort, TaskConfigPort};
use crate::registry::CollectorRegistry;
use chrono::Utc;
use fleet_agent_domain::{DomainError, InstType, TaskInstance, TaskParamsPayload};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// A reconciler-owned binding of an installed task to its live
/// collector. One per `task_id`, at most, at any instant.
pub struct RunningTaskHandle {
    pub task_instance: TaskInstance,
    pub collector: Arc<dyn Collector>,
    pub started_at: chrono::DateTime<Utc>,
    pub params_hash: u64,
}

/// Drives the locally-installed task roster to match the control
/// plane's authoritative list. Owns `running` exclusively; the
/// executor only ever reads a snapshot through [`TaskReconciler::snapshot`].
pub struct TaskReconciler {
    node_id: String,
    task_config: Arc<dyn TaskConfigPort>,
    registry: Arc<CollectorRegistry>,
    status_reporter: Arc<dyn StatusReporterPort>,
    running: RwLock<HashMap<String, RunningTaskHandle>>,
}

impl TaskReconciler {
    pub fn new(
        node_id: String,
        task_config: Arc<dyn TaskConfigPort>,
        registry: Arc<CollectorRegistry>,
        status_reporter: Arc<dyn StatusReporterPort>,
    ) -> Self {
        Self {
            node_id,
            task_config,
            registry,
            status_reporter,
            running: RwLock::new(HashMap::new()),
        }
    }

    /// A point-in-time, read-only view of the running roster for the
    /// executor to materialize work items from.
    pub async fn snapshot(&self) -> Vec<(TaskInstance, Arc<dyn Collector>)> {
        self.running
            .read()
            .await
            .values()
            .map(|h| (h.task_instance.clone(), Arc::clone(&h.collector)))
            .collect()
    }

    pub async fn running_count(&self) -> usize {
        self.running.read().await.len()
    }

    pub async fn sync(&self) {
        if self.node_id.is_empty() {
            return;
        }

        let records = match self.task_config.fetch_tasks(&self.node_id).await {
            Ok(records) => records,
            Err(e) => {
                // Catastrophic fetch failure: log-and-return without mutating state.
                error!(error = %e, node_id = %self.node_id, "task reconciliation: fetch failed");
                return;
            }
        };

        let mut desired: HashMap<String, TaskInstance> = HashMap::new();
        for record in records {
            if record.invalid != 0 {
                continue;
            }
            match serde_json::from_str::<TaskParamsPayload>(&record.params) {
                Ok(payload) => {
                    let mut intervals = HashSet::new();
                    for tag in &payload.intervals {
                        match tag.parse() {
                            Ok(parsed) => {
                                intervals.insert(parsed);
                            }
                            Err(e) => warn!(task_id = %record.task_id, interval = %tag, error = %e, "unknown interval tag, ignored"),
                        }
                    }
                    if intervals.is_empty() {
                        warn!(task_id = %record.task_id, "task has no usable intervals, skipped");
                        continue;
                    }
                    let instance = TaskInstance::new(
                        record.task_id.clone(),
                        record.node_id.clone(),
                        payload.data_source,
                        payload.data_type,
                        InstType::from(payload.inst_type.as_str()),
                        payload.symbol,
                        intervals,
                        record.params.clone(),
                    );
                    desired.insert(record.task_id, instance);
                }
                Err(e) => {
                    warn!(task_id = %record.task_id, error = %e, "config_invalid: task params failed to parse, skipped");
                }
            }
        }

        let mut running = self.running.write().await;

        // Deletions before insertions: a rename (different task_id, same
        // underlying work) never transiently exceeds a per-domain quota
        // a collector might enforce.
        let to_remove: Vec<String> = running
            .keys()
            .filter(|id| !desired.contains_key(*id))
            .cloned()
            .collect();
        for task_id in to_remove {
            running.remove(&task_id);
            info!(task_id = %task_id, "task stopped (removed or tombstoned)");
        }

        for (task_id, instance) in desired {
            match running.get(&task_id) {
                None => {
                    self.start_task(&mut running, task_id, instance);
                }
                Some(existing) => {
                    if existing.params_hash != instance.params_hash {
                        running.remove(&task_id);
                        self.start_task(&mut running, task_id, instance);
                    }
                    // else: hash matches, nothing to do.
                }
            }
        }
    }

    fn start_task(
        &self,
        running: &mut HashMap<String, RunningTaskHandle>,
        task_id: String,
        instance: TaskInstance,
    ) {
        match self.registry.get(&instance.data_source, &instance.data_type) {
            Some(collector) => {
                let params_hash = instance.params_hash;
                running.insert(
                    task_id.clone(),
                    RunningTaskHandle {
                        task_instance: instance,
                        collector,
                        started_at: Utc::now(),
                        params_hash,
                    },
                );
                info!(task_id = %task_id, "task started");
            }
            None => {
                let err = DomainError::CreateFailed(
                    task_id.clone(),
                    format!("no collector registered for ({}, {})", instance.data_source, instance.data_type),
                );
                warn!(task_id = %task_id, error = %err, "task create failed");
                self.status_reporter
                    .report_async(task_id, ReportStatus::Failed, err.error_type(), err.to_string());
            }
        }
    }
}
