/// Outcome tag for one reported execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Success,
    Failed,
}

/// Fire-and-forget status reporting to the control plane. `report_async`
/// must return without waiting on the network call — the data path must
/// never stall on telemetry. Implementations dispatch the POST on a
/// bounded worker pool and drop reports over capacity with a warning.
///
/// `error_type` carries the §7 taxonomy kind (e.g. `"transient_network"`,
/// `"create_failed"`) for a `Failed` report; callers pass
/// [`fleet_agent_domain::DomainError::error_type`] and it is ignored for
/// `Success`.
pub trait StatusReporterPort: Send + Sync {
    fn report_async(&self, task_id: String, status: ReportStatus, error_type: &'static str, message: String);
}
