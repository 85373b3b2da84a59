use thiserror::Error;

/// Error taxonomy for the reconciliation / execution data path.
///
/// Each variant corresponds to one `Kind` in the error-handling design:
/// transient network failures, a missing collector, reconciler lifecycle
/// failures, bad task params, failed probes, and keepalive parse failures.
#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    #[error("collector not found for ({0}, {1})")]
    CollectorNotFound(String, String),

    #[error("failed to create collector for task {0}: {1}")]
    CreateFailed(String, String),

    #[error("invalid task params for task {0}: {1}")]
    ConfigInvalid(String, String),

    #[error("probe failed for {0}: {1}")]
    ProbeFailed(String, String),

    #[error("failed to parse keepalive event: {0}")]
    KeepaliveParseFailed(String),

    #[error("{0}")]
    Other(String),
}

impl DomainError {
    /// The stable `error_type` tag the reporter sends to the control
    /// plane (spec §7's taxonomy). Distinct from `Display`, whose
    /// wording may include per-instance detail.
    pub fn error_type(&self) -> &'static str {
        match self {
            DomainError::TransientNetwork(_) => "transient_network",
            DomainError::CollectorNotFound(..) => "collector_not_found",
            DomainError::CreateFailed(..) => "create_failed",
            DomainError::ConfigInvalid(..) => "config_invalid",
            DomainError::ProbeFailed(..) => "probe_failed",
            DomainError::KeepaliveParseFailed(_) => "keepalive_parse_failed",
            DomainError::Other(_) => "other",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("failed to write config file {0}: {1}")]
    FileWrite(String, String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("configuration validation error: {0}")]
    Validation(String),
}
