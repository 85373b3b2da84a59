use crate::grid::IntervalTag;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;

/// Instance type of a collected symbol. Mirrors the upstream
/// vocabulary; `Other` carries source-specific strings verbatim since
/// the control plane may introduce new instrument types this agent
/// doesn't need to understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstType {
    Spot,
    Swap,
    Other(String),
}

impl InstType {
    pub fn as_str(&self) -> &str {
        match self {
            InstType::Spot => "SPOT",
            InstType::Swap => "SWAP",
            InstType::Other(s) => s,
        }
    }
}

impl From<&str> for InstType {
    fn from(s: &str) -> Self {
        match s {
            "SPOT" => InstType::Spot,
            "SWAP" => InstType::Swap,
            other => InstType::Other(other.to_string()),
        }
    }
}

impl Serialize for InstType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InstType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(D::Error::custom("inst_type must not be empty"));
        }
        Ok(InstType::from(s.as_str()))
    }
}

/// An installed task, as reconciled from the control plane's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    pub task_id: String,
    pub node_id: String,
    pub data_source: String,
    pub data_type: String,
    pub inst_type: InstType,
    pub symbol: String,
    pub intervals: HashSet<IntervalTag>,
    /// Raw opaque parameter blob as received from the control plane.
    pub params: String,
    /// Stable fingerprint of `params`, used to detect changes without
    /// comparing the raw blob.
    pub params_hash: u64,
    pub invalid: bool,
}

impl TaskInstance {
    /// Computes `params_hash` from `params` using a stable, portable
    /// hash (not `DefaultHasher`, whose algorithm is unspecified across
    /// Rust versions and would make `params_hash` non-reproducible).
    pub fn compute_params_hash(params: &str) -> u64 {
        fnv1a64(params.as_bytes())
    }

    pub fn new(
        task_id: impl Into<String>,
        node_id: impl Into<String>,
        data_source: impl Into<String>,
        data_type: impl Into<String>,
        inst_type: InstType,
        symbol: impl Into<String>,
        intervals: HashSet<IntervalTag>,
        params: impl Into<String>,
    ) -> Self {
        let params = params.into();
        let params_hash = Self::compute_params_hash(&params);
        Self {
            task_id: task_id.into(),
            node_id: node_id.into(),
            data_source: data_source.into(),
            data_type: data_type.into(),
            inst_type,
            symbol: symbol.into(),
            intervals,
            params,
            params_hash,
            invalid: false,
        }
    }
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// The raw JSON shape of `TaskParams` as delivered by the control plane
/// (spec §6): `{"data_type":"...","data_source":"...",...}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TaskParamsPayload {
    pub data_type: String,
    pub data_source: String,
    pub inst_type: String,
    pub symbol: String,
    pub intervals: Vec<String>,
}

/// Wire shape of one entry in the control plane's task list response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteTaskRecord {
    pub task_id: String,
    pub node_id: String,
    pub params: String,
    #[serde(default)]
    pub invalid: i32,
}

/// Per-fire input handed to a collector. Immutable for the duration of
/// one `Collect` call.
#[derive(Debug, Clone)]
pub struct CollectParams {
    pub task_id: String,
    pub inst_type: InstType,
    pub symbol: String,
    pub interval: IntervalTag,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_hash_changes_with_params() {
        let a = TaskInstance::compute_params_hash("A");
        let b = TaskInstance::compute_params_hash("B");
        assert_ne!(a, b);
        assert_eq!(a, TaskInstance::compute_params_hash("A"));
    }
}
