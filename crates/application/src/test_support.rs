//! Shared test doubles for `use_cases` unit tests. Not part of the
//! public API; compiled only under `#[cfg(test)]`.

use crate::ports::{Collector, DnsFanoutPort, IpPoolPort, ProbeEnginePort, ReportStatus, StatusReporterPort, TaskConfigPort};
use async_trait::async_trait;
use fleet_agent_domain::{CollectParams, DnsRecord, DomainError, IpInfo, ProbeConfig, RemoteTaskRecord};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct CallCountingCollector {
    count: AtomicU32,
}

impl CallCountingCollector {
    pub fn call_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Collector for CallCountingCollector {
    async fn collect(&self, _ctx: CancellationToken, _params: &CollectParams) -> Result<(), DomainError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    async fn collect(&self, _ctx: CancellationToken, params: &CollectParams) -> Result<(), DomainError> {
        Err(DomainError::Other(format!(
            "collect failed for interval {}",
            params.interval
        )))
    }
}

pub struct FakeTaskConfigPort {
    records: Mutex<Vec<RemoteTaskRecord>>,
    fetch_count: AtomicU32,
}

impl FakeTaskConfigPort {
    pub fn new(records: Vec<RemoteTaskRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fetch_count: AtomicU32::new(0),
        }
    }

    pub fn set_records(&self, records: Vec<RemoteTaskRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskConfigPort for FakeTaskConfigPort {
    async fn fetch_tasks(&self, _node_id: &str) -> Result<Vec<RemoteTaskRecord>, DomainError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    success: AtomicU32,
    failed: AtomicU32,
    last_error_type: Mutex<Option<&'static str>>,
}

impl RecordingReporter {
    pub fn success_count(&self) -> u32 {
        self.success.load(Ordering::SeqCst)
    }

    pub fn failed_count(&self) -> u32 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn last_error_type(&self) -> Option<&'static str> {
        *self.last_error_type.lock().unwrap()
    }
}

impl StatusReporterPort for RecordingReporter {
    fn report_async(&self, _task_id: String, status: ReportStatus, error_type: &'static str, _message: String) {
        match status {
            ReportStatus::Success => {
                self.success.fetch_add(1, Ordering::SeqCst);
            }
            ReportStatus::Failed => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                *self.last_error_type.lock().unwrap() = Some(error_type);
            }
        };
    }
}

pub enum FakeDnsFanout {
    Resolving(Vec<IpAddr>),
    Failing,
}

impl FakeDnsFanout {
    pub fn resolving(ips: Vec<IpAddr>) -> Self {
        Self::Resolving(ips)
    }

    pub fn failing() -> Self {
        Self::Failing
    }
}

#[async_trait]
impl DnsFanoutPort for FakeDnsFanout {
    async fn resolve(&self, _domain: &str) -> Result<Vec<IpAddr>, DomainError> {
        match self {
            FakeDnsFanout::Resolving(ips) => Ok(ips.clone()),
            FakeDnsFanout::Failing => Err(DomainError::TransientNetwork("all upstreams failed".into())),
        }
    }
}

pub struct FakeProber {
    available: bool,
}

impl FakeProber {
    pub fn always_available() -> Self {
        Self { available: true }
    }
}

#[async_trait]
impl ProbeEnginePort for FakeProber {
    async fn probe(&self, _domain: &str, ip: IpAddr, _config: &ProbeConfig) -> IpInfo {
        IpInfo {
            ip,
            latency_micros: 1000,
            available: self.available,
            last_probe_at: chrono::Utc::now(),
        }
    }
}

#[derive(Default)]
pub struct FakePool {
    replace_count: AtomicU32,
    last: Mutex<Option<DnsRecord>>,
}

impl FakePool {
    pub fn replace_count(&self) -> u32 {
        self.replace_count.load(Ordering::SeqCst)
    }
}

impl IpPoolPort for FakePool {
    fn get_best_ip(&self, _domain: &str) -> Option<IpAddr> {
        self.last.lock().unwrap().as_ref().and_then(|r| r.best_ip())
    }

    fn get_available_ips(&self, _domain: &str) -> Vec<IpAddr> {
        self.last
            .lock()
            .unwrap()
            .as_ref()
            .map(|r| r.available_ips())
            .unwrap_or_default()
    }

    fn get_next_available_ip(&self, _domain: &str, excluded: &std::collections::HashSet<IpAddr>) -> Option<IpAddr> {
        self.last
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|r| r.next_available_excluding(excluded))
    }

    fn replace(&self, record: DnsRecord) {
        self.replace_count.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(record);
    }
}
