use async_trait::async_trait;
use fleet_agent_application::ports::{Collector, ReportStatus, StatusReporterPort, TaskConfigPort};
use fleet_agent_domain::{CollectParams, DomainError, RemoteTaskRecord};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Collector that records every call it receives and always succeeds.
#[derive(Default)]
pub struct CountingCollector {
    count: AtomicU32,
    calls: Mutex<Vec<CollectParams>>,
}

#[async_trait]
impl Collector for CountingCollector {
    async fn collect(&self, _ctx: CancellationToken, params: &CollectParams) -> Result<(), DomainError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(params.clone());
        Ok(())
    }
}

impl CountingCollector {
    pub fn call_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn calls_for_interval(&self, interval: fleet_agent_domain::IntervalTag) -> usize {
        self.calls.lock().unwrap().iter().filter(|p| p.interval == interval).count()
    }
}

/// Collector that sleeps for a fixed duration before succeeding, used to
/// measure whether the executor dispatches work concurrently.
pub struct SleepingCollector {
    pub sleep: Duration,
}

#[async_trait]
impl Collector for SleepingCollector {
    async fn collect(&self, _ctx: CancellationToken, _params: &CollectParams) -> Result<(), DomainError> {
        tokio::time::sleep(self.sleep).await;
        Ok(())
    }
}

#[derive(Default)]
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
    last_message: Mutex<String>,
}

impl StatusReporterPort for RecordingReporter {
    fn report_async(&self, _task_id: String, status: ReportStatus, _error_type: &'static str, message: String) {
        match status {
            ReportStatus::Success => {
                self.success.fetch_add(1, Ordering::SeqCst);
            }
            ReportStatus::Failed => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                *self.last_message.lock().unwrap() = message;
            }
        }
    }
}

impl RecordingReporter {
    pub fn success_count(&self) -> u32 {
        self.success.load(Ordering::SeqCst)
    }

    pub fn failed_count(&self) -> u32 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> String {
        self.last_message.lock().unwrap().clone()
    }
}

pub fn task_params(intervals: &[&str]) -> String {
    serde_json::json!({
        "data_type": "kline",
        "data_source": "ex",
        "inst_type": "SPOT",
        "symbol": "BTC-USDT",
        "intervals": intervals,
    })
    .to_string()
}
