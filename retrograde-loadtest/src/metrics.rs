//! Per-request statistics shared by all virtual users

use crate::error::LoadTestResult;
use crate::outcome::Outcome;
use hdrhistogram::Histogram;
use retrograde_http::HttpMethod;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Slowest response time tracked exactly; slower samples are clamped to it
const MAX_TRACKED_MS: u64 = 3_600_000;

/// Significant figures kept by the latency histograms
const LATENCY_SIGFIG: u8 = 3;

/// One issued request as seen by the collector
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub method: HttpMethod,
    pub name: String,
    /// `None` when no response arrived
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
struct EntryStats {
    latency_ms: Histogram<u64>,
    successes: u64,
    failures: u64,
    status_codes: BTreeMap<u16, u64>,
    failure_reasons: BTreeMap<String, u64>,
}

impl EntryStats {
    fn new(template: &Histogram<u64>) -> Self {
        Self {
            latency_ms: Histogram::new_from(template),
            successes: 0,
            failures: 0,
            status_codes: BTreeMap::new(),
            failure_reasons: BTreeMap::new(),
        }
    }

    fn record(&mut self, record: &RequestRecord) {
        let ms = record.elapsed.as_millis().min(u128::from(MAX_TRACKED_MS)) as u64;
        self.latency_ms.saturating_record(ms);

        if let Some(status) = record.status {
            *self.status_codes.entry(status).or_insert(0) += 1;
        }

        match &record.outcome {
            Outcome::Success => self.successes += 1,
            Outcome::Failure(reason) => {
                self.failures += 1;
                *self.failure_reasons.entry(reason.clone()).or_insert(0) += 1;
            }
        }
    }

    fn merge(&mut self, other: &EntryStats) {
        // Same bounds on both sides, so this only fails on a corrupted histogram
        if let Err(e) = self.latency_ms.add(&other.latency_ms) {
            warn!("Dropping latency samples from aggregate: {:?}", e);
        }
        self.successes += other.successes;
        self.failures += other.failures;
        for (status, count) in &other.status_codes {
            *self.status_codes.entry(*status).or_insert(0) += count;
        }
        for (reason, count) in &other.failure_reasons {
            *self.failure_reasons.entry(reason.clone()).or_insert(0) += count;
        }
    }

    fn report(&self, method: Option<HttpMethod>, name: &str, duration: Duration) -> EntryReport {
        let latency = &self.latency_ms;
        let requests = self.successes + self.failures;
        let seconds = duration.as_secs_f64();

        let mut report = EntryReport {
            method,
            name: name.to_string(),
            requests,
            successes: self.successes,
            failures: self.failures,
            failure_rate: 0.0,
            average_response_time_ms: 0.0,
            min_response_time_ms: 0,
            max_response_time_ms: 0,
            p50_response_time_ms: 0,
            p95_response_time_ms: 0,
            p99_response_time_ms: 0,
            requests_per_second: 0.0,
            status_codes: self.status_codes.clone(),
            failure_reasons: self.failure_reasons.clone(),
        };

        if latency.len() > 0 {
            report.min_response_time_ms = latency.min();
            report.max_response_time_ms = latency.max();
            report.average_response_time_ms = latency.mean();
            report.p50_response_time_ms = latency.value_at_quantile(0.50);
            report.p95_response_time_ms = latency.value_at_quantile(0.95);
            report.p99_response_time_ms = latency.value_at_quantile(0.99);
        }

        if requests > 0 {
            report.failure_rate = self.failures as f64 / requests as f64;
        }

        if seconds > 0.0 {
            report.requests_per_second = requests as f64 / seconds;
        }

        report
    }
}

/// Figures for one `(method, name)` entry or for the aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryReport {
    /// `None` for the aggregated row
    pub method: Option<HttpMethod>,
    pub name: String,
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p50_response_time_ms: u64,
    pub p95_response_time_ms: u64,
    pub p99_response_time_ms: u64,
    pub requests_per_second: f64,
    pub status_codes: BTreeMap<u16, u64>,
    pub failure_reasons: BTreeMap<String, u64>,
}

/// Snapshot of all statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadTestReport {
    pub duration_ms: u64,
    pub users: usize,
    pub entries: Vec<EntryReport>,
    pub aggregated: EntryReport,
}

impl LoadTestReport {
    /// Entry for a request name, first match across methods
    pub fn entry(&self, name: &str) -> Option<&EntryReport> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug)]
struct Inner {
    started: Instant,
    entries: BTreeMap<(HttpMethod, String), EntryStats>,
}

/// Thread-safe collector shared across virtual users.
///
/// Memory per entry is bounded: response times go into a fixed-precision
/// histogram rather than a sample list.
#[derive(Debug)]
pub struct MetricsCollector {
    template: Histogram<u64>,
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    pub fn new() -> LoadTestResult<Self> {
        let template = Histogram::new_with_bounds(1, MAX_TRACKED_MS, LATENCY_SIGFIG)?;
        Ok(Self {
            template,
            inner: Mutex::new(Inner {
                started: Instant::now(),
                entries: BTreeMap::new(),
            }),
        })
    }

    pub async fn record(&self, record: RequestRecord) {
        let mut inner = self.inner.lock().await;
        inner
            .entries
            .entry((record.method, record.name.clone()))
            .or_insert_with(|| EntryStats::new(&self.template))
            .record(&record);
    }

    /// Drop every entry and restart the clock
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.started = Instant::now();
    }

    /// Total requests recorded so far
    pub async fn total_requests(&self) -> u64 {
        let inner = self.inner.lock().await;
        inner
            .entries
            .values()
            .map(|e| e.successes + e.failures)
            .sum()
    }

    /// Build a report covering everything since creation or the last reset
    pub async fn snapshot(&self, users: usize) -> LoadTestReport {
        let inner = self.inner.lock().await;
        let duration = inner.started.elapsed();

        let mut aggregated = EntryStats::new(&self.template);
        let entries = inner
            .entries
            .iter()
            .map(|((method, name), stats)| {
                aggregated.merge(stats);
                stats.report(Some(*method), name, duration)
            })
            .collect();

        LoadTestReport {
            duration_ms: duration.as_millis().min(u128::from(u64::MAX)) as u64,
            users,
            entries,
            aggregated: aggregated.report(None, "Aggregated", duration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method: HttpMethod, name: &str, status: Option<u16>, ms: u64, outcome: Outcome) -> RequestRecord {
        RequestRecord {
            method,
            name: name.to_string(),
            status,
            elapsed: Duration::from_millis(ms),
            outcome,
        }
    }

    #[tokio::test]
    async fn test_entries_grouped_by_method_and_name() {
        let metrics = MetricsCollector::new().unwrap();
        metrics
            .record(record(HttpMethod::Get, "Load Board", Some(200), 10, Outcome::Success))
            .await;
        metrics
            .record(record(HttpMethod::Get, "Load Board", Some(500), 30, Outcome::Failure("HTTP 500".into())))
            .await;
        metrics
            .record(record(HttpMethod::Delete, "Delete a Card", Some(404), 5, Outcome::Success))
            .await;
        metrics
            .record(record(HttpMethod::Post, "Vote on a Card", None, 1000, Outcome::Failure("timed out".into())))
            .await;

        assert_eq!(metrics.total_requests().await, 4);

        let report = metrics.snapshot(3).await;
        assert_eq!(report.users, 3);
        assert_eq!(report.entries.len(), 3);

        let board = report.entry("Load Board").unwrap();
        assert_eq!(board.method, Some(HttpMethod::Get));
        assert_eq!(board.requests, 2);
        assert_eq!(board.successes, 1);
        assert_eq!(board.failures, 1);
        assert_eq!(board.failure_rate, 0.5);
        assert_eq!(board.min_response_time_ms, 10);
        assert_eq!(board.max_response_time_ms, 30);
        assert_eq!(board.average_response_time_ms, 20.0);
        assert_eq!(board.status_codes.get(&500), Some(&1));
        assert_eq!(board.failure_reasons.get("HTTP 500"), Some(&1));

        let delete = report.entry("Delete a Card").unwrap();
        assert_eq!(delete.failures, 0);
        assert_eq!(delete.status_codes.get(&404), Some(&1));

        let vote = report.entry("Vote on a Card").unwrap();
        assert!(vote.status_codes.is_empty());
        assert_eq!(vote.failure_reasons.get("timed out"), Some(&1));

        assert_eq!(report.aggregated.method, None);
        assert_eq!(report.aggregated.requests, 4);
        assert_eq!(report.aggregated.failures, 2);
        assert_eq!(report.aggregated.max_response_time_ms, 1000);
    }

    #[tokio::test]
    async fn test_percentiles() {
        let metrics = MetricsCollector::new().unwrap();
        for ms in 1..=100 {
            metrics
                .record(record(HttpMethod::Get, "Load Cards", Some(200), ms, Outcome::Success))
                .await;
        }
        let report = metrics.snapshot(1).await;
        let cards = report.entry("Load Cards").unwrap();
        assert!((50..=51).contains(&cards.p50_response_time_ms));
        assert!((95..=96).contains(&cards.p95_response_time_ms));
        assert!((99..=100).contains(&cards.p99_response_time_ms));
        assert_eq!(cards.min_response_time_ms, 1);
        assert_eq!(cards.max_response_time_ms, 100);
    }

    #[tokio::test]
    async fn test_reset_clears_entries() {
        let metrics = MetricsCollector::new().unwrap();
        metrics
            .record(record(HttpMethod::Get, "Load Ranks", Some(200), 1, Outcome::Success))
            .await;
        metrics.reset().await;

        let report = metrics.snapshot(1).await;
        assert!(report.entries.is_empty());
        assert_eq!(report.aggregated.requests, 0);
        assert_eq!(report.aggregated.failure_rate, 0.0);
    }

    #[tokio::test]
    async fn test_slow_responses_are_clamped() {
        let metrics = MetricsCollector::new().unwrap();
        metrics
            .record(RequestRecord {
                method: HttpMethod::Get,
                name: "Load Board".to_string(),
                status: None,
                elapsed: Duration::from_secs(10 * 24 * 3600),
                outcome: Outcome::Failure("timed out".into()),
            })
            .await;

        let report = metrics.snapshot(1).await;
        let board = report.entry("Load Board").unwrap();
        assert!(board.max_response_time_ms >= MAX_TRACKED_MS);
        assert!(board.max_response_time_ms <= MAX_TRACKED_MS + MAX_TRACKED_MS / 100);
    }

    #[tokio::test]
    async fn test_many_samples_keep_histogram_size() {
        let metrics = MetricsCollector::new().unwrap();
        let size = |m: &Inner| {
            m.entries
                .values()
                .map(|e| e.latency_ms.distinct_values())
                .sum::<usize>()
        };

        metrics
            .record(record(HttpMethod::Get, "Load Cards", Some(200), 5, Outcome::Success))
            .await;
        let before = size(&*metrics.inner.lock().await);

        for i in 0..50_000u64 {
            metrics
                .record(record(HttpMethod::Get, "Load Cards", Some(200), i % 2000, Outcome::Success))
                .await;
        }
        let after = size(&*metrics.inner.lock().await);

        assert_eq!(before, after);
        assert_eq!(metrics.total_requests().await, 50_001);
    }
}
