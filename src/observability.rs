//! Process-wide request counters.

use crate::types::ApiKey;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

const LATENCY_WINDOW: usize = 10_000;

pub struct Observability {
    requests_total: AtomicU64,
    api_versions_total: AtomicU64,
    fetch_total: AtomicU64,
    describe_topic_partitions_total: AtomicU64,
    decode_errors_total: AtomicU64,
    connections_opened_total: AtomicU64,
    connections_closed_total: AtomicU64,
    fetch_batches_total: AtomicU64,
    request_latency_us: Mutex<VecDeque<u64>>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub api_versions_total: u64,
    pub fetch_total: u64,
    pub describe_topic_partitions_total: u64,
    pub decode_errors_total: u64,
    pub connections_opened_total: u64,
    pub connections_closed_total: u64,
    pub fetch_batches_total: u64,
    pub request_latency_p99_us: u64,
}

impl Observability {
    fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            api_versions_total: AtomicU64::new(0),
            fetch_total: AtomicU64::new(0),
            describe_topic_partitions_total: AtomicU64::new(0),
            decode_errors_total: AtomicU64::new(0),
            connections_opened_total: AtomicU64::new(0),
            connections_closed_total: AtomicU64::new(0),
            fetch_batches_total: AtomicU64::new(0),
            request_latency_us: Mutex::new(VecDeque::with_capacity(LATENCY_WINDOW)),
        }
    }

    pub fn record_request(&self, api_key: ApiKey, latency: Duration) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let per_api = match api_key {
            ApiKey::ApiVersions => &self.api_versions_total,
            ApiKey::Fetch => &self.fetch_total,
            ApiKey::DescribeTopicPartitions => &self.describe_topic_partitions_total,
        };
        per_api.fetch_add(1, Ordering::Relaxed);

        let us = latency.as_micros() as u64;
        let mut window = self
            .request_latency_us
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if window.len() >= LATENCY_WINDOW {
            window.pop_front();
        }
        window.push_back(us);
    }

    pub fn record_decode_error(&self) {
        self.decode_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_batches(&self, batches: usize) {
        self.fetch_batches_total
            .fetch_add(batches as u64, Ordering::Relaxed);
    }

    pub fn connection_opened(&self) {
        self.connections_opened_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.connections_closed_total.fetch_add(1, Ordering::Relaxed);
    }

    fn p99_latency_us(&self) -> u64 {
        let window = self
            .request_latency_us
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if window.is_empty() {
            return 0;
        }
        let mut v: Vec<u64> = window.iter().copied().collect();
        v.sort_unstable();
        let idx = ((v.len() as f64) * 0.99).floor() as usize;
        v[idx.min(v.len() - 1)]
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            api_versions_total: self.api_versions_total.load(Ordering::Relaxed),
            fetch_total: self.fetch_total.load(Ordering::Relaxed),
            describe_topic_partitions_total: self
                .describe_topic_partitions_total
                .load(Ordering::Relaxed),
            decode_errors_total: self.decode_errors_total.load(Ordering::Relaxed),
            connections_opened_total: self.connections_opened_total.load(Ordering::Relaxed),
            connections_closed_total: self.connections_closed_total.load(Ordering::Relaxed),
            fetch_batches_total: self.fetch_batches_total.load(Ordering::Relaxed),
            request_latency_p99_us: self.p99_latency_us(),
        }
    }

    pub fn render_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut out = String::new();
        let mut metric = |name: &str, kind: &str, value: u64| {
            out.push_str(&format!("# TYPE kraftlet_{} {}\n", name, kind));
            out.push_str(&format!("kraftlet_{} {}\n", name, value));
        };
        metric("requests_total", "counter", s.requests_total);
        metric("api_versions_requests_total", "counter", s.api_versions_total);
        metric("fetch_requests_total", "counter", s.fetch_total);
        metric(
            "describe_topic_partitions_requests_total",
            "counter",
            s.describe_topic_partitions_total,
        );
        metric("decode_errors_total", "counter", s.decode_errors_total);
        metric("connections_opened_total", "counter", s.connections_opened_total);
        metric("connections_closed_total", "counter", s.connections_closed_total);
        metric("fetch_batches_total", "counter", s.fetch_batches_total);
        metric("request_latency_p99_us", "gauge", s.request_latency_p99_us);
        out
    }
}

static OBS: OnceLock<Observability> = OnceLock::new();

pub fn observability() -> &'static Observability {
    OBS.get_or_init(Observability::new)
}
