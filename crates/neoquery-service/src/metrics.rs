//! Prometheus-compatible query counters per transport.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::DriverType;

struct TransportMetrics {
    queries_total: AtomicU64,
    query_errors_total: AtomicU64,
    /// Accumulated query duration stored as microseconds.
    query_duration_us_sum: AtomicU64,
    query_duration_count: AtomicU64,
}

impl TransportMetrics {
    const fn new() -> Self {
        Self {
            queries_total: AtomicU64::new(0),
            query_errors_total: AtomicU64::new(0),
            query_duration_us_sum: AtomicU64::new(0),
            query_duration_count: AtomicU64::new(0),
        }
    }
}

const ALL_TRANSPORTS: [DriverType; 2] = [DriverType::Streaming, DriverType::Stateless];

/// Query counters recorded by the execution pipeline.
pub struct Metrics {
    streaming: TransportMetrics,
    stateless: TransportMetrics,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            streaming: TransportMetrics::new(),
            stateless: TransportMetrics::new(),
        }
    }

    fn transport(&self, driver_type: DriverType) -> &TransportMetrics {
        match driver_type {
            DriverType::Streaming => &self.streaming,
            DriverType::Stateless => &self.stateless,
        }
    }

    /// Record a successful query.
    pub fn record_query(&self, driver_type: DriverType, duration_us: u64) {
        let m = self.transport(driver_type);
        m.queries_total.fetch_add(1, Ordering::Relaxed);
        m.query_duration_us_sum
            .fetch_add(duration_us, Ordering::Relaxed);
        m.query_duration_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed query.
    pub fn record_query_error(&self, driver_type: DriverType) {
        let m = self.transport(driver_type);
        m.queries_total.fetch_add(1, Ordering::Relaxed);
        m.query_errors_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn queries_total(&self, driver_type: DriverType) -> u64 {
        self.transport(driver_type)
            .queries_total
            .load(Ordering::Relaxed)
    }

    pub fn query_errors_total(&self, driver_type: DriverType) -> u64 {
        self.transport(driver_type)
            .query_errors_total
            .load(Ordering::Relaxed)
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self, connections_total: usize) -> String {
        let mut out = String::with_capacity(1024);

        writeln!(
            out,
            "# HELP neoquery_connections_total Currently registered connections."
        )
        .unwrap();
        writeln!(out, "# TYPE neoquery_connections_total gauge").unwrap();
        writeln!(out, "neoquery_connections_total {connections_total}").unwrap();

        writeln!(out, "# HELP neoquery_queries_total Total queries executed.").unwrap();
        writeln!(out, "# TYPE neoquery_queries_total counter").unwrap();
        for t in ALL_TRANSPORTS {
            let total = self.transport(t).queries_total.load(Ordering::Relaxed);
            writeln!(out, "neoquery_queries_total{{transport=\"{t}\"}} {total}").unwrap();
        }

        writeln!(
            out,
            "# HELP neoquery_query_errors_total Total failed queries."
        )
        .unwrap();
        writeln!(out, "# TYPE neoquery_query_errors_total counter").unwrap();
        for t in ALL_TRANSPORTS {
            let errors = self.transport(t).query_errors_total.load(Ordering::Relaxed);
            writeln!(out, "neoquery_query_errors_total{{transport=\"{t}\"}} {errors}").unwrap();
        }

        writeln!(
            out,
            "# HELP neoquery_query_duration_seconds_sum Total query time in seconds."
        )
        .unwrap();
        writeln!(out, "# TYPE neoquery_query_duration_seconds_sum counter").unwrap();
        for t in ALL_TRANSPORTS {
            let us = self
                .transport(t)
                .query_duration_us_sum
                .load(Ordering::Relaxed);
            let secs = us as f64 / 1_000_000.0;
            writeln!(
                out,
                "neoquery_query_duration_seconds_sum{{transport=\"{t}\"}} {secs:.6}"
            )
            .unwrap();
        }

        writeln!(
            out,
            "# HELP neoquery_query_duration_seconds_count Number of timed queries."
        )
        .unwrap();
        writeln!(out, "# TYPE neoquery_query_duration_seconds_count counter").unwrap();
        for t in ALL_TRANSPORTS {
            let count = self
                .transport(t)
                .query_duration_count
                .load(Ordering::Relaxed);
            writeln!(
                out,
                "neoquery_query_duration_seconds_count{{transport=\"{t}\"}} {count}"
            )
            .unwrap();
        }

        out
    }
}
