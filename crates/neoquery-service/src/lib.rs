//! NeoQuery Service: transport-agnostic execution core.
//!
//! Holds the connection registry, the execution pipeline, the result model
//! and result-type mappings. Transport crates (`neoquery-bolt`,
//! `neoquery-http`) implement [`TransportDriver`] and plug in here.
//!
//! **Zero transport dependencies**: no Bolt client, no HTTP client.

pub mod config;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod metrics;
pub mod query;
pub mod registry;
pub mod types;

use std::sync::Arc;

use parking_lot::Mutex;

pub use config::{ConnectionConfig, DEFAULT_CONNECTION, DEFAULT_ENDPOINT};
pub use driver::TransportDriver;
pub use error::{ErrorKind, ServiceError};
pub use mapping::ResultMappings;
pub use metrics::Metrics;
pub use query::{ExecutionOptions, QueryService};
pub use registry::{ConnectionRegistry, SharedDriver};
pub use types::{DriverType, GraphValue, MappedNode, Node, QueryResult, Record, Relationship};

/// Shared service state, cloneable across callers.
///
/// Replaces process-wide singletons: every `ServiceState` owns its own
/// registry, cached-query slot, result mappings and metrics.
#[derive(Clone, Default)]
pub struct ServiceState {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    registry: ConnectionRegistry,
    mappings: ResultMappings,
    metrics: Metrics,
    /// Last rendered query text, reused by cached executions.
    cached_query: Mutex<String>,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn mappings(&self) -> &ResultMappings {
        &self.inner.mappings
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    pub fn cached_query(&self) -> String {
        self.inner.cached_query.lock().clone()
    }

    pub fn store_cached_query(&self, query: &str) {
        *self.inner.cached_query.lock() = query.to_owned();
    }

    /// Metrics in Prometheus text format, with the live connection count.
    pub fn render_metrics(&self) -> String {
        self.metrics().render(self.registry().len())
    }
}
