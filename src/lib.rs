//! NeoQuery: a fluent Cypher query builder with pluggable transports.
//!
//! The builder and the execution core are always compiled. Transport
//! layers are feature-gated:
//! - `bolt`  streaming transport over Bolt (`neo4rs`)
//! - `http`  stateless transport over the transactional HTTP endpoint
//!
//! [`GraphClient`] ties them together: it owns the connection registry,
//! the cached-query slot, the result mappings and the metrics.

pub mod client;
pub mod config;

pub use client::GraphClient;
pub use neoquery_builder::{BuilderError, LabelMap, OrderDirection, Parameters, Properties, QueryBuilder};
pub use neoquery_service::{
    ConnectionConfig, DriverType, ErrorKind, ExecutionOptions, GraphValue, QueryResult, Record,
    ServiceError, TransportDriver,
};
