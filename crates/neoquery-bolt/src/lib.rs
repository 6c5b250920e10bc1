//! Streaming transport for NeoQuery.
//!
//! Talks to the database over Bolt through `neo4rs`. A connection owns a
//! driver-level handle, a lazily opened session and at most one open
//! transaction. Result rows are folded into [`neoquery_service::Record`]s,
//! with nodes hydrated through the registered result mappings.

mod encode;
mod transport;

pub use transport::StreamingTransport;
