//! Stateless transport for NeoQuery.
//!
//! Each query is one `POST {endpoint}transaction/commit` carrying
//! `{"statements": [{"statement", "parameters"}]}`. The JSON response body
//! is returned as-is. There are no sessions and no transactions.

mod payload;
mod transport;

pub use transport::StatelessTransport;
