//! The transport seam.
//!
//! Every transport crate provides one `TransportDriver`. The registry
//! stores them as `Box<dyn TransportDriver>` behind a per-connection async
//! mutex, so a driver only ever sees one operation at a time.

use async_trait::async_trait;
use neoquery_builder::Parameters;

use crate::config::ConnectionConfig;
use crate::error::ServiceError;
use crate::mapping::ResultMappings;
use crate::types::{DriverType, QueryResult};

#[async_trait]
pub trait TransportDriver: Send + Sync {
    fn driver_type(&self) -> DriverType;

    /// Stores `config` and prepares the transport. The streaming variant
    /// opens its connection handle here.
    async fn connect(&mut self, config: &ConnectionConfig) -> Result<(), ServiceError>;

    /// Runs one query. Resolves exactly once with the normalized result.
    async fn execute(&mut self, query: &str, params: &Parameters) -> Result<QueryResult, ServiceError>;

    /// Releases transport resources. Safe to call when already closed.
    async fn close(&mut self) -> Result<(), ServiceError>;

    /// Connects again with `config`, or with the last used configuration.
    async fn reconnect(&mut self, config: Option<&ConnectionConfig>) -> Result<(), ServiceError>;

    async fn begin_transaction(&mut self) -> Result<(), ServiceError> {
        Err(ServiceError::TransactionsUnsupported(self.driver_type()))
    }

    async fn commit(&mut self) -> Result<(), ServiceError> {
        Err(ServiceError::TransactionsUnsupported(self.driver_type()))
    }

    async fn rollback(&mut self) -> Result<(), ServiceError> {
        Err(ServiceError::TransactionsUnsupported(self.driver_type()))
    }

    fn is_transaction_started(&self) -> bool {
        false
    }

    /// Hands the registered result mappings to the driver before a query.
    fn set_result_mappings(&mut self, _mappings: ResultMappings) {}
}
