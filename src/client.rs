//! `GraphClient`: the host-facing facade over the service layer.

use serde::de::DeserializeOwned;

use neoquery_builder::{Parameters, QueryBuilder};
use neoquery_service::{
    ConnectionConfig, DriverType, ExecutionOptions, QueryResult, QueryService, ServiceError,
    ServiceState, SharedDriver, TransportDriver,
};

/// Owned replacement for process-wide singletons.
///
/// Clones share one registry, cached-query slot, result mapping table and
/// set of metrics. Independent clients never see each other's connections.
#[derive(Clone, Default)]
pub struct GraphClient {
    state: ServiceState,
}

impl GraphClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: ServiceState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ServiceState {
        &self.state
    }

    /// A fresh builder. Builders are single-owner scratchpads, reset after
    /// every execution.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Creates the transport named by `config.driver_type`, connects it and
    /// registers it under `config.connection` (default `"default"`).
    pub async fn connect(&self, config: &ConnectionConfig) -> Result<SharedDriver, ServiceError> {
        let driver_type = config.validate()?;
        let name = config.connection_name();
        if self.state.registry().contains(name) {
            return Err(ServiceError::DuplicateConnection(name.to_owned()));
        }

        let mut driver = new_driver(driver_type)?;
        driver.connect(config).await?;
        self.state.registry().add(name, driver)
    }

    /// Registers an already connected driver, e.g. a custom transport.
    pub fn register_driver(
        &self,
        name: impl Into<String>,
        driver: Box<dyn TransportDriver>,
    ) -> Result<SharedDriver, ServiceError> {
        self.state.registry().add(name, driver)
    }

    /// Closes and removes one connection (default `"default"`).
    pub async fn close(&self, connection: Option<&str>) -> Result<(), ServiceError> {
        self.state
            .registry()
            .remove(connection.unwrap_or(neoquery_service::DEFAULT_CONNECTION))
            .await
    }

    pub async fn flush_connections(&self) {
        self.state.registry().flush_all().await;
    }

    pub fn connection_names(&self) -> Vec<String> {
        self.state.registry().names()
    }

    /// Hydrates nodes labelled `label` into `T` on the streaming transport.
    pub fn register_result_mappings<T>(&self, label: impl Into<String>) -> &Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.state.mappings().register::<T>(label);
        self
    }

    pub async fn execute(&self, options: ExecutionOptions<'_>) -> Result<QueryResult, ServiceError> {
        QueryService::execute(&self.state, options).await
    }

    pub async fn query(
        &self,
        query: &str,
        params: Parameters,
        connection: Option<&str>,
    ) -> Result<QueryResult, ServiceError> {
        QueryService::query(&self.state, query, params, connection).await
    }

    pub async fn begin_transaction(&self, connection: Option<&str>) -> Result<(), ServiceError> {
        QueryService::begin_transaction(&self.state, connection).await
    }

    pub async fn commit(&self, connection: Option<&str>) -> Result<(), ServiceError> {
        QueryService::commit(&self.state, connection).await
    }

    pub async fn rollback(&self, connection: Option<&str>) -> Result<(), ServiceError> {
        QueryService::rollback(&self.state, connection).await
    }

    /// Prometheus text exposition of the query counters.
    pub fn metrics(&self) -> String {
        self.state.render_metrics()
    }
}

fn new_driver(driver_type: DriverType) -> Result<Box<dyn TransportDriver>, ServiceError> {
    match driver_type {
        #[cfg(feature = "bolt")]
        DriverType::Streaming => Ok(Box::new(neoquery_bolt::StreamingTransport::new())),
        #[cfg(feature = "http")]
        DriverType::Stateless => Ok(Box::new(neoquery_http::StatelessTransport::new())),
        #[allow(unreachable_patterns)]
        other => Err(ServiceError::Configuration(format!(
            "the {other} transport is not compiled in"
        ))),
    }
}
