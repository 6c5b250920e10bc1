//! Query execution pipeline.
//!
//! Renders the builder, resolves the connection, runs the query on the
//! resolved driver, records metrics and hands back one result or one error.
//! After a one-shot query on the streaming transport the connection is
//! closed and unregistered, unless a transaction is open or the caller
//! asked to keep it.

use std::time::Instant;

use neoquery_builder::{LabelMap, Parameters, QueryBuilder};

use crate::ServiceState;
use crate::config::DEFAULT_CONNECTION;
use crate::error::ServiceError;
use crate::types::{DriverType, QueryResult};

/// Per-call options of [`QueryService::execute`].
pub struct ExecutionOptions<'a> {
    builder: Option<&'a mut QueryBuilder>,
    connection: String,
    label_map: Option<LabelMap>,
    cached: bool,
    keep_connection: bool,
}

impl Default for ExecutionOptions<'_> {
    fn default() -> Self {
        Self {
            builder: None,
            connection: DEFAULT_CONNECTION.to_owned(),
            label_map: None,
            cached: false,
            keep_connection: false,
        }
    }
}

impl<'a> ExecutionOptions<'a> {
    pub fn new(builder: &'a mut QueryBuilder) -> Self {
        Self {
            builder: Some(builder),
            ..Self::default()
        }
    }

    /// Options without a builder. Executing them fails with
    /// [`ServiceError::MissingBuilder`].
    pub fn without_builder() -> Self {
        Self::default()
    }

    pub fn connection(mut self, name: impl Into<String>) -> Self {
        self.connection = name.into();
        self
    }

    pub fn label_map(mut self, labels: LabelMap) -> Self {
        self.label_map = Some(labels);
        self
    }

    /// Reuse the last rendered query text instead of rendering the builder.
    /// Parameters still come from the builder.
    pub fn cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    /// Keep a streaming connection open after a one-shot query.
    pub fn keep_connection(mut self, keep: bool) -> Self {
        self.keep_connection = keep;
        self
    }
}

/// Stateless method collection; all state is borrowed from `ServiceState`.
pub struct QueryService;

impl QueryService {
    /// Runs the query assembled by `options.builder`.
    ///
    /// The builder is reset once the call completes, whether it succeeded
    /// or failed.
    pub async fn execute(
        state: &ServiceState,
        options: ExecutionOptions<'_>,
    ) -> Result<QueryResult, ServiceError> {
        let ExecutionOptions {
            builder,
            connection,
            label_map,
            cached,
            keep_connection,
        } = options;
        let Some(builder) = builder else {
            return Err(ServiceError::MissingBuilder);
        };

        let query = if cached {
            state.cached_query()
        } else {
            let query = builder.get_query(label_map.as_ref());
            state.store_cached_query(&query);
            query
        };
        if builder.has_errors() {
            tracing::debug!(
                errors = builder.errors().len(),
                "executing a query with recorded builder errors"
            );
        }

        let result = Self::run(
            state,
            &query,
            builder.get_parameters(),
            &connection,
            keep_connection,
        )
        .await;
        builder.reset();

        let mut result = result?;
        if let Some(labels) = &label_map {
            result.remap_aliases(labels);
        }
        Ok(result)
    }

    /// Runs a hand-written query on `connection` (default `"default"`).
    pub async fn query(
        state: &ServiceState,
        query: &str,
        params: Parameters,
        connection: Option<&str>,
    ) -> Result<QueryResult, ServiceError> {
        Self::run(
            state,
            query,
            params,
            connection.unwrap_or(DEFAULT_CONNECTION),
            false,
        )
        .await
    }

    async fn run(
        state: &ServiceState,
        query: &str,
        params: Parameters,
        connection: &str,
        keep_connection: bool,
    ) -> Result<QueryResult, ServiceError> {
        let driver = state.registry().get(connection)?;
        if query.trim().is_empty() {
            return Err(ServiceError::NoQuery);
        }

        let mut driver = driver.lock().await;
        let driver_type = driver.driver_type();
        if !state.mappings().is_empty() {
            driver.set_result_mappings(state.mappings().clone());
        }

        tracing::debug!(%connection, transport = %driver_type, "executing query");
        let started = Instant::now();
        let result = driver.execute(query, &params).await;
        match &result {
            Ok(_) => {
                let dur_us = started.elapsed().as_micros() as u64;
                state.metrics().record_query(driver_type, dur_us);
            }
            Err(e) => {
                tracing::debug!(%connection, code = e.code(), "query failed: {e}");
                state.metrics().record_query_error(driver_type);
            }
        }

        let one_shot = driver_type == DriverType::Streaming
            && !driver.is_transaction_started()
            && !keep_connection;
        drop(driver);

        if one_shot && let Err(e) = state.registry().remove(connection).await {
            tracing::warn!(%connection, "closing one-shot connection failed: {e}");
        }
        result
    }

    pub async fn begin_transaction(
        state: &ServiceState,
        connection: Option<&str>,
    ) -> Result<(), ServiceError> {
        let name = connection.unwrap_or(DEFAULT_CONNECTION);
        let driver = state.registry().get(name)?;
        let mut driver = driver.lock().await;
        driver.begin_transaction().await?;
        tracing::debug!(connection = %name, "transaction started");
        Ok(())
    }

    pub async fn commit(state: &ServiceState, connection: Option<&str>) -> Result<(), ServiceError> {
        let name = connection.unwrap_or(DEFAULT_CONNECTION);
        let driver = state.registry().get(name)?;
        let mut driver = driver.lock().await;
        driver.commit().await?;
        tracing::debug!(connection = %name, "transaction committed");
        Ok(())
    }

    pub async fn rollback(state: &ServiceState, connection: Option<&str>) -> Result<(), ServiceError> {
        let name = connection.unwrap_or(DEFAULT_CONNECTION);
        let driver = state.registry().get(name)?;
        let mut driver = driver.lock().await;
        driver.rollback().await?;
        tracing::debug!(connection = %name, "transaction rolled back");
        Ok(())
    }
}
