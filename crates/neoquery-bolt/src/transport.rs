//! `StreamingTransport`: implements `TransportDriver` over Bolt.

use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Txn};
use uuid::Uuid;

use neoquery_builder::Parameters;
use neoquery_service::{
    ConnectionConfig, DriverType, QueryResult, ResultMappings, ServiceError, TransportDriver,
};

use crate::encode::{row_to_record, to_query};

const DEFAULT_SCHEME: &str = "bolt";
const DEFAULT_PORT: u16 = 7687;

struct OpenTransaction {
    id: Uuid,
    txn: Txn,
}

/// Bolt connection with a lazily opened session and at most one open
/// transaction.
///
/// `neo4rs` pools connections behind [`Graph`] and has no session object of
/// its own; the session here is the logical scope between the first query
/// and `close`, tagged with an id for logs.
#[derive(Default)]
pub struct StreamingTransport {
    graph: Option<Graph>,
    session: Option<Uuid>,
    txn: Option<OpenTransaction>,
    config: Option<ConnectionConfig>,
    mappings: Option<ResultMappings>,
}

impl StreamingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.graph.is_some()
    }

    /// Returns the id of the open transaction if there is one, else the
    /// session id, opening the session on first use.
    pub fn get_session(&mut self) -> Result<Uuid, ServiceError> {
        if let Some(open) = &self.txn {
            return Ok(open.id);
        }
        if self.graph.is_none() {
            return Err(ServiceError::NoConnection);
        }
        let id = *self.session.get_or_insert_with(|| {
            let id = Uuid::new_v4();
            tracing::debug!(session_id = %id, "Bolt session opened");
            id
        });
        Ok(id)
    }
}

/// `scheme://server:port`, defaulting to `bolt` and 7687.
pub(crate) fn connection_uri(config: &ConnectionConfig) -> String {
    let scheme = config
        .protocol
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_SCHEME);
    let port = config.port.unwrap_or(DEFAULT_PORT);
    format!("{scheme}://{}:{port}", config.server)
}

#[async_trait]
impl TransportDriver for StreamingTransport {
    fn driver_type(&self) -> DriverType {
        DriverType::Streaming
    }

    async fn connect(&mut self, config: &ConnectionConfig) -> Result<(), ServiceError> {
        self.close().await?;

        let uri = connection_uri(config);
        let mut builder = ConfigBuilder::default().uri(uri.as_str());
        if let Some((user, password)) = config.credentials() {
            builder = builder.user(user).password(password);
        }
        let neo_config = builder.build().map_err(ServiceError::transport)?;
        let graph = Graph::connect(neo_config)
            .await
            .map_err(ServiceError::transport)?;

        tracing::debug!(%uri, connection = config.connection_name(), "Bolt connection opened");
        self.graph = Some(graph);
        self.config = Some(config.clone());
        Ok(())
    }

    async fn execute(
        &mut self,
        query: &str,
        params: &Parameters,
    ) -> Result<QueryResult, ServiceError> {
        let session = self.get_session()?;
        let query = to_query(query, params);
        let mappings = self.mappings.as_ref();
        let mut records = Vec::new();

        if let Some(open) = self.txn.as_mut() {
            let mut stream = open
                .txn
                .execute(query)
                .await
                .map_err(ServiceError::transport)?;
            while let Some(row) = stream
                .next(open.txn.handle())
                .await
                .map_err(ServiceError::transport)?
            {
                records.push(row_to_record(&row, mappings)?);
            }
        } else {
            let graph = self.graph.as_ref().ok_or(ServiceError::NoConnection)?;
            let mut stream = graph
                .execute(query)
                .await
                .map_err(ServiceError::transport)?;
            while let Some(row) = stream.next().await.map_err(ServiceError::transport)? {
                records.push(row_to_record(&row, mappings)?);
            }
        }

        tracing::debug!(session_id = %session, rows = records.len(), "Bolt query finished");
        Ok(QueryResult::Records(records))
    }

    async fn close(&mut self) -> Result<(), ServiceError> {
        if let Some(open) = self.txn.take() {
            let id = open.id;
            if let Err(e) = open.txn.rollback().await {
                tracing::warn!(transaction_id = %id, "rolling back on close failed: {e}");
            }
        }
        if let Some(session) = self.session.take() {
            tracing::debug!(session_id = %session, "Bolt session closed");
        }
        self.graph = None;
        Ok(())
    }

    async fn reconnect(&mut self, config: Option<&ConnectionConfig>) -> Result<(), ServiceError> {
        let config = match config {
            Some(config) => config.clone(),
            None => self.config.clone().ok_or(ServiceError::NoConnection)?,
        };
        self.connect(&config).await
    }

    async fn begin_transaction(&mut self) -> Result<(), ServiceError> {
        if self.txn.is_some() {
            return Ok(());
        }
        let session = self.get_session()?;
        let graph = self.graph.as_ref().ok_or(ServiceError::NoConnection)?;
        let txn = graph.start_txn().await.map_err(ServiceError::session)?;

        let id = Uuid::new_v4();
        tracing::debug!(session_id = %session, transaction_id = %id, "Bolt transaction started");
        self.txn = Some(OpenTransaction { id, txn });
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), ServiceError> {
        if let Some(open) = self.txn.take() {
            open.txn.commit().await.map_err(ServiceError::commit)?;
            tracing::debug!(transaction_id = %open.id, "Bolt transaction committed");
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ServiceError> {
        if let Some(open) = self.txn.take() {
            open.txn.rollback().await.map_err(ServiceError::commit)?;
            tracing::debug!(transaction_id = %open.id, "Bolt transaction rolled back");
        }
        Ok(())
    }

    fn is_transaction_started(&self) -> bool {
        self.txn.is_some()
    }

    fn set_result_mappings(&mut self, mappings: ResultMappings) {
        self.mappings = Some(mappings);
    }
}
