//! `StatelessTransport`: implements `TransportDriver` over HTTP.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use neoquery_builder::Parameters;
use neoquery_service::{
    ConnectionConfig, DEFAULT_ENDPOINT, DriverType, QueryResult, ServiceError, TransportDriver,
};

use crate::payload::CommitRequest;

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_PORT: u16 = 7474;
const COMMIT_PATH: &str = "transaction/commit";
const ACCEPT_JSON: &str = "application/json; charset=UTF-8";

/// Fields every request of one connection shares.
#[derive(Debug, Clone)]
struct RequestTemplate {
    url: Url,
    authorization: Option<String>,
}

/// One POST per query against the transactional commit endpoint.
#[derive(Debug)]
pub struct StatelessTransport {
    client: Client,
    template: Option<RequestTemplate>,
    config: Option<ConnectionConfig>,
}

impl Default for StatelessTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StatelessTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Uses a preconfigured client, e.g. one with timeouts set.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            template: None,
            config: None,
        }
    }

    /// The commit URL once connected.
    pub fn url(&self) -> Option<&Url> {
        self.template.as_ref().map(|t| &t.url)
    }
}

/// `scheme://server:port{endpoint}transaction/commit`.
pub(crate) fn commit_url(config: &ConnectionConfig) -> Result<Url, ServiceError> {
    let scheme = config
        .protocol
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_SCHEME);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    let endpoint = config
        .endpoint
        .as_deref()
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_ENDPOINT);
    let mut path = String::with_capacity(endpoint.len() + 2);
    if !endpoint.starts_with('/') {
        path.push('/');
    }
    path.push_str(endpoint);
    if !path.ends_with('/') {
        path.push('/');
    }

    let base = Url::parse(&format!("{scheme}://{}:{port}", config.server))
        .map_err(|e| ServiceError::Configuration(format!("invalid server address: {e}")))?;
    base.join(&path)
        .and_then(|u| u.join(COMMIT_PATH))
        .map_err(|e| ServiceError::Configuration(format!("invalid endpoint: {e}")))
}

/// `Basic base64(user:password)` when credentials are configured.
pub(crate) fn basic_auth(config: &ConnectionConfig) -> Option<String> {
    config
        .credentials()
        .map(|(user, password)| format!("Basic {}", STANDARD.encode(format!("{user}:{password}"))))
}

#[async_trait]
impl TransportDriver for StatelessTransport {
    fn driver_type(&self) -> DriverType {
        DriverType::Stateless
    }

    async fn connect(&mut self, config: &ConnectionConfig) -> Result<(), ServiceError> {
        let url = commit_url(config)?;
        tracing::debug!(%url, connection = config.connection_name(), "HTTP transport configured");
        self.template = Some(RequestTemplate {
            url,
            authorization: basic_auth(config),
        });
        self.config = Some(config.clone());
        Ok(())
    }

    async fn execute(
        &mut self,
        query: &str,
        params: &Parameters,
    ) -> Result<QueryResult, ServiceError> {
        let template = self.template.as_ref().ok_or(ServiceError::NoConnection)?;
        let body = serde_json::to_vec(&CommitRequest::single(query, params))
            .map_err(ServiceError::transport)?;

        let mut request = self
            .client
            .post(template.url.clone())
            .header(ACCEPT, ACCEPT_JSON)
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len());
        if let Some(auth) = &template.authorization {
            request = request.header(AUTHORIZATION, auth.as_str());
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(ServiceError::transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ServiceError::transport)?;
        let json: Value = serde_json::from_slice(&bytes).map_err(ServiceError::transport)?;

        tracing::debug!(status = status.as_u16(), bytes = bytes.len(), "HTTP query finished");
        Ok(QueryResult::Json(json))
    }

    async fn close(&mut self) -> Result<(), ServiceError> {
        self.template = None;
        Ok(())
    }

    async fn reconnect(&mut self, config: Option<&ConnectionConfig>) -> Result<(), ServiceError> {
        let config = match config {
            Some(config) => config.clone(),
            None => self.config.clone().ok_or(ServiceError::NoConnection)?,
        };
        self.connect(&config).await
    }
}
