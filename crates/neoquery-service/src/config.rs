//! Connection configuration handed to `TransportDriver::connect`.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::types::DriverType;

/// Connection name used when the caller does not give one.
pub const DEFAULT_CONNECTION: &str = "default";

/// Default HTTP endpoint path of the transactional API.
pub const DEFAULT_ENDPOINT: &str = "/db/data/";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Transport to use. Required.
    #[serde(rename = "type", default)]
    pub driver_type: Option<DriverType>,
    pub server: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// URL scheme; `bolt` or `http` unless overridden.
    #[serde(default)]
    pub protocol: Option<String>,
    /// Stateless only: path prefix of the transactional endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Registry name of the connection.
    #[serde(default)]
    pub connection: Option<String>,
}

impl ConnectionConfig {
    pub fn new(driver_type: DriverType, server: impl Into<String>) -> Self {
        Self {
            driver_type: Some(driver_type),
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(text).map_err(|e| ServiceError::Configuration(e.to_string()))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_connection(mut self, name: impl Into<String>) -> Self {
        self.connection = Some(name.into());
        self
    }

    /// Registry name, `"default"` when unset or empty.
    pub fn connection_name(&self) -> &str {
        self.connection
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_CONNECTION)
    }

    /// User and password, only when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.user.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) if !user.is_empty() => Some((user, password)),
            _ => None,
        }
    }

    /// The configured transport, or a configuration error when unset.
    pub fn require_type(&self) -> Result<DriverType, ServiceError> {
        self.driver_type
            .ok_or_else(|| ServiceError::Configuration("connection type is missing".into()))
    }

    pub fn validate(&self) -> Result<DriverType, ServiceError> {
        let driver_type = self.require_type()?;
        if self.server.trim().is_empty() {
            return Err(ServiceError::Configuration("server is missing".into()));
        }
        Ok(driver_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_json_with_defaults() {
        let config = ConnectionConfig::from_json(
            r#"{"type": "bolt", "server": "localhost", "port": 7687, "user": "neo4j", "password": "secret"}"#,
        )
        .unwrap();
        assert_eq!(config.driver_type, Some(DriverType::Streaming));
        assert_eq!(config.port, Some(7687));
        assert_eq!(config.connection_name(), DEFAULT_CONNECTION);
        assert_eq!(config.credentials(), Some(("neo4j", "secret")));
        assert_eq!(config.validate().unwrap(), DriverType::Streaming);
    }

    #[test]
    fn missing_type_is_a_configuration_error() {
        let config = ConnectionConfig::from_json(r#"{"server": "localhost"}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = ConnectionConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn credentials_need_both_parts() {
        let mut config = ConnectionConfig::new(DriverType::Stateless, "db").with_connection("");
        config.user = Some("neo4j".into());
        assert_eq!(config.credentials(), None);
        assert_eq!(config.connection_name(), "default");

        let config = config.with_credentials("neo4j", "pw").with_connection("http");
        assert_eq!(config.credentials(), Some(("neo4j", "pw")));
        assert_eq!(config.connection_name(), "http");
    }
}
