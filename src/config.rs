//! Console configuration via CLI args and environment variables.

use clap::Parser;

use neoquery_builder::Parameters;
use neoquery_service::{ConnectionConfig, DriverType, ServiceError};

/// Run one Cypher query against a graph database and print the result.
#[derive(Parser, Debug, Clone)]
#[command(name = "neoquery", version, about)]
pub struct Config {
    /// Transport: `bolt` (streaming) or `http` (stateless).
    #[arg(long = "type", env = "NEOQUERY_TYPE", value_parser = parse_driver_type)]
    pub driver_type: DriverType,

    /// Database host.
    #[arg(long, default_value = "localhost", env = "NEOQUERY_SERVER")]
    pub server: String,

    /// Database port. Defaults to 7687 for bolt and 7474 for http.
    #[arg(long, env = "NEOQUERY_PORT")]
    pub port: Option<u16>,

    /// URL scheme override, e.g. `https` or `neo4j`.
    #[arg(long, env = "NEOQUERY_PROTOCOL")]
    pub protocol: Option<String>,

    /// HTTP only: path prefix of the transactional endpoint.
    #[arg(long, env = "NEOQUERY_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "NEOQUERY_USER")]
    pub user: Option<String>,

    #[arg(long, env = "NEOQUERY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Query text.
    #[arg(long, env = "NEOQUERY_QUERY")]
    pub query: String,

    /// Query parameters as a JSON object.
    #[arg(long, env = "NEOQUERY_PARAMS")]
    pub params: Option<String>,

    /// Log level.
    #[arg(long, default_value = "warn", env = "NEOQUERY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: `text` or `json`.
    #[arg(long, default_value = "text", env = "NEOQUERY_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            driver_type: Some(self.driver_type),
            server: self.server.clone(),
            port: self.port,
            protocol: self.protocol.clone(),
            endpoint: self.endpoint.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            connection: None,
        }
    }

    /// The `--params` object, empty when not given.
    pub fn parameters(&self) -> Result<Parameters, ServiceError> {
        match self.params.as_deref() {
            None | Some("") => Ok(Parameters::new()),
            Some(text) => serde_json::from_str(text)
                .map_err(|e| ServiceError::Configuration(format!("--params is not a JSON object: {e}"))),
        }
    }
}

fn parse_driver_type(value: &str) -> Result<DriverType, String> {
    match value.to_ascii_lowercase().as_str() {
        "bolt" | "streaming" => Ok(DriverType::Streaming),
        "http" | "rest" | "stateless" => Ok(DriverType::Stateless),
        other => Err(format!("unknown transport `{other}`, expected `bolt` or `http`")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_minimal_arguments() {
        let config =
            Config::try_parse_from(["neoquery", "--type", "http", "--query", "RETURN 1"]).unwrap();
        assert_eq!(config.driver_type, DriverType::Stateless);
        assert_eq!(config.server, "localhost");

        let connection = config.connection_config();
        assert_eq!(connection.validate().unwrap(), DriverType::Stateless);
        assert_eq!(connection.connection_name(), "default");
        assert!(connection.credentials().is_none());
    }

    #[test]
    fn bolt_with_credentials_and_params() {
        let config = Config::try_parse_from([
            "neoquery",
            "--type",
            "bolt",
            "--server",
            "db",
            "--port",
            "7688",
            "--user",
            "neo4j",
            "--password",
            "secret",
            "--query",
            "MATCH (u {id: {id}}) RETURN u",
            "--params",
            r#"{"id": 7}"#,
        ])
        .unwrap();

        let connection = config.connection_config();
        assert_eq!(connection.driver_type, Some(DriverType::Streaming));
        assert_eq!(connection.port, Some(7688));
        assert_eq!(connection.credentials(), Some(("neo4j", "secret")));
        assert_eq!(config.parameters().unwrap()["id"], json!(7));
    }

    #[test]
    fn rejects_unknown_transport() {
        let result = Config::try_parse_from(["neoquery", "--type", "grpc", "--query", "RETURN 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_params_are_a_configuration_error() {
        let config = Config::try_parse_from([
            "neoquery", "--type", "http", "--query", "RETURN 1", "--params", "[1]",
        ])
        .unwrap();
        assert_eq!(config.parameters().unwrap_err().code(), 0);
    }
}
