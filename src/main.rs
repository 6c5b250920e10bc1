//! NeoQuery console entry point.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use neoquery::config::Config;
use neoquery::{GraphClient, ServiceError};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        transport = %config.driver_type,
        server = %config.server,
        "NeoQuery starting",
    );

    match run(&config).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error {}: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<String, ServiceError> {
    let params = config.parameters()?;
    let client = GraphClient::new();
    let connection = config.connection_config();
    client.connect(&connection).await?;

    let result = client
        .query(&config.query, params, Some(connection.connection_name()))
        .await;
    client.flush_connections().await;

    Ok(format!("{:#}", result?.to_json()))
}
