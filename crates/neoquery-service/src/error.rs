//! Service-layer error types.
//!
//! `ServiceError` is transport-agnostic. Transport crates wrap their native
//! client errors into [`ServiceError::Transport`] and friends, keeping the
//! original error as the `source`.

use crate::types::DriverType;

/// Boxed cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown, missing or duplicate connection.
    Connection,
    /// The backend or the wire failed.
    Transport,
    /// The transport cannot perform the requested operation.
    UnsupportedOperation,
    /// The call itself was incomplete (no builder, no query, bad config).
    Configuration,
}

/// Service error shared across all transports.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No connection is registered under the requested name.
    #[error("no active connection with name \"{0}\" found")]
    ConnectionNotFound(String),

    /// The driver was used before `connect`.
    #[error("no connection to the database available, connect first")]
    NoConnection,

    /// A connection with this name is already registered.
    #[error("a connection named \"{0}\" is already registered")]
    DuplicateConnection(String),

    /// Acquiring a session or transaction handle failed.
    #[error("error on getting session: {message}")]
    Session {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Running the query failed.
    #[error("querying the data was not successful: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Committing or rolling back the open transaction failed.
    #[error("error on executing transaction commit: {message}")]
    CommitFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Transaction control on a transport without transactions.
    #[error("transactions are not supported on the {0} transport")]
    TransactionsUnsupported(DriverType),

    /// `execute` was called without a query builder.
    #[error("no query builder given")]
    MissingBuilder,

    /// Neither a raw nor a built query is available.
    #[error("no query to execute given")]
    NoQuery,

    /// Invalid connection configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Wraps a native client error as a query failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn session<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Session {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn commit<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CommitFailed {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Query failure without an underlying error value.
    pub fn transport_message(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnectionNotFound(_) | Self::NoConnection | Self::DuplicateConnection(_) => {
                ErrorKind::Connection
            }
            Self::Session { .. } | Self::Transport { .. } | Self::CommitFailed { .. } => {
                ErrorKind::Transport
            }
            Self::TransactionsUnsupported(_) => ErrorKind::UnsupportedOperation,
            Self::MissingBuilder | Self::NoQuery | Self::Configuration(_) => {
                ErrorKind::Configuration
            }
        }
    }

    /// Stable numeric code, shared with the builder's 12xx range.
    pub fn code(&self) -> u16 {
        match self {
            Self::Configuration(_) => 0,
            Self::MissingBuilder => 10,
            Self::ConnectionNotFound(_) => 11,
            Self::NoQuery => 12,
            Self::TransactionsUnsupported(_) => 13,
            Self::DuplicateConnection(_) => 14,
            Self::NoConnection => 1000,
            Self::Session { .. } => 1001,
            Self::Transport { .. } => 1002,
            Self::CommitFailed { .. } => 1003,
        }
    }
}
