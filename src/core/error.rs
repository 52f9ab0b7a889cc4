/// Gateway Error Module
///
/// This module defines the error type returned by every gateway operation.
/// Each failure kind gets its own variant so callers can branch on it
/// (retry a timeout, report a constraint violation, abort on bad config)
/// instead of inspecting message text.
use thiserror::Error;

/// Error type for configuration, connection and statement failures.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Invalid configuration values or an unreadable configuration file
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be opened with the given configuration
    #[error("Connection error for '{target}': {source}")]
    Connection {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    /// An operation was attempted on a gateway whose connection never came up
    #[error("Gateway is not connected: {0}")]
    NotConnected(String),

    /// The statement text could not be prepared (malformed SQL, unknown table)
    #[error("Failed to prepare statement `{sql}`: {source}")]
    Prepare {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The statement violated a UNIQUE, NOT NULL, CHECK or FOREIGN KEY constraint
    #[error("Constraint violation in `{sql}`: {source}")]
    Constraint {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Any other failure while running a prepared statement
    #[error("Statement execution failed for `{sql}`: {source}")]
    Execute {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The statement ran past its deadline or was interrupted
    #[error("Statement timed out or was interrupted: `{sql}`")]
    Timeout { sql: String },

    /// A table-bound operation was called on a gateway built without a table
    #[error("Gateway has no table bound; only raw execution is available")]
    NoTable,

    /// Insert or update called with no field values
    #[error("No field values supplied")]
    EmptyValues,

    /// Update or delete called with an empty predicate
    #[error("Refusing to run UPDATE/DELETE without a predicate")]
    MissingPredicate,

    /// A field name is not a plain SQL identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Command-line validation errors
    #[error("Command error: {0}")]
    Command(String),

    /// File system errors while reading configuration or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse errors while reading configuration
    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization errors when rendering result rows
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Builds the error for a failed statement run, classifying constraint
    /// violations, interrupts and everything else.
    pub(crate) fn from_execution(sql: &str, source: rusqlite::Error) -> Self {
        match sqlite_code(&source) {
            Some(rusqlite::ErrorCode::ConstraintViolation) => GatewayError::Constraint {
                sql: sql.to_string(),
                source,
            },
            Some(rusqlite::ErrorCode::OperationInterrupted) => GatewayError::Timeout {
                sql: sql.to_string(),
            },
            _ => GatewayError::Execute {
                sql: sql.to_string(),
                source,
            },
        }
    }

    /// Builds the error for a statement that failed to prepare.
    ///
    /// Preparing reads the schema, so lock contention and interrupts can
    /// land here too; they are classified the same way as during execution.
    pub(crate) fn from_prepare(sql: &str, source: rusqlite::Error) -> Self {
        match sqlite_code(&source) {
            Some(rusqlite::ErrorCode::OperationInterrupted) => GatewayError::Timeout {
                sql: sql.to_string(),
            },
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                GatewayError::Execute {
                    sql: sql.to_string(),
                    source,
                }
            }
            _ => GatewayError::Prepare {
                sql: sql.to_string(),
                source,
            },
        }
    }

    /// Whether repeating the same call could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout { .. } | GatewayError::Connection { .. } => true,
            GatewayError::Execute { source, .. } => matches!(
                sqlite_code(source),
                Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

fn sqlite_code(err: &rusqlite::Error) -> Option<rusqlite::ErrorCode> {
    match err {
        rusqlite::Error::SqliteFailure(inner, _) => Some(inner.code),
        _ => None,
    }
}

/// Result alias used by every fallible gateway operation.
pub type Result<T> = std::result::Result<T, GatewayError>;
