/// Connection Management Module
///
/// This module opens driver connections from a `ConnectionConfig` and applies
/// the session attributes every gateway relies on: the character set, the
/// configured collation, foreign-key enforcement and the busy timeout.

use crate::config::ConnectionConfig;
use crate::core::{GatewayError, Result};
use rusqlite::{Connection, OpenFlags};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Text encodings the embedded driver can store a database in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl SessionEncoding {
    /// Maps a server-style charset name onto a driver encoding.
    ///
    /// `utf8mb4` is the full 4-byte UTF-8 and maps to plain UTF-8.
    pub fn from_charset(charset: &str) -> Result<Self> {
        match charset.trim().to_ascii_lowercase().as_str() {
            "utf8mb4" | "utf8" | "utf-8" | "utf8mb3" => Ok(SessionEncoding::Utf8),
            "utf16" | "utf16le" | "utf-16le" => Ok(SessionEncoding::Utf16Le),
            "utf16be" | "utf-16be" => Ok(SessionEncoding::Utf16Be),
            other => Err(GatewayError::Config(format!("unsupported charset '{}'", other))),
        }
    }

    pub fn pragma_value(self) -> &'static str {
        match self {
            SessionEncoding::Utf8 => "UTF-8",
            SessionEncoding::Utf16Le => "UTF-16le",
            SessionEncoding::Utf16Be => "UTF-16be",
        }
    }
}

/// Case-insensitive Unicode comparison registered under the configured collation name.
fn case_insensitive(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Opens a connection and applies the session attributes from `config`.
///
/// # Errors
///
/// Returns `GatewayError::Config` for an unsupported charset and
/// `GatewayError::Connection` when the database cannot be opened or the
/// session cannot be initialised.
pub fn open_session(config: &ConnectionConfig) -> Result<Connection> {
    let encoding = SessionEncoding::from_charset(&config.charset)?;
    let target = config.target();
    let connection_error = |source: rusqlite::Error| GatewayError::Connection {
        target: target.clone(),
        source,
    };

    if config.name.trim().is_empty() {
        return Err(connection_error(rusqlite::Error::InvalidPath("".into())));
    }

    debug!(
        "Opening {} (charset={}, collation={})",
        target, config.charset, config.collation
    );

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(&config.name, flags).map_err(connection_error)?;

    if let Some(timeout) = config.connect_timeout() {
        conn.busy_timeout(timeout).map_err(connection_error)?;
    }

    // Encoding only takes effect before the first table is created.
    conn.execute_batch(&format!(
        "PRAGMA encoding = '{}'; PRAGMA foreign_keys = ON;",
        encoding.pragma_value()
    ))
    .map_err(connection_error)?;

    if !config.collation.trim().is_empty() {
        conn.create_collation(config.collation.trim(), case_insensitive)
            .map_err(connection_error)?;
    }

    info!("Connected to {}", target);
    Ok(conn)
}

/// Closes a connection, handing back the driver error if the close fails.
pub fn close_session(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, source)| GatewayError::Execute {
        sql: "<close>".to_string(),
        source,
    })
}
