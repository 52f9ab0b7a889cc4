use crate::core::{GatewayError, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

/// Port used when none is given, matching the conventional server default.
pub const DEFAULT_PORT: u16 = 3306;
/// Character set applied to every session unless overridden.
pub const DEFAULT_CHARSET: &str = "utf8mb4";
/// Collation registered on every session unless overridden.
pub const DEFAULT_COLLATION: &str = "utf8mb4_swedish_ci";

/// Connection parameters shared by every gateway built from them.
///
/// `name` selects the database; for the embedded driver it is a file path
/// or `:memory:`. No value is validated until a connection is attempted.
///
/// The embedded driver has no server or accounts: `host`, `user`,
/// `password` and `port` are kept for configuration compatibility and only
/// appear in [`target`](Self::target) for logs and errors. A wrong host or
/// bad credentials therefore never cause a connection failure; only an
/// unopenable `name`, an unsupported `charset` or a lock held past
/// `connect_timeout_ms` do.
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub charset: String,
    pub collation: String,
    /// Busy timeout applied when opening and locking the database
    pub connect_timeout_ms: Option<u64>,
    /// Deadline for each individual statement
    pub statement_timeout_ms: Option<u64>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: String::new(),
            name: String::new(),
            user: String::new(),
            password: String::new(),
            port: DEFAULT_PORT,
            charset: DEFAULT_CHARSET.to_string(),
            collation: DEFAULT_COLLATION.to_string(),
            connect_timeout_ms: None,
            statement_timeout_ms: None,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("charset", &self.charset)
            .field("collation", &self.collation)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("statement_timeout_ms", &self.statement_timeout_ms)
            .finish()
    }
}

impl ConnectionConfig {
    /// Creates a configuration from the five connection parameters,
    /// leaving charset, collation and timeouts at their defaults.
    pub fn new(host: &str, name: &str, user: &str, password: &str, port: u16) -> Self {
        ConnectionConfig {
            host: host.to_string(),
            name: name.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            port,
            ..ConnectionConfig::default()
        }
    }

    /// Shorthand for a private in-memory database.
    pub fn in_memory() -> Self {
        ConnectionConfig {
            name: ":memory:".to_string(),
            ..ConnectionConfig::default()
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.to_string();
        self
    }

    pub fn with_collation(mut self, collation: &str) -> Self {
        self.collation = collation.to_string();
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    /// Human-readable target used in logs and errors. Never includes the password.
    pub fn target(&self) -> String {
        if self.host.is_empty() {
            self.name.clone()
        } else if self.user.is_empty() {
            format!("{}:{}/{}", self.host, self.port, self.name)
        } else {
            format!("{}@{}:{}/{}", self.user, self.host, self.port, self.name)
        }
    }
}

/// Process-wide connection parameters read by `TableGateway::new`.
static CURRENT: Lazy<RwLock<ConnectionConfig>> = Lazy::new(|| RwLock::new(ConnectionConfig::default()));

/// Stores the connection parameters used by every gateway constructed afterwards.
///
/// Gateways that already hold a connection are unaffected. No value is
/// checked here; a bad host or credentials show up when a gateway connects.
pub fn configure(host: &str, name: &str, user: &str, password: &str, port: u16) {
    configure_with(ConnectionConfig::new(host, name, user, password, port));
}

/// Replaces the process-wide configuration wholesale.
pub fn configure_with(config: ConnectionConfig) {
    match CURRENT.write() {
        Ok(mut guard) => *guard = config,
        // A panic while holding the lock cannot leave a half-written value behind.
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Snapshot of the process-wide configuration.
pub fn current_config() -> ConnectionConfig {
    match CURRENT.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: ConnectionConfig,
    pub logging: Option<LoggingConfig>,
}

/// Logging-related configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl Config {
    /// Log level for the subscriber, defaulting to `info`.
    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = tablegate::config::load_config("tablegate.toml").expect("Failed to load config");
/// tablegate::config::configure_with(config.database);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// `<config dir>/tablegate/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("tablegate").join("config.toml"))
        .ok_or_else(|| GatewayError::Config("no configuration directory on this platform".to_string()))
}
