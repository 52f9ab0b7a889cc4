//! Table gateway: one connection bound to one table.
//!
//! A gateway opens its own connection when it is built and releases it when
//! it is closed or dropped. Connections are never shared between gateways.
//! Every operation goes through [`TableGateway::execute`], which binds values
//! as parameters; predicate, ordering, limit, projection and join text is
//! caller-supplied SQL and is used verbatim.

use crate::config::{current_config, ConnectionConfig};
use crate::core::db::{close_session, execute_statement, open_session, QueryResult, StatementResult};
use crate::core::{GatewayError, Result};
use crate::filter::Where;
use crate::sql::{delete_sql, insert_sql, update_sql, Select};
use rusqlite::types::Value;
use rusqlite::{Connection, InterruptHandle};
use std::time::Duration;
use tracing::{info, warn};

enum ConnectionState {
    Open(Connection),
    /// Construction failed; holds the reason reported to later callers
    Failed(String),
    Closed,
}

/// CRUD access to a single table over an exclusively owned connection.
pub struct TableGateway {
    table: Option<String>,
    target: String,
    statement_timeout: Option<Duration>,
    state: ConnectionState,
}

impl TableGateway {
    /// Connects to the database described by `config` and binds the gateway to `table`.
    ///
    /// # Errors
    ///
    /// `GatewayError::Connection` or `GatewayError::Config` when the session
    /// cannot be established.
    pub fn connect(table: &str, config: &ConnectionConfig) -> Result<Self> {
        Self::open(Some(table), config)
    }

    /// Connects without binding a table. Only [`execute`](Self::execute) is usable.
    pub fn connect_raw(config: &ConnectionConfig) -> Result<Self> {
        Self::open(None, config)
    }

    fn open(table: Option<&str>, config: &ConnectionConfig) -> Result<Self> {
        let conn = open_session(config)?;
        Ok(TableGateway {
            table: table.map(str::to_string),
            target: config.target(),
            statement_timeout: config.statement_timeout(),
            state: ConnectionState::Open(conn),
        })
    }

    /// Builds a gateway from `config` without failing.
    ///
    /// If the connection cannot be opened the failure is logged and the
    /// gateway is returned disconnected; every later operation returns
    /// `GatewayError::NotConnected` carrying the original reason.
    pub fn with_config(table: Option<&str>, config: &ConnectionConfig) -> Self {
        match Self::open(table, config) {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!("Gateway for {:?} started without a connection: {}", table, e);
                TableGateway {
                    table: table.map(str::to_string),
                    target: config.target(),
                    statement_timeout: config.statement_timeout(),
                    state: ConnectionState::Failed(e.to_string()),
                }
            }
        }
    }

    /// Builds a gateway from the process-wide configuration set by
    /// [`configure`](crate::config::configure), without failing.
    pub fn new(table: Option<&str>) -> Self {
        Self::with_config(table, &current_config())
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Open(_))
    }

    fn connection(&self) -> Result<&Connection> {
        match &self.state {
            ConnectionState::Open(conn) => Ok(conn),
            ConnectionState::Failed(reason) => Err(GatewayError::NotConnected(reason.clone())),
            ConnectionState::Closed => Err(GatewayError::NotConnected("connection closed".to_string())),
        }
    }

    fn bound_table(&self) -> Result<&str> {
        self.table.as_deref().ok_or(GatewayError::NoTable)
    }

    /// Handle that can abort the statement currently running on this gateway
    /// from another thread.
    pub fn interrupt_handle(&self) -> Result<InterruptHandle> {
        Ok(self.connection()?.get_interrupt_handle())
    }

    /// Prepares `sql`, binds `params` positionally and runs it.
    ///
    /// This is the single point through which every other operation sends SQL.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let conn = self.connection()?;
        execute_statement(conn, sql, params, self.statement_timeout)
    }

    /// Inserts one row and returns the identifier the database assigned to it.
    ///
    /// Values are bound in the order the pairs are yielded.
    pub fn insert<I, K, V>(&self, values: I) -> Result<i64>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let table = self.bound_table()?;
        let (fields, params): (Vec<K>, Vec<Value>) = values.into_iter().map(|(k, v)| (k, Into::<Value>::into(v))).unzip();
        let fields: Vec<&str> = fields.iter().map(|k| k.as_ref()).collect();

        let sql = insert_sql(table, &fields)?;
        self.execute(&sql, &params)?;
        Ok(self.connection()?.last_insert_rowid())
    }

    /// Runs a read built from `select` against the bound table.
    pub fn select(&self, select: &Select) -> Result<QueryResult> {
        let table = self.bound_table()?;
        let (sql, params) = select.build(table)?;
        Ok(self.execute(&sql, &params)?.into_rows())
    }

    /// Runs `select` with `join` as its join clause, replacing any join it already had.
    ///
    /// `join` is used verbatim; catalog entries come from
    /// [`CatalogJoin::sql`](crate::joins::CatalogJoin::sql).
    pub fn select_with_join(&self, join: &str, select: &Select) -> Result<QueryResult> {
        self.select(&select.clone().join_sql(join))
    }

    /// Updates the rows matching `predicate` and returns how many changed.
    ///
    /// Zero matching rows is not an error.
    pub fn update<W, I, K, V>(&self, predicate: W, values: I) -> Result<usize>
    where
        W: Into<Where>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let table = self.bound_table()?;
        let (predicate, predicate_params) = predicate.into().render()?;
        let (fields, mut params): (Vec<K>, Vec<Value>) = values.into_iter().map(|(k, v)| (k, Into::<Value>::into(v))).unzip();
        let fields: Vec<&str> = fields.iter().map(|k| k.as_ref()).collect();

        let sql = update_sql(table, &fields, &predicate)?;
        params.extend(predicate_params);
        Ok(self.execute(&sql, &params)?.affected_rows())
    }

    /// Deletes the rows matching `predicate` and returns how many were removed.
    ///
    /// Zero matching rows is not an error.
    pub fn delete<W: Into<Where>>(&self, predicate: W) -> Result<usize> {
        let table = self.bound_table()?;
        let (predicate, params) = predicate.into().render()?;
        let sql = delete_sql(table, &predicate)?;
        Ok(self.execute(&sql, &params)?.affected_rows())
    }

    /// Releases the connection, reporting a failed close.
    pub fn close(mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, ConnectionState::Closed) {
            ConnectionState::Open(conn) => {
                close_session(conn)?;
                info!("Closed connection to {}", self.target);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Drop for TableGateway {
    fn drop(&mut self) {
        if let ConnectionState::Open(conn) = std::mem::replace(&mut self.state, ConnectionState::Closed) {
            match close_session(conn) {
                Ok(()) => info!("Closed connection to {}", self.target),
                Err(e) => warn!("Failed to close connection to {}: {}", self.target, e),
            }
        }
    }
}
