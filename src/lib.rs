//! Table gateway over a single database connection.
//!
//! ```no_run
//! use tablegate::{configure, CatalogJoin, Filter, Select, TableGateway, Value};
//!
//! configure("", "/var/lib/registry/registry.db", "", "", 3306);
//!
//! let pf = TableGateway::new(Some("registro_pf"));
//! let id = pf.insert(vec![("nome", Value::Text("Ana".into()))])?;
//! let _rows = pf.select(
//!     &Select::new()
//!         .join(CatalogJoin::RegistroPfPj)
//!         .filter(Filter::new().eq("registro_pf.id_registro", id)),
//! )?;
//! # Ok::<(), tablegate::GatewayError>(())
//! ```

// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod cli;
pub mod config;
pub mod filter;
pub mod gateway;
pub mod joins;
pub mod sql;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::config::{configure, configure_with, current_config, ConnectionConfig};
pub use crate::core::db::{QueryResult, StatementResult};
pub use crate::core::{GatewayError, Result};
pub use crate::filter::{Filter, Where};
pub use crate::gateway::TableGateway;
pub use crate::joins::CatalogJoin;
pub use crate::sql::Select;
pub use rusqlite::types::Value;
