/// Database Module
///
/// The driver-facing layer, split into two concerns:
/// - **Connection Management** (`connection.rs`): opens sessions and applies charset, collation and timeouts
/// - **Query Execution** (`query.rs`): the parameterized execution primitive and its result types
///
/// Every failure is returned as a `GatewayError`; nothing here prints or swallows errors.
pub mod connection;
pub mod query;

pub use connection::*;
pub use query::*;
