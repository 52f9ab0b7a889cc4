/// Core Module
///
/// Shared infrastructure for the gateway: the error type and the driver
/// layer that opens sessions and executes statements.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{GatewayError, Result};
