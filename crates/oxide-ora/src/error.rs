//! Error types for the adapter.

use std::path::PathBuf;

use crate::conn::DriverError;

/// Errors raised while opening, querying or migrating through the adapter.
#[derive(Debug, thiserror::Error)]
pub enum OraError {
    /// Statement synthesis or record access failed.
    #[error(transparent)]
    Core(#[from] oxide_ora_core::Error),

    /// Neither a connection nor a driver was configured.
    #[error("No connection or driver configured for '{driver}'")]
    NoConnection {
        /// Configured driver name.
        driver: String,
    },

    /// The driver could not open a connection.
    #[error("Failed to open '{driver}' connection: {source}")]
    Open {
        /// Driver name.
        driver: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// A query failed.
    #[error("Query failed: {sql}: {source}")]
    Query {
        /// The SQL sent to the driver.
        sql: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// A statement failed to execute.
    #[error("Exec failed: {sql}: {source}")]
    Exec {
        /// The SQL sent to the driver.
        sql: String,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// Rows were inserted but the generated key could not be read back.
    #[error("Inserted {rows_affected} row(s) but the last insert id is unavailable: {source}")]
    LastInsertId {
        /// Rows the insert reported.
        rows_affected: u64,
        /// Driver failure.
        #[source]
        source: DriverError,
    },

    /// The operation is disabled by configuration.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// A field name did not resolve against the record's schema.
    #[error("Failed to look up field with name: {field} (table {table})")]
    UnknownField {
        /// Table searched.
        table: String,
        /// Name looked up.
        field: String,
    },

    /// IO error (reading configuration files).
    #[error("IO error reading '{path}': {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, OraError>;
