//! Error types for clause synthesis and record access.

use thiserror::Error;

/// Errors raised while synthesizing SQL or moving values in and out of records.
///
/// Every variant except the record access ones is a configuration error:
/// it is reported before any SQL is handed to a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The insert resolved to zero columns, so no placeholder can be allocated.
    #[error("insert into `{table}` has no columns to bind")]
    EmptyFieldSet {
        /// Target table.
        table: String,
    },

    /// A batch insert was requested with no rows.
    #[error("batch insert into `{table}` has no rows")]
    EmptyRows {
        /// Target table.
        table: String,
    },

    /// A column name that does not resolve to a schema field.
    #[error("column `{column}` is not a field of `{table}`")]
    UnknownColumn {
        /// Target table.
        table: String,
        /// The unresolved column name.
        column: String,
    },

    /// RETURNING on a multi-row insert that cannot hand back per-row values.
    #[error("batch insert into `{table}` cannot return `{column}`: {reason}")]
    UnsupportedBatchReturning {
        /// Target table.
        table: String,
        /// The requested column.
        column: String,
        /// Why the combination is rejected.
        reason: &'static str,
    },

    /// RETURNING combined with ON CONFLICT, which is synthesized as MERGE.
    #[error("insert into `{table}` cannot combine ON CONFLICT with RETURNING")]
    UnsupportedUpsertReturning {
        /// Target table.
        table: String,
    },

    /// A field ordinal outside the record's schema.
    #[error("record has no field at ordinal {ordinal}")]
    UnknownOrdinal {
        /// The requested ordinal.
        ordinal: usize,
    },

    /// A value that cannot be stored in the field's Rust type.
    #[error("cannot convert {found} into {expected}")]
    ValueConversion {
        /// Rust type of the destination.
        expected: &'static str,
        /// Kind of the offending value.
        found: &'static str,
    },

    /// The driver returned a different number of output values than were bound.
    #[error("expected {expected} output values, driver returned {returned}")]
    OutputMismatch {
        /// Number of output destinations bound.
        expected: usize,
        /// Number of values returned.
        returned: usize,
    },
}

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, Error>;
