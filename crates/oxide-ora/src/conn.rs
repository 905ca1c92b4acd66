//! The connection collaborator.
//!
//! The adapter never speaks a wire protocol itself. An Oracle driver is
//! plugged in through [`Driver`] (to open connections from a DSN) or a
//! ready [`Connection`] is injected. Both return boxed futures so they can
//! be used as trait objects.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use oxide_ora_core::{BindVar, SqlValue};

/// Boxed future type for connection calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One result row: column name and value, in select order.
pub type Row = Vec<(String, SqlValue)>;

/// A failure reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe(.code, .message))]
pub struct DriverError {
    /// Server error code (`ORA-nnnnn`), when known.
    pub code: Option<u32>,
    /// Driver message.
    pub message: String,
}

impl DriverError {
    /// Creates an error without a server code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Attaches an `ORA-` code.
    #[must_use]
    pub const fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }
}

fn describe(code: &Option<u32>, message: &str) -> String {
    match code {
        Some(code) => format!("ORA-{code:05}: {message}"),
        None => message.to_string(),
    }
}

/// What an executed statement reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecOutcome {
    /// Rows affected.
    pub rows_affected: u64,
    /// Values written to the output placeholders, in placeholder order.
    pub outputs: Vec<SqlValue>,
    /// The last generated key, or why the driver has none.
    pub last_insert_id: Result<i64, DriverError>,
}

impl ExecOutcome {
    /// An outcome with no outputs and no last insert id.
    #[must_use]
    pub fn rows(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            outputs: Vec::new(),
            last_insert_id: Err(DriverError::new("driver does not report a last insert id")),
        }
    }

    /// Sets the output values.
    #[must_use]
    pub fn with_outputs(mut self, outputs: Vec<SqlValue>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Sets the last insert id.
    #[must_use]
    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Ok(id);
        self
    }
}

/// An open database connection.
///
/// Output variables ([`BindVar::Out`]) must be bound as OUT parameters and
/// their values returned in [`ExecOutcome::outputs`], in order.
pub trait Connection: Send + Sync {
    /// Runs a query and returns its rows.
    fn query<'a>(
        &'a self,
        sql: &'a str,
        vars: &'a [BindVar],
    ) -> BoxFuture<'a, Result<Vec<Row>, DriverError>>;

    /// Executes a statement.
    fn execute<'a>(
        &'a self,
        sql: &'a str,
        vars: &'a [BindVar],
    ) -> BoxFuture<'a, Result<ExecOutcome, DriverError>>;

    /// Runs a query and returns the first column of its first row.
    fn query_scalar<'a>(
        &'a self,
        sql: &'a str,
        vars: &'a [BindVar],
    ) -> BoxFuture<'a, Result<Option<SqlValue>, DriverError>> {
        Box::pin(async move {
            let rows = self.query(sql, vars).await?;
            Ok(rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .map(|(_, value)| value))
        })
    }
}

/// Opens connections from a DSN.
pub trait Driver: Send + Sync {
    /// Opens a connection.
    fn open<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<Arc<dyn Connection>, DriverError>>;
}
