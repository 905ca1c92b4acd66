//! Oracle adapter for the oxide ORM statement engine.
//!
//! `oxide-ora` wires the Oracle dialect of [`oxide_ora_core`] to a database
//! connection:
//!
//! - **Dialector** - opens or accepts a connection and probes the server
//!   version to turn on identity columns and OFFSET/FETCH (12c and later)
//! - **Session** - create (single row, batch, upsert) with generated keys
//!   written back, find, raw exec, savepoints
//! - **Migrator** - Oracle DDL: tables, comments, sequences, renames
//!
//! The wire protocol belongs to a driver crate, plugged in through the
//! [`Connection`](conn::Connection) and [`Driver`](conn::Driver) traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_ora::prelude::*;
//!
//! #[derive(Debug, Default, Record)]
//! #[record(table = "customers")]
//! pub struct Customer {
//!     #[field(primary_key, auto_increment, sequence = "customers_s")]
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! let session = Dialector::open("oracle://scott:tiger@db:1521/ORCLPDB1")
//!     .with_driver(driver)
//!     .initialize()
//!     .await?;
//!
//! let mut customers = vec![Customer::default(), Customer::default()];
//! session.create(Target::Batch(&mut customers)).await?;
//! assert!(customers.iter().all(|c| c.id > 0));
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the SQL and bound variables of an insert plan
//! oxide-ora render --plan plan.json
//!
//! # Print the DDL of a schema
//! oxide-ora ddl --schema customers.json
//! ```

pub mod config;
pub mod conn;
pub mod dialector;
pub mod error;
pub mod migrator;
pub mod session;

pub use config::Config;
pub use dialector::Dialector;
pub use error::{OraError, Result};
pub use migrator::Migrator;
pub use session::{CreateOptions, CreateResult, Query, Session};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::conn::{BoxFuture, Connection, Driver, DriverError, ExecOutcome, Row};
    pub use crate::dialector::Dialector;
    pub use crate::error::{OraError, Result};
    pub use crate::migrator::Migrator;
    pub use crate::session::{CreateOptions, CreateResult, Query, Session};
    pub use oxide_ora_core::clause::{col, Assignment, OnConflict, OrderBy, Returning};
    pub use oxide_ora_core::{
        BindVar, DialectConfig, OracleDialect, Record, RecordSlice, SqlValue, Target,
    };
    pub use oxide_ora_derive::Record;
}
