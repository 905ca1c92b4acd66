//! # oxide-ora-core
//!
//! Oracle dialect clause synthesis for an ORM statement engine.
//!
//! The engine hands over an abstract statement (schema, columns, value
//! matrix, clause list). This crate turns the INSERT, VALUES, RETURNING,
//! LIMIT and ON CONFLICT clauses into Oracle SQL and keeps the bound
//! variable list in step with the placeholders it emits:
//!
//! - sequence-backed columns are injected and rendered as `seq.NEXTVAL`
//! - multi-row inserts become a `SELECT ... FROM DUAL UNION ALL ...` source,
//!   or an anonymous PL/SQL block when generated keys must come back
//! - `RETURNING ... INTO` registers output destinations on the record
//! - `LIMIT`/`OFFSET` become `OFFSET n ROWS FETCH NEXT m ROWS ONLY`
//! - `ON CONFLICT` becomes a `MERGE`
//!
//! ## Example
//!
//! ```rust
//! use oxide_ora_core::clause::{Clause, Insert, Values};
//! use oxide_ora_core::dialect::{DialectConfig, OracleDialect};
//! use oxide_ora_core::schema::{DataType, Field, Schema};
//! use oxide_ora_core::statement::{Shape, Statement, CREATE_CLAUSES};
//! use oxide_ora_core::value::{BindVar, SqlValue};
//!
//! let schema = Schema::new(
//!     "customers",
//!     vec![
//!         Field::new("customer_id", DataType::Int)
//!             .primary_key()
//!             .sequence("customers_s"),
//!         Field::new("customer_name", DataType::String),
//!     ],
//! );
//!
//! let dialect = OracleDialect::new(DialectConfig::default());
//! let mut stmt = Statement::new(&schema, Shape::Single);
//! stmt.add_clause(Clause::Insert(Insert::default()));
//! stmt.add_clause(Clause::Values(Values::new(
//!     vec!["customer_name".into()],
//!     vec![vec![BindVar::In(SqlValue::Text("Alice".into()))]],
//! )));
//! stmt.build(&dialect, CREATE_CLAUSES).unwrap();
//!
//! assert_eq!(
//!     stmt.sql(),
//!     "INSERT INTO customers (customer_id,customer_name) VALUES (customers_s.NEXTVAL,:p0_1)"
//! );
//! assert_eq!(stmt.vars().len(), 1);
//! ```

pub mod clause;
pub mod dialect;
mod error;
pub mod propagate;
pub mod record;
pub mod schema;
pub mod statement;
pub mod value;

pub use dialect::{Dialect, DialectConfig, GenericDialect, OracleDialect};
pub use error::{Error, Result};
pub use record::{Record, RecordSlice, Target};
pub use schema::{DataType, Field, Schema};
pub use statement::{Shape, Statement, SynthesisState};
pub use value::{BindVar, FromSqlValue, OutSlot, SqlValue, ToSqlValue};
