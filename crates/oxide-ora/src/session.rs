//! Create, find and transaction calls against an initialized connection.
//!
//! Every call builds its own [`Statement`], so concurrent calls on one
//! session never share synthesis state.

use std::sync::Arc;

use oxide_ora_core::clause::{
    Clause, Expr, Insert, Limit, OnConflict, OrderBy, Returning, Select, Table, Values, Where,
};
use oxide_ora_core::propagate::{propagate_last_insert_id, write_back_outputs};
use oxide_ora_core::statement::{CREATE_CLAUSES, QUERY_CLAUSES};
use oxide_ora_core::{
    BindVar, Dialect, OracleDialect, Record, RecordSlice, Schema, Shape, SqlValue, Statement,
    Target,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::conn::{Connection, Row};
use crate::error::{OraError, Result};
use crate::migrator::Migrator;

/// Options of a create call.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Insert into this table instead of the record's.
    pub table: Option<String>,
    /// Upsert behavior.
    pub on_conflict: Option<OnConflict>,
    /// Columns to read back. `None` reads back the generated ones.
    pub returning: Option<Returning>,
}

impl CreateOptions {
    /// Sets the target table.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Turns the insert into an upsert.
    #[must_use]
    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = Some(on_conflict);
        self
    }

    /// Reads back explicit columns.
    #[must_use]
    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = Some(returning);
        self
    }
}

/// A query for [`Session::find`].
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Selected columns; all when empty.
    pub columns: Vec<String>,
    /// Conditions, joined with `AND`.
    pub filters: Vec<Expr>,
    /// Ordering.
    pub order: Option<OrderBy>,
    /// Maximum number of rows.
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: i64,
}

impl Query {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects only `columns`.
    #[must_use]
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a condition.
    #[must_use]
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Sets the ordering.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order = Some(order);
        self
    }

    /// Limits the number of rows.
    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips rows.
    #[must_use]
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// What a create call did.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateResult {
    /// The executed SQL.
    pub sql: String,
    /// The bound variables, in placeholder order.
    pub vars: Vec<BindVar>,
    /// Rows inserted; 0 in dry-run mode.
    pub rows_affected: u64,
    /// Generated values written back to the records.
    pub keys_assigned: usize,
}

/// An initialized Oracle connection.
pub struct Session {
    conn: Arc<dyn Connection>,
    dialect: OracleDialect,
    config: Config,
    dry_run: bool,
}

impl Session {
    /// Creates a session over an open connection.
    pub fn new(conn: Arc<dyn Connection>, dialect: OracleDialect, config: Config) -> Self {
        Self {
            conn,
            dialect,
            config,
            dry_run: false,
        }
    }

    /// Enables dry-run mode: statements are built and logged, not executed.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &OracleDialect {
        &self.dialect
    }

    /// Returns the configuration the session was initialized with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the DDL helper.
    #[must_use]
    pub const fn migrator(&self) -> Migrator<'_> {
        Migrator::new(self)
    }

    /// Inserts one record or a slice of records.
    ///
    /// # Errors
    ///
    /// See [`Session::create_with`].
    pub async fn create<R: Record>(&self, target: Target<'_, R>) -> Result<CreateResult> {
        self.create_with(target, CreateOptions::default()).await
    }

    /// Inserts with explicit options.
    ///
    /// Generated values come back through `RETURNING ... INTO` when the
    /// dialect supports it; otherwise the driver's last insert id is spread
    /// over the records whose key is still zero.
    ///
    /// # Errors
    ///
    /// Returns a synthesis error before anything is sent, [`OraError::Exec`]
    /// if the insert fails and [`OraError::LastInsertId`] if the rows went
    /// in but their key cannot be read back.
    pub async fn create_with<R: Record>(
        &self,
        mut target: Target<'_, R>,
        options: CreateOptions,
    ) -> Result<CreateResult> {
        let schema = R::schema();
        let shape = if target.is_batch() {
            Shape::Batch { rows: target.len() }
        } else {
            Shape::Single
        };

        let mut stmt = Statement::new(schema, shape);
        stmt.add_clause(Clause::Insert(Insert {
            table: options.table,
        }));
        stmt.add_clause(Clause::Values(Values::from_target(&target)));
        let upsert = options.on_conflict.is_some();
        if let Some(on_conflict) = options.on_conflict {
            stmt.add_clause(Clause::OnConflict(on_conflict));
        }
        let returning = options
            .returning
            .or_else(|| self.default_returning(schema, target.is_batch(), upsert));
        if let Some(returning) = returning {
            stmt.add_clause(Clause::Returning(returning));
        }
        stmt.build(&self.dialect, CREATE_CLAUSES)?;
        let (sql, vars) = stmt.into_parts();

        debug!(
            table = schema.table(),
            rows = target.len(),
            sql = %self.dialect.explain(&sql, &vars),
            "create"
        );
        if self.dry_run {
            return Ok(CreateResult {
                sql,
                vars,
                rows_affected: 0,
                keys_assigned: 0,
            });
        }

        let outcome = self
            .conn
            .execute(&sql, &vars)
            .await
            .map_err(|source| OraError::Exec {
                sql: sql.clone(),
                source,
            })?;
        let rows_affected = outcome.rows_affected;

        let keys_assigned = if vars.iter().any(|var| var.out_slot().is_some()) {
            write_back_outputs(&mut target, &vars, outcome.outputs)?
        } else if rows_affected == 0 {
            0
        } else if !schema
            .prioritized_primary_field()
            .is_some_and(|field| field.has_default_value())
        {
            debug!(table = schema.table(), "no generated primary key to propagate");
            0
        } else {
            match outcome.last_insert_id {
                Ok(id) if id > 0 => propagate_last_insert_id(
                    &mut target,
                    id,
                    self.dialect.config().last_insert_id_reversed,
                )?,
                Ok(id) => {
                    warn!(table = schema.table(), id, "ignoring non-positive last insert id");
                    0
                }
                Err(source) => {
                    return Err(OraError::LastInsertId {
                        rows_affected,
                        source,
                    })
                }
            }
        };

        Ok(CreateResult {
            sql,
            vars,
            rows_affected,
            keys_assigned,
        })
    }

    /// Columns read back when the caller names none: those the database
    /// fills in, limited to sequence-backed ones for a batch.
    fn default_returning(&self, schema: &Schema, batch: bool, upsert: bool) -> Option<Returning> {
        if upsert || !self.dialect.supports_returning() {
            return None;
        }
        let columns: Vec<&str> = schema
            .fields_with_default_db_value()
            .filter(|(_, field)| !batch || field.sequence_name().is_some())
            .map(|(_, field)| field.db_name.as_str())
            .collect();
        (!columns.is_empty()).then(|| Returning::columns(columns))
    }

    /// Runs `query` and appends one record per row to `target`.
    ///
    /// Result columns are matched to fields by name, ignoring case;
    /// columns without a field are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Query`] if the query fails and a core error if
    /// a value does not convert into its field.
    pub async fn find<R: Record + Default>(
        &self,
        target: &mut dyn RecordSlice<Row = R>,
        query: Query,
    ) -> Result<usize> {
        let schema = R::schema();
        let mut stmt = Statement::new(schema, Shape::Batch { rows: 0 });
        stmt.add_clause(Clause::Select(Select {
            columns: query.columns,
        }));
        stmt.add_clause(Clause::From(Table::default()));
        stmt.add_clause(Clause::Where(Where {
            exprs: query.filters,
        }));
        if let Some(order) = query.order {
            stmt.add_clause(Clause::OrderBy(order));
        }
        if query.limit.is_some() || query.offset > 0 {
            stmt.add_clause(Clause::Limit(Limit {
                limit: query.limit,
                offset: query.offset,
            }));
        }
        stmt.build(&self.dialect, QUERY_CLAUSES)?;
        let (sql, vars) = stmt.into_parts();
        debug!(table = schema.table(), sql = %self.dialect.explain(&sql, &vars), "find");

        let rows = self
            .conn
            .query(&sql, &vars)
            .await
            .map_err(|source| OraError::Query {
                sql: sql.clone(),
                source,
            })?;

        let mut count = 0;
        for row in rows {
            if target.push_row(hydrate::<R>(schema, row)?) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the first record matching `query`.
    ///
    /// # Errors
    ///
    /// See [`Session::find`].
    pub async fn first<R: Record + Default>(&self, query: Query) -> Result<Option<R>> {
        let mut rows: Vec<R> = Vec::new();
        let query = query.limit(1);
        let schema = R::schema();
        let query = if query.order.is_none() {
            match schema.prioritized_primary_field() {
                Some(field) => query.order_by(OrderBy::asc(field.db_name.clone())),
                None => query,
            }
        } else {
            query
        };
        let mut collector = Collector(&mut rows);
        self.find(&mut collector, query).await?;
        Ok(rows.into_iter().next())
    }

    /// Executes raw SQL and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if the driver fails.
    pub async fn exec(&self, sql: &str, vars: &[BindVar]) -> Result<u64> {
        debug!(sql = %self.dialect.explain(sql, vars), "exec");
        if self.dry_run {
            return Ok(0);
        }
        let outcome = self
            .conn
            .execute(sql, vars)
            .await
            .map_err(|source| OraError::Exec {
                sql: sql.to_string(),
                source,
            })?;
        Ok(outcome.rows_affected)
    }

    /// Runs a query and returns the first column of its first row.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Query`] if the driver fails.
    pub async fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>> {
        debug!(sql, "query");
        self.conn
            .query_scalar(sql, &[])
            .await
            .map_err(|source| OraError::Query {
                sql: sql.to_string(),
                source,
            })
    }

    /// Sets a savepoint.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if the driver fails.
    pub async fn savepoint(&self, name: &str) -> Result<()> {
        info!(name, "savepoint");
        self.exec(&format!("SAVEPOINT {name}"), &[]).await?;
        Ok(())
    }

    /// Rolls back to a savepoint.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if the driver fails.
    pub async fn rollback_to(&self, name: &str) -> Result<()> {
        info!(name, "rollback to savepoint");
        self.exec(&format!("ROLLBACK TO SAVEPOINT {name}"), &[]).await?;
        Ok(())
    }

    /// Renders SQL with its values inlined.
    #[must_use]
    pub fn explain(&self, sql: &str, vars: &[BindVar]) -> String {
        self.dialect.explain(sql, vars)
    }
}

fn hydrate<R: Record + Default>(schema: &Schema, row: Row) -> Result<R> {
    let mut record = R::default();
    for (column, value) in row {
        let ordinal = schema
            .fields()
            .iter()
            .position(|field| field.db_name.eq_ignore_ascii_case(&column));
        match ordinal {
            Some(ordinal) => record.set_value(ordinal, value)?,
            None => debug!(table = schema.table(), column = %column, "unmapped result column"),
        }
    }
    Ok(record)
}

/// A growable target over any record type, for [`Session::first`].
struct Collector<'a, R>(&'a mut Vec<R>);

impl<R: Record> RecordSlice for Collector<'_, R> {
    type Row = R;

    fn row_count(&self) -> usize {
        self.0.len()
    }

    fn row(&self, index: usize) -> Option<&R> {
        self.0.get(index)
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        self.0.get_mut(index)
    }

    fn push_row(&mut self, row: R) -> bool {
        self.0.push(row);
        true
    }
}
