//! Abstract clause model.
//!
//! A [`Statement`] carries its clauses keyed by name. Each clause has a
//! generic, MySQL-shaped builder; a dialect overrides the ones it needs
//! through its clause-builder table.

mod expr;

pub use expr::{col, Column, Expr};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::record::{Record, Target};
use crate::statement::{Statement, SynthesisState};
use crate::value::{BindVar, SqlValue};

/// Clause name of [`Insert`].
pub const INSERT: &str = "INSERT";
/// Clause name of [`Values`].
pub const VALUES: &str = "VALUES";
/// Clause name of [`OnConflict`].
pub const ON_CONFLICT: &str = "ON CONFLICT";
/// Clause name of [`Returning`].
pub const RETURNING: &str = "RETURNING";
/// Clause name of [`Select`].
pub const SELECT: &str = "SELECT";
/// Clause name of [`Table`].
pub const FROM: &str = "FROM";
/// Clause name of [`Where`].
pub const WHERE: &str = "WHERE";
/// Clause name of [`OrderBy`].
pub const ORDER_BY: &str = "ORDER BY";
/// Clause name of [`Limit`].
pub const LIMIT: &str = "LIMIT";

/// A clause of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `INSERT INTO table`.
    Insert(Insert),
    /// Column list and value matrix of an insert.
    Values(Values),
    /// Conflict handling of an insert.
    OnConflict(OnConflict),
    /// Columns generated by the server to hand back.
    Returning(Returning),
    /// Projection.
    Select(Select),
    /// Source table.
    From(Table),
    /// Filter.
    Where(Where),
    /// Ordering.
    OrderBy(OrderBy),
    /// Pagination.
    Limit(Limit),
}

impl Clause {
    /// Returns the clause name used as the statement key.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Insert(_) => INSERT,
            Self::Values(_) => VALUES,
            Self::OnConflict(_) => ON_CONFLICT,
            Self::Returning(_) => RETURNING,
            Self::Select(_) => SELECT,
            Self::From(_) => FROM,
            Self::Where(_) => WHERE,
            Self::OrderBy(_) => ORDER_BY,
            Self::Limit(_) => LIMIT,
        }
    }

    /// Writes the clause with the generic builder.
    ///
    /// # Errors
    ///
    /// Forwards errors raised by the dialect's placeholder allocation.
    pub fn build<D: Dialect + ?Sized>(
        &self,
        dialect: &D,
        stmt: &mut Statement<'_>,
        state: &mut SynthesisState,
    ) -> Result<()> {
        match self {
            Self::Insert(insert) => {
                insert.build(dialect, stmt);
                Ok(())
            }
            Self::Values(values) => values.build(dialect, stmt, state),
            Self::OnConflict(on_conflict) => {
                on_conflict.build(dialect, stmt);
                Ok(())
            }
            Self::Returning(returning) => {
                returning.build(dialect, stmt);
                Ok(())
            }
            Self::Select(select) => {
                select.build(dialect, stmt);
                Ok(())
            }
            Self::From(table) => {
                table.build(dialect, stmt);
                Ok(())
            }
            Self::Where(filter) => filter.build(dialect, stmt, state),
            Self::OrderBy(order) => {
                order.build(dialect, stmt);
                Ok(())
            }
            Self::Limit(limit) => {
                limit.build(stmt);
                Ok(())
            }
        }
    }
}

fn write_column_list<D: Dialect + ?Sized>(dialect: &D, stmt: &mut Statement<'_>, columns: &[String]) {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            stmt.write_char(',');
        }
        stmt.write_quoted(dialect, column);
    }
}

/// `INSERT INTO table`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insert {
    /// Target table; the schema's table when `None`.
    pub table: Option<String>,
}

impl Insert {
    /// Creates an insert into an explicit table.
    #[must_use]
    pub fn into_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
        }
    }

    /// Writes `INSERT INTO table`.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        let table = self
            .table
            .clone()
            .unwrap_or_else(|| stmt.schema().table().to_string());
        stmt.write_str("INSERT INTO ");
        stmt.write_quoted(dialect, &table);
    }
}

/// Column list and value matrix of an insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    /// Column names, in emission order.
    pub columns: Vec<String>,
    /// One entry per row, one cell per column.
    pub rows: Vec<Vec<BindVar>>,
    /// Index of each row inside the insert target, for output slots.
    pub origins: Vec<usize>,
}

impl Values {
    /// Creates a value matrix whose rows map to target indexes `0..n`.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<BindVar>>) -> Self {
        let origins = (0..rows.len()).collect();
        Self {
            columns,
            rows,
            origins,
        }
    }

    /// Builds the column list and value matrix of a create call.
    ///
    /// Every field is included, except a field with a default DB value
    /// that holds its zero value in every row. Absent batch elements are
    /// skipped; the remaining rows keep their index in `origins`.
    #[must_use]
    pub fn from_target<R: Record>(target: &Target<'_, R>) -> Self {
        let schema = R::schema();
        let present: Vec<(usize, &R)> = (0..target.len())
            .filter_map(|i| target.row(i).map(|record| (i, record)))
            .collect();

        let ordinals: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(ordinal, field)| {
                !field.has_default_value()
                    || present
                        .iter()
                        .any(|(_, record)| !record.value_of(*ordinal).is_zero())
            })
            .map(|(ordinal, _)| ordinal)
            .collect();

        let columns = ordinals
            .iter()
            .filter_map(|&ordinal| schema.field(ordinal))
            .map(|field| field.db_name.clone())
            .collect();
        let rows = present
            .iter()
            .map(|(_, record)| {
                ordinals
                    .iter()
                    .map(|&ordinal| BindVar::In(record.value_of(ordinal)))
                    .collect()
            })
            .collect();
        let origins = present.iter().map(|(i, _)| *i).collect();

        Self {
            columns,
            rows,
            origins,
        }
    }

    /// Returns the target index of the row at `row`.
    #[must_use]
    pub fn origin(&self, row: usize) -> usize {
        self.origins.get(row).copied().unwrap_or(row)
    }

    /// Writes `(a,b) VALUES (x,y),(x,y)`, binding every cell.
    ///
    /// # Errors
    ///
    /// Forwards errors raised by the dialect's placeholder allocation.
    pub fn build<D: Dialect + ?Sized>(
        &self,
        dialect: &D,
        stmt: &mut Statement<'_>,
        state: &mut SynthesisState,
    ) -> Result<()> {
        if self.columns.is_empty() {
            stmt.write_str("DEFAULT VALUES");
            return Ok(());
        }

        stmt.write_char('(');
        write_column_list(dialect, stmt, &self.columns);
        stmt.write_str(") VALUES ");
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_char('(');
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    stmt.write_char(',');
                }
                stmt.add_var(dialect, state, cell.clone())?;
            }
            stmt.write_char(')');
        }
        Ok(())
    }
}

/// Columns generated by the server to hand back after an insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Returning {
    /// Column names; empty or `*` means every field with a default DB value.
    pub columns: Vec<String>,
}

impl Returning {
    /// Creates a RETURNING clause for the given columns.
    #[must_use]
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether every default-valued field is requested.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.columns.is_empty() || (self.columns.len() == 1 && self.columns[0] == "*")
    }

    /// Writes `RETURNING a,b`.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        stmt.write_str("RETURNING ");
        if self.is_wildcard() {
            stmt.write_char('*');
        } else {
            write_column_list(dialect, stmt, &self.columns);
        }
    }
}

/// Pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limit {
    /// Maximum number of rows; non-positive or `None` means no limit.
    pub limit: Option<i64>,
    /// Rows to skip; non-positive means none.
    pub offset: i64,
}

impl Limit {
    /// Writes `LIMIT n OFFSET m`.
    pub fn build(&self, stmt: &mut Statement<'_>) {
        let mut wrote = false;
        if let Some(limit) = self.limit.filter(|&n| n >= 0) {
            stmt.write_str(&format!("LIMIT {limit}"));
            wrote = true;
        }
        if self.offset > 0 {
            if wrote {
                stmt.write_char(' ');
            }
            stmt.write_str(&format!("OFFSET {}", self.offset));
        }
    }
}

/// The value assigned to a column when an insert conflicts.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    /// The value the conflicting row tried to insert into this column.
    Excluded(String),
    /// A bound literal.
    Value(SqlValue),
}

/// `column = value` in the update branch of a conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Updated column.
    pub column: String,
    /// New value.
    pub value: AssignValue,
}

impl Assignment {
    /// Assigns the incoming value of the same column.
    #[must_use]
    pub fn excluded(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            value: AssignValue::Excluded(column.clone()),
            column,
        }
    }

    /// Assigns a bound literal.
    #[must_use]
    pub fn value(column: impl Into<String>, value: SqlValue) -> Self {
        Self {
            column: column.into(),
            value: AssignValue::Value(value),
        }
    }
}

/// Conflict handling of an insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnConflict {
    /// Conflict target; the primary key when empty.
    pub columns: Vec<String>,
    /// Keep the existing row.
    pub do_nothing: bool,
    /// Explicit updates of the existing row.
    pub do_updates: Vec<Assignment>,
    /// Update every inserted column that is neither a conflict column nor
    /// sequence-generated.
    pub update_all: bool,
}

impl OnConflict {
    /// Writes `ON CONFLICT (cols) DO NOTHING | DO UPDATE SET ...`.
    ///
    /// Literal assignments are written inline by the generic builder; the
    /// Oracle builder binds them.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        stmt.write_str("ON CONFLICT");
        if !self.columns.is_empty() {
            stmt.write_str(" (");
            write_column_list(dialect, stmt, &self.columns);
            stmt.write_char(')');
        }
        if self.do_nothing || self.do_updates.is_empty() {
            stmt.write_str(" DO NOTHING");
            return;
        }
        stmt.write_str(" DO UPDATE SET ");
        for (i, assignment) in self.do_updates.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_quoted(dialect, &assignment.column);
            stmt.write_char('=');
            match &assignment.value {
                AssignValue::Excluded(column) => {
                    stmt.write_str("excluded.");
                    stmt.write_quoted(dialect, column);
                }
                AssignValue::Value(value) => stmt.write_str(&value.to_sql_inline()),
            }
        }
    }
}

/// Projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Select {
    /// Selected columns; `*` when empty.
    pub columns: Vec<String>,
}

impl Select {
    /// Writes `SELECT a,b`.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        stmt.write_str("SELECT ");
        if self.columns.is_empty() {
            stmt.write_char('*');
        } else {
            write_column_list(dialect, stmt, &self.columns);
        }
    }
}

/// Source table of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Table name; the schema's table when `None`.
    pub name: Option<String>,
}

impl Table {
    /// Writes `FROM table`.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        let table = self
            .name
            .clone()
            .unwrap_or_else(|| stmt.schema().table().to_string());
        stmt.write_str("FROM ");
        stmt.write_quoted(dialect, &table);
    }
}

/// Filter: expressions joined by AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    /// Conjuncts.
    pub exprs: Vec<Expr>,
}

impl Where {
    /// Writes `WHERE a AND b`, binding every marker.
    ///
    /// # Errors
    ///
    /// Forwards errors raised by the dialect's placeholder allocation.
    pub fn build<D: Dialect + ?Sized>(
        &self,
        dialect: &D,
        stmt: &mut Statement<'_>,
        state: &mut SynthesisState,
    ) -> Result<()> {
        if self.exprs.is_empty() {
            return Ok(());
        }
        stmt.write_str("WHERE ");
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                stmt.write_str(" AND ");
            }
            let wrap = self.exprs.len() > 1 && expr.sql().contains(" OR ");
            if wrap {
                stmt.write_char('(');
            }
            let mut params = expr.params().iter();
            let mut in_literal = false;
            for ch in expr.sql().chars() {
                match ch {
                    '\'' => {
                        in_literal = !in_literal;
                        stmt.write_char(ch);
                    }
                    '?' if !in_literal => match params.next() {
                        Some(value) => stmt.add_var(dialect, state, BindVar::In(value.clone()))?,
                        None => stmt.write_char(ch),
                    },
                    _ => stmt.write_char(ch),
                }
            }
            if wrap {
                stmt.write_char(')');
            }
        }
        Ok(())
    }
}

/// One ordering term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByColumn {
    /// Column name.
    pub column: String,
    /// Descending order.
    pub desc: bool,
}

/// Ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy {
    /// Ordering terms.
    pub columns: Vec<OrderByColumn>,
}

impl OrderBy {
    /// Orders by one column, ascending.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            columns: vec![OrderByColumn {
                column: column.into(),
                desc: false,
            }],
        }
    }

    /// Orders by one column, descending.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            columns: vec![OrderByColumn {
                column: column.into(),
                desc: true,
            }],
        }
    }

    /// Writes `ORDER BY a,b DESC`.
    pub fn build<D: Dialect + ?Sized>(&self, dialect: &D, stmt: &mut Statement<'_>) {
        if self.columns.is_empty() {
            return;
        }
        stmt.write_str("ORDER BY ");
        for (i, term) in self.columns.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_quoted(dialect, &term.column);
            if term.desc {
                stmt.write_str(" DESC");
            }
        }
    }
}
