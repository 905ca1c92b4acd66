//! Statement assembly.
//!
//! A [`Statement`] lives for one create or find call: clauses go in, SQL
//! text and bound variables come out. Every build gets a fresh
//! [`SynthesisState`], so placeholder counters never leak from one
//! statement into another.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::clause::{self, Clause};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::BindVar;

/// Clause order of a create call.
pub const CREATE_CLAUSES: &[&str] = &[
    clause::INSERT,
    clause::VALUES,
    clause::ON_CONFLICT,
    clause::RETURNING,
];

/// Clause order of a query.
pub const QUERY_CLAUSES: &[&str] = &[
    clause::SELECT,
    clause::FROM,
    clause::WHERE,
    clause::ORDER_BY,
    clause::LIMIT,
];

/// Whether the statement targets one record or a slice of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One record.
    Single,
    /// A slice of `rows` elements.
    Batch {
        /// Number of elements in the target.
        rows: usize,
    },
}

/// SQL shape chosen for an insert, once per statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStrategy {
    /// `INSERT INTO t (cols) VALUES (...)`.
    SingleRow,
    /// Single row followed by `RETURNING ... INTO`.
    SingleRowReturning,
    /// `INSERT INTO t (cols) SELECT ... FROM (SELECT ... FROM DUAL UNION ALL ...)`.
    UnionSelect,
    /// Anonymous PL/SQL block filling a collection, then `FORALL ... INSERT`.
    ProceduralBlock,
    /// `MERGE INTO t USING (...) s ON (...)`.
    Merge,
}

impl fmt::Display for InsertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleRow => "single_row",
            Self::SingleRowReturning => "single_row_returning",
            Self::UnionSelect => "union_select",
            Self::ProceduralBlock => "procedural_block",
            Self::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// Per-build synthesis state, passed by argument through every clause
/// builder and the placeholder allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisState {
    /// The statement is an insert.
    pub insert: bool,
    /// The insert targets a slice.
    pub batch: bool,
    /// A RETURNING clause takes effect.
    pub returning: bool,
    /// An ON CONFLICT clause is present.
    pub upsert: bool,
    /// Schema ordinal of each insert column, by column position.
    pub columns: Vec<usize>,
    /// Strategy chosen for the insert.
    pub strategy: Option<InsertStrategy>,
    /// Number of placeholders allocated so far.
    pub next_field_index: usize,
}

impl SynthesisState {
    /// Allocates the next value position of the insert matrix.
    ///
    /// Returns `(row, column)` for call `n` as `(n / width, n % width)`,
    /// where `width` is the number of insert columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyFieldSet`] when the insert has no columns.
    pub fn next_position(&mut self, table: &str) -> Result<(usize, usize)> {
        let width = self.columns.len();
        if width == 0 {
            return Err(Error::EmptyFieldSet {
                table: table.to_string(),
            });
        }
        let index = self.next_field_index;
        self.next_field_index += 1;
        Ok((index / width, index % width))
    }
}

/// A statement under construction.
#[derive(Debug, Clone)]
pub struct Statement<'s> {
    schema: &'s Schema,
    shape: Shape,
    clauses: HashMap<&'static str, Clause>,
    sql: String,
    vars: Vec<BindVar>,
}

impl<'s> Statement<'s> {
    /// Creates an empty statement over `schema`.
    #[must_use]
    pub fn new(schema: &'s Schema, shape: Shape) -> Self {
        Self {
            schema,
            shape,
            clauses: HashMap::new(),
            sql: String::with_capacity(180),
            vars: Vec::new(),
        }
    }

    /// Returns the target schema.
    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Returns the target shape.
    #[must_use]
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns whether the target is slice-shaped.
    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(self.shape, Shape::Batch { .. })
    }

    /// Adds a clause, replacing any clause of the same name.
    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.insert(clause.name(), clause);
    }

    /// Adds a clause unless one of the same name is present.
    pub fn add_clause_if_not_exists(&mut self, clause: Clause) {
        self.clauses.entry(clause.name()).or_insert(clause);
    }

    /// Returns the clause registered under `name`.
    #[must_use]
    pub fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.get(name)
    }

    /// Returns whether a clause is registered under `name`.
    #[must_use]
    pub fn has_clause(&self, name: &str) -> bool {
        self.clauses.contains_key(name)
    }

    /// Returns the SQL written so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound variables, in placeholder order.
    #[must_use]
    pub fn vars(&self) -> &[BindVar] {
        &self.vars
    }

    /// Consumes the statement, returning SQL and bound variables.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<BindVar>) {
        (self.sql, self.vars)
    }

    /// Appends raw SQL.
    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Appends one character.
    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Appends an identifier, quoted by the dialect.
    pub fn write_quoted<D: Dialect + ?Sized>(&mut self, dialect: &D, name: &str) {
        let quoted = dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Appends a variable without writing a placeholder.
    pub fn push_var(&mut self, var: BindVar) {
        self.vars.push(var);
    }

    /// Removes the most recently appended variable.
    pub fn pop_var(&mut self) -> Option<BindVar> {
        self.vars.pop()
    }

    /// Returns the most recently appended variable.
    #[must_use]
    pub fn last_var(&self) -> Option<&BindVar> {
        self.vars.last()
    }

    /// Binds a value: appends it, then lets the dialect write the
    /// placeholder (which may take the variable back).
    ///
    /// # Errors
    ///
    /// Forwards the dialect's allocation error.
    pub fn add_var<D: Dialect + ?Sized>(
        &mut self,
        dialect: &D,
        state: &mut SynthesisState,
        var: BindVar,
    ) -> Result<()> {
        self.vars.push(var);
        dialect.bind_var_to(self, state)
    }

    /// Builds the named clauses, in order, separated by single spaces.
    ///
    /// A clause with an entry in the dialect's builder table is written by
    /// that builder, any other by its generic builder. Missing clauses and
    /// builders that write nothing leave no separator behind.
    ///
    /// # Errors
    ///
    /// Returns the first synthesis error; the SQL written so far is kept
    /// for diagnostics.
    pub fn build<D: Dialect>(&mut self, dialect: &D, names: &[&str]) -> Result<()> {
        let mut state = SynthesisState::default();
        for name in names {
            let Some(clause) = self.clauses.remove(*name) else {
                continue;
            };

            let mark = self.sql.len();
            if mark > 0 {
                self.sql.push(' ');
            }
            let start = self.sql.len();

            let result = match dialect.clause_builder(name) {
                Some(builder) => builder(dialect, &clause, self, &mut state),
                None => clause.build(dialect, self, &mut state),
            };
            self.clauses.insert(clause.name(), clause);
            result?;

            if self.sql.len() == start {
                self.sql.truncate(mark);
            }
        }

        debug!(
            table = self.schema.table(),
            dialect = dialect.name(),
            strategy = ?state.strategy,
            vars = self.vars.len(),
            "built statement"
        );
        Ok(())
    }
}
