//! SQL Dialect support.
//!
//! A dialect decides how identifiers are quoted, how placeholders are
//! written and which clauses it builds itself instead of the generic,
//! MySQL-shaped builders of [`crate::clause`].

mod explain;
mod generic;
pub mod oracle;

pub use explain::explain_sql;
pub use generic::GenericDialect;
pub use oracle::{DialectConfig, OracleDialect};

use crate::clause::Clause;
use crate::error::Result;
use crate::schema::Field;
use crate::statement::{Statement, SynthesisState};
use crate::value::BindVar;

/// A dialect-specific clause builder.
pub type ClauseBuilder<D> =
    fn(&D, &Clause, &mut Statement<'_>, &mut SynthesisState) -> Result<()>;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns whether the dialect hands generated values back through
    /// RETURNING.
    fn supports_returning(&self) -> bool {
        false
    }

    /// Quotes an identifier, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Writes the placeholder for the variable just appended to `stmt`.
    ///
    /// The dialect may take the variable back when the position is filled
    /// by a server-side expression instead.
    ///
    /// # Errors
    ///
    /// Returns an error if no placeholder can be allocated.
    fn bind_var_to(&self, stmt: &mut Statement<'_>, _state: &mut SynthesisState) -> Result<()> {
        stmt.write_char('?');
        Ok(())
    }

    /// Returns the dialect's builder for the clause named `name`.
    fn clause_builder(&self, _name: &str) -> Option<ClauseBuilder<Self>>
    where
        Self: Sized,
    {
        None
    }

    /// Maps a field to a column type.
    fn data_type_of(&self, field: &Field) -> String;

    /// Returns the expression written for a field left to its default.
    fn default_value_of(&self, _field: &Field) -> String {
        String::from("DEFAULT")
    }

    /// Renders SQL with its bound values inlined, for logging.
    fn explain(&self, sql: &str, vars: &[BindVar]) -> String {
        explain_sql(sql, vars)
    }
}
