//! `RETURNING ... INTO` output binding.

use super::OracleDialect;
use crate::clause::{Clause, Returning};
use crate::error::{Error, Result};
use crate::schema::{Field, Schema};
use crate::statement::{InsertStrategy, Statement, SynthesisState};
use crate::value::{BindVar, OutSlot};

/// Resolves the requested columns to `(ordinal, field)` pairs.
///
/// A wildcard request expands to the fields with a default DB value.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] for a name that is not a field.
pub(super) fn returning_fields<'s>(
    schema: &'s Schema,
    returning: &Returning,
) -> Result<Vec<(usize, &'s Field)>> {
    if returning.is_wildcard() {
        return Ok(schema.fields_with_default_db_value().collect());
    }
    returning
        .columns
        .iter()
        .map(|column| {
            schema.lookup(column).ok_or_else(|| Error::UnknownColumn {
                table: schema.table().to_string(),
                column: column.clone(),
            })
        })
        .collect()
}

/// Writes `RETURNING a,b INTO :o{ordinal},...` for a single-row insert and
/// registers one output destination per column, in column order.
///
/// Batch inserts hand keys back from their procedural block instead, so
/// nothing is written for them.
pub(super) fn build_returning(
    dialect: &OracleDialect,
    clause: &Clause,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    let Clause::Returning(returning) = clause else {
        return clause.build(dialect, stmt, state);
    };
    if state.strategy != Some(InsertStrategy::SingleRowReturning) {
        return Ok(());
    }

    let fields = returning_fields(stmt.schema(), returning)?;
    if fields.is_empty() {
        return Ok(());
    }

    stmt.write_str("RETURNING ");
    for (i, (_, field)) in fields.iter().enumerate() {
        if i > 0 {
            stmt.write_char(',');
        }
        stmt.write_quoted(dialect, &field.db_name);
    }
    stmt.write_str(" INTO ");
    for (i, (ordinal, _)) in fields.iter().enumerate() {
        if i > 0 {
            stmt.write_char(',');
        }
        stmt.write_str(&format!(":o{ordinal}"));
        stmt.push_var(BindVar::Out(OutSlot {
            row: 0,
            field: *ordinal,
        }));
    }
    Ok(())
}
