//! Placeholder allocation.

use super::OracleDialect;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::statement::{InsertStrategy, Statement, SynthesisState};
use crate::value::{BindVar, SqlValue};

/// Writes the placeholder for the variable just appended to `stmt`.
///
/// Outside an insert, placeholders are numbered by variable count
/// (`:p1`, `:p2`, ...). Inside an insert, call `n` addresses row
/// `n / width` and column `n % width` of the resolved column list:
///
/// | column   | strategy                 | written             | variable |
/// |----------|--------------------------|---------------------|----------|
/// | sequence | single row               | `seq.NEXTVAL`       | dropped  |
/// | sequence | union select             | `NULL`              | dropped  |
/// | sequence | merge, no explicit value | `NULL AS col`       | dropped  |
/// | plain    | union select, merge      | `:pR_F AS col`      | kept     |
/// | any      | otherwise                | `:pR_F`             | kept     |
pub(super) fn bind_var_to(
    dialect: &OracleDialect,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    if !state.insert {
        let placeholder = format!(":p{}", stmt.vars().len());
        stmt.write_str(&placeholder);
        return Ok(());
    }

    let schema = stmt.schema();
    let (row, position) = state.next_position(schema.table())?;
    let field = state
        .columns
        .get(position)
        .and_then(|&ordinal| schema.field(ordinal))
        .ok_or_else(|| Error::EmptyFieldSet {
            table: schema.table().to_string(),
        })?;
    let placeholder = format!(":p{row}_{position}");
    let alias = dialect.quote_identifier(&field.db_name);
    let strategy = state.strategy.unwrap_or(InsertStrategy::SingleRow);

    let text = match (field.sequence_name(), strategy) {
        (Some(sequence), InsertStrategy::SingleRow | InsertStrategy::SingleRowReturning) => {
            stmt.pop_var();
            format!("{sequence}.NEXTVAL")
        }
        (Some(_), InsertStrategy::UnionSelect) => {
            stmt.pop_var();
            String::from("NULL")
        }
        (Some(_), InsertStrategy::Merge)
            if matches!(stmt.last_var(), Some(BindVar::In(SqlValue::Null))) =>
        {
            stmt.pop_var();
            format!("NULL AS {alias}")
        }
        (_, InsertStrategy::UnionSelect | InsertStrategy::Merge) => {
            format!("{placeholder} AS {alias}")
        }
        (_, InsertStrategy::SingleRow | InsertStrategy::SingleRowReturning | InsertStrategy::ProceduralBlock) => {
            placeholder
        }
    };
    stmt.write_str(&text);
    Ok(())
}
