//! ON CONFLICT as `MERGE`.
//!
//! Oracle has neither `ON CONFLICT` nor `ON DUPLICATE KEY`. The rows are
//! selected from DUAL as the merge source and matched on the conflict
//! columns:
//!
//! ```text
//! MERGE INTO t USING (SELECT :p0_0 AS a,... FROM DUAL UNION ALL ...) s
//!   ON (t.k = s.k)
//!   WHEN MATCHED THEN UPDATE SET t.a = s.a
//!   WHEN NOT MATCHED THEN INSERT (k,a) VALUES (seq.NEXTVAL,s.a)
//! ```

use tracing::debug;

use super::insert::write_dual_rows;
use super::OracleDialect;
use crate::clause::{self, AssignValue, Clause, OnConflict, Values};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::statement::{Statement, SynthesisState};
use crate::value::BindVar;

/// The MERGE is written by the VALUES builder, so the ON CONFLICT clause
/// itself writes nothing.
pub(super) fn build_on_conflict(
    dialect: &OracleDialect,
    clause: &Clause,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    match clause {
        Clause::OnConflict(_) => Ok(()),
        other => other.build(dialect, stmt, state),
    }
}

/// Conflict target: the explicit columns, else the primary keys being
/// inserted, else the first inserted column.
fn conflict_columns(schema: &Schema, on_conflict: &OnConflict, values: &Values) -> Result<Vec<String>> {
    if !on_conflict.columns.is_empty() {
        if let Some(missing) = on_conflict
            .columns
            .iter()
            .find(|c| !values.columns.contains(c))
        {
            return Err(Error::UnknownColumn {
                table: schema.table().to_string(),
                column: missing.clone(),
            });
        }
        return Ok(on_conflict.columns.clone());
    }

    let keys: Vec<String> = schema
        .fields()
        .iter()
        .filter(|f| f.primary_key && values.columns.contains(&f.db_name))
        .map(|f| f.db_name.clone())
        .collect();
    if !keys.is_empty() {
        return Ok(keys);
    }
    values
        .columns
        .first()
        .map(|c| vec![c.clone()])
        .ok_or_else(|| Error::EmptyFieldSet {
            table: schema.table().to_string(),
        })
}

/// Writes the whole `MERGE` for an insert with ON CONFLICT.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] for a conflict column that is not
/// inserted, and forwards placeholder allocation errors.
pub(super) fn merge(
    dialect: &OracleDialect,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
    values: &Values,
    table: &str,
) -> Result<()> {
    let schema = stmt.schema();
    let on_conflict = match stmt.clause(clause::ON_CONFLICT) {
        Some(Clause::OnConflict(on_conflict)) => on_conflict.clone(),
        _ => OnConflict::default(),
    };
    let keys = conflict_columns(schema, &on_conflict, values)?;
    let quote = |name: &str| dialect.quote_identifier(name);

    stmt.write_str(&format!("MERGE INTO {} t USING (", quote(table)));
    write_dual_rows(dialect, stmt, state, values)?;
    stmt.write_str(") s ON (");
    let on: Vec<String> = keys
        .iter()
        .map(|k| format!("t.{0} = s.{0}", quote(k)))
        .collect();
    stmt.write_str(&on.join(" AND "));
    stmt.write_char(')');

    let mut updates = Vec::new();
    if on_conflict.do_nothing {
        // keep existing rows untouched
    } else if on_conflict.update_all {
        for column in &values.columns {
            let sequenced = schema
                .lookup(column)
                .is_some_and(|(_, f)| f.sequence_name().is_some());
            if !keys.contains(column) && !sequenced {
                updates.push(format!("t.{0} = s.{0}", quote(column)));
            }
        }
    } else {
        let mut bound = 0;
        for assignment in &on_conflict.do_updates {
            if keys.contains(&assignment.column) {
                debug!(
                    table,
                    column = assignment.column.as_str(),
                    "skipping update of conflict column"
                );
                continue;
            }
            let target = quote(&assignment.column);
            match &assignment.value {
                AssignValue::Excluded(column) => {
                    updates.push(format!("t.{target} = s.{}", quote(column)));
                }
                AssignValue::Value(value) => {
                    updates.push(format!("t.{target} = :u{bound}"));
                    stmt.push_var(BindVar::In(value.clone()));
                    bound += 1;
                }
            }
        }
    }
    if !updates.is_empty() {
        stmt.write_str(" WHEN MATCHED THEN UPDATE SET ");
        stmt.write_str(&updates.join(","));
    }

    let mut inserted = Vec::with_capacity(values.columns.len());
    let mut sources = Vec::with_capacity(values.columns.len());
    for &ordinal in &state.columns {
        let Some(field) = schema.field(ordinal) else {
            continue;
        };
        let name = quote(&field.db_name);
        sources.push(match field.sequence_name() {
            Some(sequence) => format!("{sequence}.NEXTVAL"),
            None => format!("s.{name}"),
        });
        inserted.push(name);
    }
    stmt.write_str(&format!(
        " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
        inserted.join(","),
        sources.join(",")
    ));
    Ok(())
}
