//! INSERT and VALUES synthesis.
//!
//! The strategy is picked once per statement, from whether the target is a
//! slice, whether RETURNING takes effect and whether ON CONFLICT is present:
//!
//! - single row: `INSERT INTO t (cols) VALUES (...)`, plus `RETURNING ...
//!   INTO` when generated values must come back
//! - batch: `INSERT INTO t (cols) SELECT ... FROM (SELECT ... FROM DUAL
//!   UNION ALL ...)`
//! - batch with RETURNING: an anonymous block filling a `%ROWTYPE`
//!   collection, reading each sequence value back through an OUT bind
//! - ON CONFLICT: a `MERGE`, see [`super::upsert`]

use tracing::debug;

use super::returning::returning_fields;
use super::sequence::resolve_sequence_columns;
use super::{upsert, OracleDialect};
use crate::clause::{self, Clause, Values};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::statement::{InsertStrategy, Statement, SynthesisState};

/// Picks the insert strategy and records it in `state`; later calls return
/// the recorded one.
///
/// # Errors
///
/// Rejects RETURNING combined with ON CONFLICT, and batch RETURNING that
/// the procedural block cannot serve (RETURNING disabled, or a column that
/// is not sequence-generated).
pub(super) fn plan(
    dialect: &OracleDialect,
    stmt: &Statement<'_>,
    state: &mut SynthesisState,
) -> Result<InsertStrategy> {
    if let Some(strategy) = state.strategy {
        return Ok(strategy);
    }

    let schema = stmt.schema();
    let table = schema.table();
    state.insert = true;
    state.batch = stmt.is_batch();
    state.upsert = stmt.has_clause(clause::ON_CONFLICT);

    if let Some(Clause::Returning(returning)) = stmt.clause(clause::RETURNING) {
        if state.upsert {
            return Err(Error::UnsupportedUpsertReturning {
                table: table.to_string(),
            });
        }

        let requested = returning_fields(schema, returning)?;
        if state.batch {
            if !dialect.config().support_returning {
                let column = requested
                    .first()
                    .map_or_else(|| String::from("*"), |(_, f)| f.db_name.clone());
                return Err(Error::UnsupportedBatchReturning {
                    table: table.to_string(),
                    column,
                    reason: "RETURNING is disabled for this connection",
                });
            }
            if !returning.is_wildcard() {
                if let Some((_, field)) = requested.iter().find(|(_, f)| f.sequence.is_none()) {
                    return Err(Error::UnsupportedBatchReturning {
                        table: table.to_string(),
                        column: field.db_name.clone(),
                        reason: "only sequence-generated columns come back from a batch insert",
                    });
                }
            }
            state.returning = requested.iter().any(|(_, f)| f.sequence.is_some());
        } else {
            state.returning = dialect.config().support_returning && !requested.is_empty();
        }
    }

    let strategy = match (state.upsert, state.batch, state.returning) {
        (true, _, _) => InsertStrategy::Merge,
        (false, false, false) => InsertStrategy::SingleRow,
        (false, false, true) => InsertStrategy::SingleRowReturning,
        (false, true, false) => InsertStrategy::UnionSelect,
        (false, true, true) => InsertStrategy::ProceduralBlock,
    };
    state.strategy = Some(strategy);
    debug!(table, %strategy, "selected insert strategy");
    Ok(strategy)
}

/// Table named by the INSERT clause, or the schema's.
fn insert_table(stmt: &Statement<'_>) -> String {
    match stmt.clause(clause::INSERT) {
        Some(Clause::Insert(insert)) => insert.table.clone(),
        _ => None,
    }
    .unwrap_or_else(|| stmt.schema().table().to_string())
}

/// Writes `INSERT INTO t`, or nothing when the VALUES builder writes a
/// whole block or MERGE.
pub(super) fn build_insert(
    dialect: &OracleDialect,
    clause: &Clause,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    let Clause::Insert(insert) = clause else {
        return clause.build(dialect, stmt, state);
    };
    match plan(dialect, stmt, state)? {
        InsertStrategy::ProceduralBlock | InsertStrategy::Merge => {}
        InsertStrategy::SingleRow
        | InsertStrategy::SingleRowReturning
        | InsertStrategy::UnionSelect => insert.build(dialect, stmt),
    }
    Ok(())
}

/// Resolves sequence columns and writes the values in the planned shape.
pub(super) fn build_values(
    dialect: &OracleDialect,
    clause: &Clause,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    let Clause::Values(values) = clause else {
        return clause.build(dialect, stmt, state);
    };
    let strategy = plan(dialect, stmt, state)?;
    if values.rows.is_empty() {
        return Err(Error::EmptyRows {
            table: stmt.schema().table().to_string(),
        });
    }

    let mut values = values.clone();
    resolve_sequence_columns(stmt.schema(), state, &mut values)?;

    match strategy {
        InsertStrategy::SingleRow | InsertStrategy::SingleRowReturning => {
            values.build(dialect, stmt, state)
        }
        InsertStrategy::UnionSelect => union_select(dialect, stmt, state, &values),
        InsertStrategy::ProceduralBlock => procedural_block(dialect, stmt, state, &values),
        InsertStrategy::Merge => {
            let table = insert_table(stmt);
            upsert::merge(dialect, stmt, state, &values, &table)
        }
    }
}

/// Writes each row as `SELECT ... FROM DUAL`, joined by `UNION ALL`.
///
/// Shared with the MERGE source, which needs every column aliased.
pub(super) fn write_dual_rows(
    dialect: &OracleDialect,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
    values: &Values,
) -> Result<()> {
    for (i, row) in values.rows.iter().enumerate() {
        if i > 0 {
            stmt.write_str(" UNION ALL ");
        }
        stmt.write_str("SELECT ");
        for (j, cell) in row.iter().enumerate() {
            if j > 0 {
                stmt.write_char(',');
            }
            stmt.add_var(dialect, state, cell.clone())?;
        }
        stmt.write_str(" FROM DUAL");
    }
    Ok(())
}

fn union_select(
    dialect: &OracleDialect,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
    values: &Values,
) -> Result<()> {
    let schema = stmt.schema();
    let mut columns = Vec::with_capacity(values.columns.len());
    let mut projection = Vec::with_capacity(values.columns.len());
    for &ordinal in &state.columns {
        let Some(field) = schema.field(ordinal) else {
            continue;
        };
        let name = dialect.quote_identifier(&field.db_name);
        projection.push(match field.sequence_name() {
            Some(sequence) => format!("{sequence}.NEXTVAL"),
            None => name.clone(),
        });
        columns.push(name);
    }

    stmt.write_str(&format!(
        "({}) SELECT {} FROM (",
        columns.join(","),
        projection.join(",")
    ));
    write_dual_rows(dialect, stmt, state, values)?;
    stmt.write_char(')');
    Ok(())
}

fn procedural_block(
    dialect: &OracleDialect,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
    values: &Values,
) -> Result<()> {
    let schema = stmt.schema();
    let table = dialect.quote_identifier(&insert_table(stmt));

    stmt.write_str("DECLARE\n");
    stmt.write_str(&format!("\tTYPE t IS TABLE OF {table}%ROWTYPE;\n"));
    stmt.write_str("\tr t := t();\n");
    stmt.write_str("BEGIN\n");
    for row in &values.rows {
        stmt.write_str("\tr.extend;\n");
        for cell in row {
            let (row_index, position) = state.next_position(schema.table())?;
            let Some(field) = state.columns.get(position).and_then(|&o| schema.field(o)) else {
                continue;
            };
            let column = dialect.quote_identifier(&field.db_name);
            let placeholder = format!(":p{row_index}_{position}");
            match field.sequence_name() {
                Some(sequence) => {
                    stmt.write_str(&format!("\tr(r.last).{column} := {sequence}.NEXTVAL;\n"));
                    stmt.write_str(&format!("\t{placeholder} := r(r.last).{column};\n"));
                }
                None => {
                    stmt.write_str(&format!("\tr(r.last).{column} := {placeholder};\n"));
                }
            }
            stmt.push_var(cell.clone());
        }
    }
    stmt.write_str("\tFORALL i IN r.first .. r.last\n");
    stmt.write_str(&format!("\t\tINSERT INTO {table} VALUES r (i);\n"));
    stmt.write_str("\tCOMMIT;\n");
    stmt.write_str("END;");
    Ok(())
}
