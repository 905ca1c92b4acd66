//! Row limiting.

use super::OracleDialect;
use crate::clause::{self, Clause};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::statement::{Statement, SynthesisState};

/// Writes `[ORDER BY ...] OFFSET n ROWS FETCH NEXT m ROWS ONLY`.
///
/// Oracle only accepts OFFSET/FETCH after an ORDER BY, so one is supplied
/// when the query has none: the primary key when known, a constant
/// otherwise. Without OFFSET/FETCH support the generic `LIMIT` is written.
pub(super) fn build_limit(
    dialect: &OracleDialect,
    clause: &Clause,
    stmt: &mut Statement<'_>,
    state: &mut SynthesisState,
) -> Result<()> {
    let Clause::Limit(limit) = clause else {
        return clause.build(dialect, stmt, state);
    };
    if !dialect.config().support_offset_fetch {
        limit.build(stmt);
        return Ok(());
    }

    let offset = limit.offset.max(0);
    let fetch = limit.limit.filter(|&n| n > 0);
    if offset == 0 && fetch.is_none() {
        return Ok(());
    }

    let mut parts = Vec::with_capacity(3);
    let ordered = matches!(
        stmt.clause(clause::ORDER_BY),
        Some(Clause::OrderBy(order)) if !order.columns.is_empty()
    );
    if !ordered {
        parts.push(match stmt.schema().prioritized_primary_field() {
            Some(field) => format!("ORDER BY {}", dialect.quote_identifier(&field.db_name)),
            None => String::from("ORDER BY (SELECT NULL FROM DUAL)"),
        });
    }
    if offset > 0 {
        parts.push(format!("OFFSET {offset} ROWS"));
    }
    if let Some(fetch) = fetch {
        parts.push(format!("FETCH NEXT {fetch} ROWS ONLY"));
    }
    stmt.write_str(&parts.join(" "));
    Ok(())
}
