//! Sequence column resolution.
//!
//! Every sequence-backed field ends up in the insert's column list, so the
//! placeholder allocator can render it as `seq.NEXTVAL` (or read the
//! generated value back in a procedural block).

use crate::clause::Values;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::statement::{InsertStrategy, SynthesisState};
use crate::value::{BindVar, OutSlot, SqlValue};

/// Injects or overwrites the cells of sequence-backed fields, then records
/// the schema ordinal of every column in `state.columns`.
///
/// A missing sequence column is inserted at its field ordinal (clamped to
/// the column count). Its cells become output destinations when a batch
/// hands generated keys back, and NULL placeholders otherwise. A MERGE
/// keeps explicit key values so existing rows can be matched.
///
/// # Errors
///
/// Returns [`Error::UnknownColumn`] for a column that is not a field and
/// [`Error::EmptyFieldSet`] when no column remains.
pub(super) fn resolve_sequence_columns(
    schema: &Schema,
    state: &mut SynthesisState,
    values: &mut Values,
) -> Result<()> {
    let outputs = state.batch && state.returning;
    let merge = state.strategy == Some(InsertStrategy::Merge);

    for (ordinal, field) in schema.fields().iter().enumerate() {
        if field.sequence_name().is_none() {
            continue;
        }

        let cell = |row: usize| {
            if outputs {
                BindVar::Out(OutSlot {
                    row: values.origin(row),
                    field: ordinal,
                })
            } else {
                BindVar::In(SqlValue::Null)
            }
        };
        let cells: Vec<BindVar> = (0..values.rows.len()).map(cell).collect();

        match values.columns.iter().position(|c| *c == field.db_name) {
            Some(_) if merge => {}
            Some(position) => {
                for (row, value) in values.rows.iter_mut().zip(cells) {
                    if let Some(slot) = row.get_mut(position) {
                        *slot = value;
                    }
                }
            }
            None => {
                let at = ordinal.min(values.columns.len());
                values.columns.insert(at, field.db_name.clone());
                for (row, value) in values.rows.iter_mut().zip(cells) {
                    let at = at.min(row.len());
                    row.insert(at, value);
                }
            }
        }
    }

    state.columns = values
        .columns
        .iter()
        .map(|column| {
            schema
                .lookup(column)
                .map(|(ordinal, _)| ordinal)
                .ok_or_else(|| Error::UnknownColumn {
                    table: schema.table().to_string(),
                    column: column.clone(),
                })
        })
        .collect::<Result<_>>()?;

    if state.columns.is_empty() {
        return Err(Error::EmptyFieldSet {
            table: schema.table().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataType, Field};

    fn schema() -> Schema {
        Schema::new(
            "orders",
            vec![
                Field::new("note", DataType::String),
                Field::new("order_id", DataType::Int)
                    .primary_key()
                    .sequence("orders_s"),
                Field::new("amount", DataType::Float),
                Field::new("line_no", DataType::Int).sequence("lines_s"),
            ],
        )
    }

    fn text(s: &str) -> BindVar {
        BindVar::In(SqlValue::Text(s.to_string()))
    }

    #[test]
    fn test_absent_sequence_columns_are_inserted_at_ordinal() {
        let schema = schema();
        let mut state = SynthesisState::default();
        let mut values = Values::new(
            vec!["note".into(), "amount".into()],
            vec![vec![text("a"), BindVar::In(SqlValue::Float(1.5))]],
        );
        resolve_sequence_columns(&schema, &mut state, &mut values).unwrap();

        assert_eq!(values.columns, ["note", "order_id", "amount", "line_no"]);
        assert_eq!(values.rows[0][1], BindVar::In(SqlValue::Null));
        assert_eq!(values.rows[0][3], BindVar::In(SqlValue::Null));
        assert_eq!(state.columns, [0, 1, 2, 3]);
    }

    #[test]
    fn test_column_list_grows_by_one_per_missing_sequence() {
        let schema = schema();
        let mut state = SynthesisState::default();
        let mut values = Values::new(
            vec!["note".into(), "line_no".into()],
            vec![vec![text("a"), BindVar::In(SqlValue::Int(3))]],
        );
        resolve_sequence_columns(&schema, &mut state, &mut values).unwrap();
        assert_eq!(values.columns, ["note", "order_id", "line_no"]);
        assert_eq!(values.rows[0].len(), 3);
        // present sequence columns are overwritten
        assert_eq!(values.rows[0][2], BindVar::In(SqlValue::Null));
    }

    #[test]
    fn test_batch_returning_cells_are_output_slots() {
        let schema = schema();
        let mut state = SynthesisState {
            batch: true,
            returning: true,
            ..SynthesisState::default()
        };
        let mut values = Values {
            columns: vec!["note".into()],
            rows: vec![vec![text("a")], vec![text("b")]],
            origins: vec![0, 3],
        };
        resolve_sequence_columns(&schema, &mut state, &mut values).unwrap();

        assert_eq!(
            values.rows[1][1],
            BindVar::Out(OutSlot { row: 3, field: 1 })
        );
        assert_eq!(
            values.rows[0][2],
            BindVar::Out(OutSlot { row: 0, field: 3 })
        );
    }

    #[test]
    fn test_merge_keeps_explicit_keys() {
        let schema = schema();
        let mut state = SynthesisState {
            strategy: Some(InsertStrategy::Merge),
            ..SynthesisState::default()
        };
        let mut values = Values::new(
            vec!["order_id".into(), "note".into()],
            vec![vec![BindVar::In(SqlValue::Int(7)), text("a")]],
        );
        resolve_sequence_columns(&schema, &mut state, &mut values).unwrap();
        assert_eq!(values.rows[0][0], BindVar::In(SqlValue::Int(7)));
        assert_eq!(values.columns, ["order_id", "note", "line_no"]);
        assert_eq!(state.columns, [1, 0, 3]);
    }

    #[test]
    fn test_unknown_column() {
        let schema = schema();
        let mut state = SynthesisState::default();
        let mut values = Values::new(vec!["bogus".into()], vec![vec![text("x")]]);
        assert!(matches!(
            resolve_sequence_columns(&schema, &mut state, &mut values),
            Err(Error::UnknownColumn { column, .. }) if column == "bogus"
        ));
    }

    #[test]
    fn test_empty_field_set() {
        let schema = Schema::new("empty", vec![]);
        let mut state = SynthesisState::default();
        let mut values = Values::new(vec![], vec![vec![]]);
        assert!(matches!(
            resolve_sequence_columns(&schema, &mut state, &mut values),
            Err(Error::EmptyFieldSet { .. })
        ));
    }
}
