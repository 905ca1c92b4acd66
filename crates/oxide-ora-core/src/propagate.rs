//! Writing generated keys back into records after an insert.
//!
//! Two paths exist. When the statement bound output destinations
//! (`RETURNING ... INTO` or a procedural block), the values the driver
//! hands back are stored through [`write_back_outputs`]. Otherwise the
//! single last-insert id reported by the driver is spread over the target
//! by [`propagate_last_insert_id`].

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{Record, Target};
use crate::value::{BindVar, SqlValue};

/// `None` for an absent element.
fn key_is_zero<R: Record>(target: &Target<'_, R>, index: usize, ordinal: usize) -> Option<bool> {
    target
        .row(index)
        .map(|record| record.value_of(ordinal).is_zero())
}

/// `id + offset * increment`, or `None` past `i64::MAX`.
fn key_at(id: i64, offset: usize, increment: i64) -> Option<i64> {
    i64::try_from(offset)
        .ok()
        .and_then(|offset| offset.checked_mul(increment))
        .and_then(|step| id.checked_add(step))
}

/// Assigns `id`, `id + inc`, `id + 2 * inc`, ... to every element of the
/// target whose prioritized primary key is still zero.
///
/// Elements are visited from the first one, or from the last one when
/// `reversed` is set; the walk stops at the first absent element. In
/// reverse the base is raised so the same ids are handed out, the largest
/// one going to the last element. Keys that already hold a value are never
/// overwritten, and keys past `i64::MAX` are left unassigned. Returns the
/// number of keys assigned.
///
/// # Errors
///
/// Forwards the record's conversion error for the key field.
pub fn propagate_last_insert_id<R: Record>(
    target: &mut Target<'_, R>,
    id: i64,
    reversed: bool,
) -> Result<usize> {
    let schema = R::schema();
    let Some(ordinal) = schema.prioritized_primary_ordinal() else {
        return Ok(0);
    };
    let increment = schema
        .prioritized_primary_field()
        .map_or(1, |f| f.auto_increment_increment.max(1));

    if !target.is_batch() {
        if key_is_zero(target, 0, ordinal) == Some(true) {
            if let Some(record) = target.row_mut(0) {
                record.set_value(ordinal, SqlValue::Int(id))?;
                return Ok(1);
            }
        }
        return Ok(0);
    }

    let order: Vec<usize> = if reversed {
        (0..target.len()).rev().collect()
    } else {
        (0..target.len()).collect()
    };

    let mut pending = Vec::new();
    for i in order {
        match key_is_zero(target, i, ordinal) {
            None => break,
            Some(true) => pending.push(i),
            Some(false) => {}
        }
    }

    let count = pending.len();
    let mut assigned = 0;
    for (position, &i) in pending.iter().enumerate() {
        let offset = if reversed {
            count - 1 - position
        } else {
            position
        };
        let Some(key) = key_at(id, offset, increment) else {
            warn!(table = schema.table(), id, offset, "generated key out of range");
            continue;
        };
        if let Some(record) = target.row_mut(i) {
            record.set_value(ordinal, SqlValue::Int(key))?;
            assigned += 1;
        }
    }

    debug!(
        table = schema.table(),
        id,
        reversed,
        assigned,
        "propagated last insert id"
    );
    Ok(assigned)
}

/// Stores the values returned for the statement's output destinations,
/// in the order the destinations were bound.
///
/// Destinations addressing an absent element are skipped. Returns the
/// number of values stored.
///
/// # Errors
///
/// Returns [`Error::OutputMismatch`] when the driver returned a different
/// number of values than destinations were bound, and forwards record
/// conversion errors.
pub fn write_back_outputs<R: Record>(
    target: &mut Target<'_, R>,
    vars: &[BindVar],
    outputs: Vec<SqlValue>,
) -> Result<usize> {
    let slots: Vec<_> = vars.iter().filter_map(BindVar::out_slot).collect();
    if slots.len() != outputs.len() {
        return Err(Error::OutputMismatch {
            expected: slots.len(),
            returned: outputs.len(),
        });
    }

    let mut written = 0;
    for (slot, value) in slots.into_iter().zip(outputs) {
        if let Some(record) = target.row_mut(slot.row) {
            record.set_value(slot.field, value)?;
            written += 1;
        }
    }
    Ok(written)
}
