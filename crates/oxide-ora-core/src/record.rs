//! Schema-driven field access on records.
//!
//! Generated values (sequence keys, `RETURNING ... INTO` outputs, last
//! insert ids) are written back through [`Record::set_value`], addressed by
//! the field ordinal of the record's [`Schema`].

use crate::error::Result;
use crate::schema::Schema;
use crate::value::SqlValue;

/// A row type mapped to a table.
///
/// Usually implemented with `#[derive(Record)]`.
pub trait Record {
    /// Returns the table metadata, built once per type.
    fn schema() -> &'static Schema
    where
        Self: Sized;

    /// Returns the current value of the field at `ordinal`.
    ///
    /// Unknown ordinals read as [`SqlValue::Null`].
    fn value_of(&self, ordinal: usize) -> SqlValue;

    /// Stores `value` into the field at `ordinal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ordinal is unknown or the value does not
    /// convert into the field's Rust type.
    fn set_value(&mut self, ordinal: usize, value: SqlValue) -> Result<()>;
}

/// A slice-shaped insert or query target.
///
/// Elements may be absent (`Option<R>` slices); an absent element holds no
/// record and is skipped when building rows and when propagating keys.
pub trait RecordSlice {
    /// The record type of the elements.
    type Row: Record;

    /// Returns the number of elements, absent ones included.
    fn row_count(&self) -> usize;

    /// Returns the record at `index`, or `None` if absent or out of bounds.
    fn row(&self, index: usize) -> Option<&Self::Row>;

    /// Returns the record at `index` mutably.
    fn row_mut(&mut self, index: usize) -> Option<&mut Self::Row>;

    /// Appends a record, used when hydrating query results.
    ///
    /// Fixed-size targets ignore the record and return `false`.
    fn push_row(&mut self, row: Self::Row) -> bool;
}

impl<R: Record> RecordSlice for [R] {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&R> {
        self.get(index)
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        self.get_mut(index)
    }

    fn push_row(&mut self, _row: R) -> bool {
        false
    }
}

impl<R: Record> RecordSlice for Vec<R> {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&R> {
        self.get(index)
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        self.get_mut(index)
    }

    fn push_row(&mut self, row: R) -> bool {
        self.push(row);
        true
    }
}

impl<R: Record> RecordSlice for [Option<R>] {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&R> {
        self.get(index).and_then(Option::as_ref)
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        self.get_mut(index).and_then(Option::as_mut)
    }

    fn push_row(&mut self, _row: R) -> bool {
        false
    }
}

impl<R: Record> RecordSlice for Vec<Option<R>> {
    type Row = R;

    fn row_count(&self) -> usize {
        self.len()
    }

    fn row(&self, index: usize) -> Option<&R> {
        self.get(index).and_then(Option::as_ref)
    }

    fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        self.get_mut(index).and_then(Option::as_mut)
    }

    fn push_row(&mut self, row: R) -> bool {
        self.push(Some(row));
        true
    }
}

/// The destination of a create or find call: one record or a slice of them.
pub enum Target<'a, R: Record> {
    /// A single record.
    Single(&'a mut R),
    /// A slice of records.
    Batch(&'a mut dyn RecordSlice<Row = R>),
}

impl<R: Record> Target<'_, R> {
    /// Returns whether the target is slice-shaped.
    #[must_use]
    pub const fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Returns the number of elements (1 for a single record).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(rows) => rows.row_count(),
        }
    }

    /// Returns whether the target holds no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the record at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&R> {
        match self {
            Self::Single(record) => (index == 0).then_some(&**record),
            Self::Batch(rows) => rows.row(index),
        }
    }

    /// Returns the record at `index` mutably.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut R> {
        match self {
            Self::Single(record) => (index == 0).then_some(&mut **record),
            Self::Batch(rows) => rows.row_mut(index),
        }
    }
}
