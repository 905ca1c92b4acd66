//! SQL values and bound variables.
//!
//! Values never reach the SQL text: every cell of an insert is either bound
//! as an input parameter or registered as an output destination.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};

/// A SQL value that can be bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: only meant for logging. Statements always bind values.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("HEXTORAW('{hex}')")
            }
            Self::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    /// Returns whether this is the zero value of its kind.
    ///
    /// A record field holding its zero value is treated as "not set", which
    /// is what lets generated keys be written into it.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Text(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
            Self::Timestamp(ts) => *ts == NaiveDateTime::default(),
        }
    }

    /// Short name of the value kind, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

/// Where the driver writes a value produced by the server.
///
/// `row` is the index of the record inside the insert target (always 0 for
/// a single record) and `field` the ordinal of the schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutSlot {
    /// Record index within the target.
    pub row: usize,
    /// Field ordinal within the schema.
    pub field: usize,
}

/// A variable bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindVar {
    /// A value read by the server.
    In(SqlValue),
    /// A destination written by the server (`RETURNING ... INTO`, PL/SQL OUT).
    Out(OutSlot),
}

impl BindVar {
    /// Returns the output slot, if this is an output destination.
    #[must_use]
    pub const fn out_slot(&self) -> Option<OutSlot> {
        match self {
            Self::Out(slot) => Some(*slot),
            Self::In(_) => None,
        }
    }
}

impl From<SqlValue> for BindVar {
    fn from(value: SqlValue) -> Self {
        Self::In(value)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

/// Trait for types that can be read back from SQL values.
pub trait FromSqlValue: Sized {
    /// Converts a `SqlValue` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueConversion`] when the value kind does not fit.
    fn from_sql_value(value: SqlValue) -> Result<Self>;
}

fn mismatch<T>(expected: &'static str, value: &SqlValue) -> Result<T> {
    Err(Error::ValueConversion {
        expected,
        found: value.kind(),
    })
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        Ok(value)
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            // NUMBER(1) columns come back as integers
            SqlValue::Int(n) => Ok(n != 0),
            other => mismatch("bool", &other),
        }
    }
}

macro_rules! impl_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }

            impl FromSqlValue for $ty {
                fn from_sql_value(value: SqlValue) -> Result<Self> {
                    match value {
                        SqlValue::Int(n) => <$ty>::try_from(n).map_err(|_| Error::ValueConversion {
                            expected: stringify!($ty),
                            found: "out of range integer",
                        }),
                        SqlValue::Text(ref s) => match s.trim().parse::<$ty>() {
                            Ok(n) => Ok(n),
                            Err(_) => mismatch(stringify!($ty), &value),
                        },
                        other => mismatch(stringify!($ty), &other),
                    }
                }
            }
        )+
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for u64 {
    fn to_sql_value(self) -> SqlValue {
        // Oracle NUMBER holds the full range; the bound parameter does not
        SqlValue::Int(i64::try_from(self).unwrap_or(i64::MAX))
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Int(n) => Self::try_from(n).map_err(|_| Error::ValueConversion {
                expected: "u64",
                found: "negative integer",
            }),
            other => mismatch("u64", &other),
        }
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Float(f) => Ok(f),
            #[allow(clippy::cast_precision_loss)]
            SqlValue::Int(n) => Ok(n as Self),
            other => mismatch("f64", &other),
        }
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl FromSqlValue for f32 {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        #[allow(clippy::cast_possible_truncation)]
        f64::from_sql_value(value).map(|f| f as Self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Text(s) => Ok(s),
            // Oracle stores '' as NULL
            SqlValue::Null => Ok(Self::new()),
            SqlValue::Int(n) => Ok(n.to_string()),
            other => mismatch("String", &other),
        }
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            other => mismatch("NaiveDateTime", &other),
        }
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Null => Ok(Self::new()),
            other => mismatch("Vec<u8>", &other),
        }
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}
