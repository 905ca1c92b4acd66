//! Schema metadata for records.
//!
//! A [`Schema`] is produced once per record type (usually by
//! `#[derive(Record)]`) and shared read-only by every statement built for
//! that type.

use serde::Deserialize;

/// Abstract column type, before dialect mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Boolean.
    Bool,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// Floating point or decimal.
    Float,
    /// Character data.
    String,
    /// Date and time.
    Time,
    /// Binary data.
    Bytes,
    /// A type spelled out verbatim by the model.
    Custom(String),
}

impl DataType {
    /// Default size in bits (numbers) or characters (strings) when the model
    /// gives none.
    #[must_use]
    pub const fn default_size(&self) -> u32 {
        match self {
            Self::Int | Self::Uint | Self::Float => 64,
            _ => 0,
        }
    }
}

fn default_increment() -> i64 {
    1
}

/// A field of a record: one column of its table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Rust field name.
    pub name: String,
    /// Column name.
    pub db_name: String,
    /// Abstract type.
    pub data_type: DataType,
    /// Size hint: bits for numbers, characters for strings.
    #[serde(default)]
    pub size: u32,
    /// Decimal precision.
    #[serde(default)]
    pub precision: u32,
    /// Decimal scale.
    #[serde(default)]
    pub scale: u32,
    /// Member of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Generated by the server (identity or sequence).
    #[serde(default)]
    pub auto_increment: bool,
    /// Step between consecutive generated keys.
    #[serde(default = "default_increment")]
    pub auto_increment_increment: i64,
    /// NOT NULL column.
    #[serde(default)]
    pub not_null: bool,
    /// UNIQUE column.
    #[serde(default)]
    pub unique: bool,
    /// Column default, as a SQL expression.
    #[serde(default)]
    pub default_value: Option<String>,
    /// Name of the database sequence generating this column.
    #[serde(default)]
    pub sequence: Option<String>,
    /// Column comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Field {
    /// Creates a plain field whose Rust name and column name are the same.
    #[must_use]
    pub fn new(db_name: impl Into<String>, data_type: DataType) -> Self {
        let db_name = db_name.into();
        let size = data_type.default_size();
        Self {
            name: db_name.clone(),
            db_name,
            data_type,
            size,
            precision: 0,
            scale: 0,
            primary_key: false,
            auto_increment: false,
            auto_increment_increment: 1,
            not_null: false,
            unique: false,
            default_value: None,
            sequence: None,
            comment: None,
        }
    }

    /// Sets the Rust field name.
    #[must_use]
    pub fn rust_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the field as part of the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the field as an identity / auto-increment column.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the step between generated keys.
    #[must_use]
    pub const fn increment(mut self, step: i64) -> Self {
        self.auto_increment_increment = step;
        self
    }

    /// Backs the field with a database sequence.
    #[must_use]
    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.sequence = Some(name.into());
        self
    }

    /// Sets the size hint.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Sets decimal precision and scale.
    #[must_use]
    pub const fn precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Marks the column UNIQUE.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the column default expression.
    #[must_use]
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default_value = Some(expr.into());
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the sequence name when the field is sequence-backed.
    #[must_use]
    pub fn sequence_name(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    /// Returns whether the database supplies a value when none is given.
    #[must_use]
    pub const fn has_default_value(&self) -> bool {
        self.auto_increment || self.sequence.is_some() || self.default_value.is_some()
    }
}

/// Table metadata: the ordered fields of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SchemaDef")]
pub struct Schema {
    table: String,
    fields: Vec<Field>,
    prioritized_primary: Option<usize>,
}

#[derive(Deserialize)]
struct SchemaDef {
    table: String,
    fields: Vec<Field>,
}

impl From<SchemaDef> for Schema {
    fn from(def: SchemaDef) -> Self {
        Self::new(def.table, def.fields)
    }
}

impl Schema {
    /// Creates a schema; field ordinals follow the order of `fields`.
    #[must_use]
    pub fn new(table: impl Into<String>, fields: Vec<Field>) -> Self {
        let primaries: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.primary_key)
            .map(|(i, _)| i)
            .collect();
        let prioritized_primary = match primaries.as_slice() {
            [only] => Some(*only),
            [] => None,
            many => many
                .iter()
                .copied()
                .find(|&i| fields[i].db_name.eq_ignore_ascii_case("id")),
        };

        Self {
            table: table.into(),
            fields,
            prioritized_primary,
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the fields in ordinal order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at `ordinal`.
    #[must_use]
    pub fn field(&self, ordinal: usize) -> Option<&Field> {
        self.fields.get(ordinal)
    }

    /// Looks a field up by column name, returning its ordinal.
    #[must_use]
    pub fn lookup(&self, db_name: &str) -> Option<(usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.db_name == db_name)
    }

    /// Returns the ordinal of the primary key used for generated keys.
    #[must_use]
    pub const fn prioritized_primary_ordinal(&self) -> Option<usize> {
        self.prioritized_primary
    }

    /// Returns the primary key used for generated keys.
    #[must_use]
    pub fn prioritized_primary_field(&self) -> Option<&Field> {
        self.prioritized_primary.and_then(|i| self.fields.get(i))
    }

    /// Returns the fields whose value the database supplies by default.
    pub fn fields_with_default_db_value(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.has_default_value())
    }
}
