//! Oracle DDL.
//!
//! The statement builders are plain functions over a schema so they can be
//! printed without a connection; [`Migrator`] runs them through a
//! [`Session`]. Catalog introspection is left to the caller.

use oxide_ora_core::{Dialect, Field, OracleDialect, Schema, SqlValue};
use tracing::info;

use crate::config::Config;
use crate::error::{OraError, Result};
use crate::session::Session;

/// Query returning the session's current schema.
pub const CURRENT_SCHEMA_SQL: &str = "SELECT SYS_CONTEXT('USERENV','CURRENT_SCHEMA') FROM DUAL";

/// Column type with its default, nullability and uniqueness.
#[must_use]
pub fn full_data_type_of(dialect: &OracleDialect, config: &Config, field: &Field) -> String {
    let mut sql = dialect.data_type_of(field);
    if let Some(default) = field
        .default_value
        .as_deref()
        .filter(|expr| config.declares_default(expr))
    {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }
    if field.not_null && !field.primary_key {
        sql.push_str(" NOT NULL");
    }
    if field.unique && !field.primary_key {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// `CREATE TABLE`, followed by one `COMMENT ON COLUMN` per commented field.
#[must_use]
pub fn create_table_statements(
    dialect: &OracleDialect,
    config: &Config,
    schema: &Schema,
) -> Vec<String> {
    let table = dialect.quote_identifier(schema.table());
    let mut lines: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| {
            format!(
                "{} {}",
                dialect.quote_identifier(&field.db_name),
                full_data_type_of(dialect, config, field)
            )
        })
        .collect();

    let primary: Vec<String> = schema
        .fields()
        .iter()
        .filter(|field| field.primary_key)
        .map(|field| dialect.quote_identifier(&field.db_name))
        .collect();
    if !primary.is_empty() {
        lines.push(format!("PRIMARY KEY ({})", primary.join(", ")));
    }

    let mut statements = vec![format!(
        "CREATE TABLE {table} (\n  {}\n)",
        lines.join(",\n  ")
    )];
    statements.extend(schema.fields().iter().filter_map(|field| {
        field.comment.as_deref().map(|comment| {
            format!(
                "COMMENT ON COLUMN {table}.{} IS {}",
                dialect.quote_identifier(&field.db_name),
                literal(comment)
            )
        })
    }));
    statements
}

/// `CREATE SEQUENCE` for every sequence-backed field.
#[must_use]
pub fn create_sequence_statements(dialect: &OracleDialect, schema: &Schema) -> Vec<String> {
    schema
        .fields()
        .iter()
        .filter_map(|field| {
            field.sequence_name().map(|sequence| {
                format!(
                    "CREATE SEQUENCE {} START WITH 1 INCREMENT BY {}",
                    dialect.quote_identifier(sequence),
                    field.auto_increment_increment.max(1)
                )
            })
        })
        .collect()
}

/// `DROP SEQUENCE` for every sequence-backed field.
#[must_use]
pub fn drop_sequence_statements(dialect: &OracleDialect, schema: &Schema) -> Vec<String> {
    schema
        .fields()
        .iter()
        .filter_map(Field::sequence_name)
        .map(|sequence| format!("DROP SEQUENCE {}", dialect.quote_identifier(sequence)))
        .collect()
}

/// Finds a field by Rust name or column name.
fn lookup_field<'s>(schema: &'s Schema, name: &str) -> Option<&'s Field> {
    schema
        .fields()
        .iter()
        .find(|field| field.name == name || field.db_name == name)
}

/// Runs DDL through a session.
pub struct Migrator<'a> {
    session: &'a Session,
}

impl<'a> Migrator<'a> {
    pub(crate) const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn dialect(&self) -> &OracleDialect {
        self.session.dialect()
    }

    fn quoted_table(&self, schema: &Schema) -> String {
        self.dialect().quote_identifier(schema.table())
    }

    async fn run(&self, statements: Vec<String>) -> Result<()> {
        for sql in statements {
            info!(sql = %sql, "ddl");
            self.session.exec(&sql, &[]).await?;
        }
        Ok(())
    }

    /// Column type with its default, nullability and uniqueness.
    #[must_use]
    pub fn full_data_type_of(&self, field: &Field) -> String {
        full_data_type_of(self.dialect(), self.session.config(), field)
    }

    /// Creates the table and its column comments.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if a statement fails.
    pub async fn create_table(&self, schema: &Schema) -> Result<()> {
        self.run(create_table_statements(
            self.dialect(),
            self.session.config(),
            schema,
        ))
        .await
    }

    /// Drops the table, bypassing the recycle bin.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if the statement fails.
    pub async fn drop_table(&self, schema: &Schema) -> Result<()> {
        let sql = format!("DROP TABLE {} PURGE", self.quoted_table(schema));
        self.run(vec![sql]).await
    }

    /// Changes a column to its current definition.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::UnknownField`] if `field` names no field.
    pub async fn alter_column(&self, schema: &Schema, field: &str) -> Result<()> {
        let found = lookup_field(schema, field).ok_or_else(|| OraError::UnknownField {
            table: schema.table().to_string(),
            field: field.to_string(),
        })?;
        let sql = format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.quoted_table(schema),
            self.dialect().quote_identifier(&found.db_name),
            self.full_data_type_of(found)
        );
        self.run(vec![sql]).await
    }

    /// Renames a column. Either name may be a Rust field name.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Unsupported`] when column renames are disabled
    /// and [`OraError::UnknownField`] if neither name resolves to a field.
    pub async fn rename_column(&self, schema: &Schema, old: &str, new: &str) -> Result<()> {
        if self.session.config().dont_support_rename_column {
            return Err(OraError::Unsupported(format!(
                "renaming column {old} of {}",
                schema.table()
            )));
        }
        let old_field = lookup_field(schema, old);
        let new_field = lookup_field(schema, new);
        if old_field.is_none() && new_field.is_none() {
            return Err(OraError::UnknownField {
                table: schema.table().to_string(),
                field: new.to_string(),
            });
        }
        let old = old_field.map_or(old, |field| field.db_name.as_str());
        let new = new_field.map_or(new, |field| field.db_name.as_str());
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quoted_table(schema),
            self.dialect().quote_identifier(old),
            self.dialect().quote_identifier(new)
        );
        self.run(vec![sql]).await
    }

    /// Renames an index.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Unsupported`] when index renames are disabled.
    pub async fn rename_index(&self, old: &str, new: &str) -> Result<()> {
        if self.session.config().dont_support_rename_index {
            return Err(OraError::Unsupported(format!("renaming index {old}")));
        }
        let sql = format!(
            "ALTER INDEX {} RENAME TO {}",
            self.dialect().quote_identifier(old),
            self.dialect().quote_identifier(new)
        );
        self.run(vec![sql]).await
    }

    /// Drops a named constraint.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if the statement fails.
    pub async fn drop_constraint(&self, schema: &Schema, name: &str) -> Result<()> {
        let sql = format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quoted_table(schema),
            self.dialect().quote_identifier(name)
        );
        self.run(vec![sql]).await
    }

    /// Creates the sequences of sequence-backed fields.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if a statement fails.
    pub async fn create_sequences(&self, schema: &Schema) -> Result<()> {
        self.run(create_sequence_statements(self.dialect(), schema))
            .await
    }

    /// Drops the sequences of sequence-backed fields.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Exec`] if a statement fails.
    pub async fn drop_sequences(&self, schema: &Schema) -> Result<()> {
        self.run(drop_sequence_statements(self.dialect(), schema))
            .await
    }

    /// Splits `owner.table`, asking the server for the owner when `table`
    /// is unqualified.
    ///
    /// # Errors
    ///
    /// Returns [`OraError::Query`] if the schema query fails.
    pub async fn current_schema(&self, table: &str) -> Result<(String, String)> {
        if let Some((owner, name)) = table.split_once('.') {
            return Ok((owner.to_string(), name.to_string()));
        }
        let owner = self
            .session
            .query_scalar(CURRENT_SCHEMA_SQL)
            .await?
            .and_then(|value| match value {
                SqlValue::Text(owner) => Some(owner),
                _ => None,
            })
            .unwrap_or_default();
        Ok((owner, table.to_string()))
    }
}
