//! Oracle dialect.
//!
//! Oracle has no multi-row `VALUES`, no `ON CONFLICT`, no `LIMIT`, and
//! generates keys from sequences rather than from the insert itself. This
//! dialect overrides the INSERT, VALUES, ON CONFLICT, RETURNING and LIMIT
//! builders and allocates `:p{row}_{column}` placeholders while inserting.
//!
//! Feature flags live in a [`DialectConfig`] owned by each dialect value,
//! so differently configured connections never affect each other.

mod bind;
mod datatype;
mod insert;
mod limit;
mod quote;
mod returning;
mod sequence;
mod upsert;

pub use quote::{quote_identifier, RESERVED_WORDS};

use serde::Deserialize;

use super::{ClauseBuilder, Dialect};
use crate::clause;
use crate::error::Result;
use crate::schema::Field;
use crate::statement::{Statement, SynthesisState};

/// Feature flags of an Oracle dialect.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Hand generated values back with `RETURNING ... INTO`.
    pub support_returning: bool,
    /// `GENERATED ... AS IDENTITY` columns (12c and later).
    pub support_identity: bool,
    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY` (12c and later).
    pub support_offset_fetch: bool,
    /// Size of string columns declared without one; 0 for none.
    pub default_string_size: u32,
    /// Quote every identifier, not only reserved or irregular ones.
    pub quote_identifiers: bool,
    /// Assign propagated insert ids from the last element backwards.
    pub last_insert_id_reversed: bool,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            support_returning: true,
            support_identity: false,
            support_offset_fetch: false,
            default_string_size: 0,
            quote_identifiers: false,
            last_insert_id_reversed: false,
        }
    }
}

/// Clause builders registered by the Oracle dialect.
const CLAUSE_BUILDERS: &[(&str, ClauseBuilder<OracleDialect>)] = &[
    (clause::INSERT, insert::build_insert),
    (clause::VALUES, insert::build_values),
    (clause::ON_CONFLICT, upsert::build_on_conflict),
    (clause::RETURNING, returning::build_returning),
    (clause::LIMIT, limit::build_limit),
];

/// The Oracle dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OracleDialect {
    config: DialectConfig,
}

impl OracleDialect {
    /// Creates a dialect with the given feature flags.
    #[must_use]
    pub const fn new(config: DialectConfig) -> Self {
        Self { config }
    }

    /// Returns the feature flags.
    #[must_use]
    pub const fn config(&self) -> &DialectConfig {
        &self.config
    }

    /// Returns the names of the clauses this dialect builds itself.
    pub fn clause_names(&self) -> impl Iterator<Item = &'static str> {
        CLAUSE_BUILDERS.iter().map(|(name, _)| *name)
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn supports_returning(&self) -> bool {
        self.config.support_returning
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier(name, self.config.quote_identifiers)
    }

    fn bind_var_to(&self, stmt: &mut Statement<'_>, state: &mut SynthesisState) -> Result<()> {
        bind::bind_var_to(self, stmt, state)
    }

    fn clause_builder(&self, name: &str) -> Option<ClauseBuilder<Self>> {
        CLAUSE_BUILDERS
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, builder)| *builder)
    }

    fn data_type_of(&self, field: &Field) -> String {
        datatype::data_type_of(&self.config, field)
    }

    fn default_value_of(&self, _field: &Field) -> String {
        String::from("NULL")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    #[test]
    fn test_oracle_dialect() {
        let dialect = OracleDialect::default();
        assert_eq!(dialect.name(), "oracle");
        assert!(dialect.supports_returning());
        assert_eq!(
            dialect.clause_names().collect::<Vec<_>>(),
            ["INSERT", "VALUES", "ON CONFLICT", "RETURNING", "LIMIT"]
        );
        assert!(dialect.clause_builder("WHERE").is_none());
        assert!(dialect.clause_builder("LIMIT").is_some());
        assert_eq!(
            dialect.default_value_of(&Field::new("a", DataType::Int)),
            "NULL"
        );
    }

    #[test]
    fn test_dialect_config_deserialize_defaults() {
        let config: DialectConfig =
            serde_json::from_str(r#"{"support_offset_fetch": true}"#).unwrap();
        assert!(config.support_returning);
        assert!(config.support_offset_fetch);
        assert!(!config.support_identity);
        assert_eq!(config.default_string_size, 0);
    }
}
