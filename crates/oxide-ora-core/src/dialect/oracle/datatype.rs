//! Column type mapping.

use super::DialectConfig;
use crate::schema::{DataType, Field};

const MAX_VARCHAR2: u32 = 4000;

fn identity_clause(field: &Field) -> String {
    format!(
        " GENERATED ALWAYS AS IDENTITY (START WITH 1 INCREMENT BY {})",
        field.auto_increment_increment.max(1)
    )
}

/// Identity columns need server support, and a sequence-backed field gets
/// its value from the sequence instead.
fn wants_identity(config: &DialectConfig, field: &Field) -> bool {
    field.auto_increment && config.support_identity && field.sequence.is_none()
}

fn integer_type(config: &DialectConfig, field: &Field) -> String {
    let mut sql_type = String::from(match field.size {
        0..=8 => "NUMBER(3,0)",
        9..=16 => "NUMBER(5,0)",
        17..=24 => "NUMBER(7,0)",
        25..=32 => "NUMBER(10,0)",
        _ => "NUMBER",
    });
    if wants_identity(config, field) {
        sql_type.push_str(&identity_clause(field));
    }
    sql_type
}

fn float_type(field: &Field) -> String {
    if field.precision > 0 {
        format!("NUMBER({}, {})", field.precision, field.scale)
    } else {
        String::from("NUMBER")
    }
}

fn string_type(config: &DialectConfig, field: &Field) -> String {
    let size = if field.size == 0 {
        config.default_string_size
    } else {
        field.size
    };
    match size {
        0 => format!("VARCHAR2({MAX_VARCHAR2})"),
        1..=MAX_VARCHAR2 => format!("VARCHAR2({size})"),
        _ => String::from("CLOB"),
    }
}

fn time_type(field: &Field) -> String {
    if field.not_null || field.primary_key {
        String::from("DATE")
    } else {
        String::from("DATE NULL")
    }
}

fn custom_type(config: &DialectConfig, field: &Field, sql_type: &str) -> String {
    let mut sql_type = sql_type.to_string();
    if wants_identity(config, field) && !sql_type.to_ascii_uppercase().contains("IDENTITY") {
        sql_type.push_str(&identity_clause(field));
    }
    sql_type
}

/// Maps a field to an Oracle column type.
pub(super) fn data_type_of(config: &DialectConfig, field: &Field) -> String {
    match &field.data_type {
        DataType::Bool => String::from("BOOLEAN"),
        DataType::Int | DataType::Uint => integer_type(config, field),
        DataType::Float => float_type(field),
        DataType::String => string_type(config, field),
        DataType::Time => time_type(field),
        DataType::Bytes => String::from("BLOB"),
        DataType::Custom(sql_type) => custom_type(config, field, sql_type),
    }
}
