//! Tests for the `#[derive(Record)]` macro output.

mod common;
use common::*;

use chrono::NaiveDate;
use oxide_ora_core::dialect::{Dialect, OracleDialect};
use oxide_ora_core::{DataType, Error, Record, RecordSlice, SqlValue};
use oxide_ora_derive::Record;

#[derive(Debug, Clone, Default, Record)]
pub struct AuditEntry {
    #[field(primary_key, auto_increment, increment = 10)]
    pub id: u32,
    #[field(precision = 12, scale = 2)]
    pub amount: f64,
    pub active: bool,
    #[field(default = "SYSDATE", not_null)]
    pub created_at: chrono::NaiveDateTime,
    pub payload: Option<Vec<u8>>,
    #[field(sql_type = "NVARCHAR2(20)", comment = "free text")]
    pub note: String,
}

#[test]
fn test_customer_schema() {
    let schema = Customer::schema();
    assert_eq!(schema.table(), "customers");

    let names: Vec<&str> = schema.fields().iter().map(|f| f.db_name.as_str()).collect();
    assert_eq!(names, ["customer_id", "customer_name", "age"]);

    let id = &schema.fields()[0];
    assert_eq!(id.name, "id");
    assert!(id.primary_key);
    assert!(id.auto_increment);
    assert_eq!(id.sequence_name(), Some("customers_s"));
    assert_eq!(id.data_type, DataType::Int);
    assert_eq!(id.size, 64);

    let name = &schema.fields()[1];
    assert_eq!(name.size, 100);
    assert!(name.not_null);

    assert_eq!(schema.fields()[2].size, 32);
    assert_eq!(schema.prioritized_primary_ordinal(), Some(0));
}

#[test]
fn test_schema_is_built_once() {
    assert!(std::ptr::eq(Customer::schema(), Customer::schema()));
}

#[test]
fn test_default_table_name_and_inferred_types() {
    let schema = AuditEntry::schema();
    assert_eq!(schema.table(), "audit_entry");

    let types: Vec<&DataType> = schema.fields().iter().map(|f| &f.data_type).collect();
    assert_eq!(
        types,
        [
            &DataType::Uint,
            &DataType::Float,
            &DataType::Bool,
            &DataType::Time,
            &DataType::Bytes,
            &DataType::Custom(String::from("NVARCHAR2(20)")),
        ]
    );
    assert_eq!(schema.fields()[0].auto_increment_increment, 10);
    assert_eq!(schema.fields()[1].precision, 12);
    assert_eq!(schema.fields()[1].scale, 2);
    assert_eq!(schema.fields()[5].comment.as_deref(), Some("free text"));

    let defaults: Vec<&str> = schema
        .fields_with_default_db_value()
        .map(|(_, f)| f.db_name.as_str())
        .collect();
    assert_eq!(defaults, ["id", "created_at"]);
}

#[test]
fn test_oracle_column_types() {
    let dialect = OracleDialect::default();
    let fields = AuditEntry::schema().fields();
    let types: Vec<String> = fields.iter().map(|f| dialect.data_type_of(f)).collect();
    assert_eq!(
        types,
        [
            "NUMBER(10,0)",
            "NUMBER(12, 2)",
            "BOOLEAN",
            "DATE",
            "BLOB",
            "NVARCHAR2(20)",
        ]
    );
}

#[test]
fn test_value_access_by_ordinal() {
    let mut record = customer("Alice", 30);
    assert_eq!(record.value_of(0), SqlValue::Int(0));
    assert_eq!(record.value_of(1), SqlValue::Text("Alice".into()));
    assert_eq!(record.value_of(2), SqlValue::Int(30));
    assert_eq!(record.value_of(9), SqlValue::Null);

    record.set_value(0, SqlValue::Int(12)).unwrap();
    record.set_value(2, SqlValue::Null).unwrap();
    assert_eq!(record.id, 12);
    assert_eq!(record.age, None);

    assert!(matches!(
        record.set_value(3, SqlValue::Int(1)),
        Err(Error::UnknownOrdinal { ordinal: 3 })
    ));
    assert!(matches!(
        record.set_value(0, SqlValue::Bool(true)),
        Err(Error::ValueConversion { .. })
    ));
}

#[test]
fn test_timestamps_and_blobs_round_through_values() {
    let created = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(8, 30, 0))
        .unwrap();
    let mut entry = AuditEntry::default();
    entry
        .set_value(3, SqlValue::Timestamp(created))
        .unwrap();
    entry.set_value(4, SqlValue::Blob(vec![1, 2])).unwrap();
    assert_eq!(entry.created_at, created);
    assert_eq!(entry.payload.as_deref(), Some(&[1u8, 2][..]));
}

#[test]
fn test_record_slices() {
    let mut rows = vec![Some(customer("a", 1)), None];
    assert_eq!(rows.row_count(), 2);
    assert!(rows.row(1).is_none());
    assert!(rows.push_row(customer("c", 3)));
    assert_eq!(rows.row_count(), 3);

    let mut fixed = [customer("x", 1), customer("y", 2)];
    let slice: &mut [Customer] = &mut fixed;
    assert!(!slice.push_row(customer("z", 3)));
    if let Some(record) = slice.row_mut(1) {
        record.id = 5;
    }
    assert_eq!(fixed[1].id, 5);
}
