//! DDL through a session.

mod common;
use common::*;

use oxide_ora::{Config, OraError};
use oxide_ora_core::{Record, SqlValue};

#[tokio::test]
async fn test_create_table_with_sequence() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;
    let migrator = session.migrator();

    migrator.create_sequences(Customer::schema()).await.unwrap();
    migrator.create_table(Customer::schema()).await.unwrap();

    assert_eq!(
        conn.sql(),
        [
            "CREATE SEQUENCE customers_s START WITH 1 INCREMENT BY 1",
            "CREATE TABLE customers (\n  \
             customer_id NUMBER,\n  \
             customer_name VARCHAR2(100) NOT NULL,\n  \
             age NUMBER(10,0),\n  \
             PRIMARY KEY (customer_id)\n)",
        ]
    );
}

#[tokio::test]
async fn test_drop_and_alter() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;
    let migrator = session.migrator();

    migrator.alter_column(Customer::schema(), "name").await.unwrap();
    migrator
        .drop_constraint(Customer::schema(), "customers_age_ck")
        .await
        .unwrap();
    migrator.drop_table(Customer::schema()).await.unwrap();
    migrator.drop_sequences(Customer::schema()).await.unwrap();

    assert_eq!(
        conn.sql(),
        [
            "ALTER TABLE customers MODIFY customer_name VARCHAR2(100) NOT NULL",
            "ALTER TABLE customers DROP CONSTRAINT customers_age_ck",
            "DROP TABLE customers PURGE",
            "DROP SEQUENCE customers_s",
        ]
    );
}

#[tokio::test]
async fn test_alter_unknown_column() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;

    let err = session
        .migrator()
        .alter_column(Customer::schema(), "email")
        .await
        .unwrap_err();
    assert!(matches!(err, OraError::UnknownField { ref field, .. } if field == "email"));
    assert!(conn.sql().is_empty());
}

#[tokio::test]
async fn test_renames() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;
    let migrator = session.migrator();

    migrator
        .rename_column(Customer::schema(), "full_name", "name")
        .await
        .unwrap();
    migrator
        .rename_index("idx_customers_name", "customers_name_ix")
        .await
        .unwrap();

    assert_eq!(
        conn.sql(),
        [
            "ALTER TABLE customers RENAME COLUMN full_name TO customer_name",
            "ALTER INDEX idx_customers_name RENAME TO customers_name_ix",
        ]
    );
}

#[tokio::test]
async fn test_renames_disabled_by_config() {
    let conn = RecordingConnection::new();
    let config = Config {
        dont_support_rename_column: true,
        dont_support_rename_index: true,
        ..Config::new("oracle://test")
    };
    let session = session_with(&conn, config).await;
    let migrator = session.migrator();

    assert!(matches!(
        migrator
            .rename_column(Customer::schema(), "full_name", "name")
            .await,
        Err(OraError::Unsupported(_))
    ));
    assert!(matches!(
        migrator.rename_index("a", "b").await,
        Err(OraError::Unsupported(_))
    ));
    assert!(conn.sql().is_empty());
}

#[tokio::test]
async fn test_current_schema() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(vec![vec![(
        "SYS_CONTEXT".to_string(),
        SqlValue::Text("APP".into()),
    )]]));
    let session = session(&conn).await;
    let migrator = session.migrator();

    assert_eq!(
        migrator.current_schema("HR.EMPLOYEES").await.unwrap(),
        ("HR".to_string(), "EMPLOYEES".to_string())
    );
    assert!(conn.sql().is_empty());

    assert_eq!(
        migrator.current_schema("customers").await.unwrap(),
        ("APP".to_string(), "customers".to_string())
    );
    assert_eq!(conn.sql().len(), 1);
}
