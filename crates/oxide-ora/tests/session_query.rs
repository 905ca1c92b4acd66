//! Find, raw exec and savepoints.

mod common;
use common::*;

use oxide_ora::conn::DriverError;
use oxide_ora::{Config, OraError, Query};
use oxide_ora_core::clause::{col, OrderBy};
use oxide_ora_core::{BindVar, DialectConfig, SqlValue};

fn offset_fetch() -> Config {
    Config {
        dialect: DialectConfig {
            support_offset_fetch: true,
            ..DialectConfig::default()
        },
        ..Config::new("oracle://test")
    }
}

fn row(id: i64, name: &str, age: Option<i64>) -> Vec<(String, SqlValue)> {
    vec![
        ("CUSTOMER_ID".to_string(), SqlValue::Int(id)),
        ("CUSTOMER_NAME".to_string(), SqlValue::Text(name.to_string())),
        ("AGE".to_string(), age.map_or(SqlValue::Null, SqlValue::Int)),
        ("RN".to_string(), SqlValue::Int(1)),
    ]
}

#[tokio::test]
async fn test_find_pages_with_offset_fetch_and_hydrates() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(vec![row(7, "Alice", Some(31)), row(8, "Bob", None)]));
    let session = session_with(&conn, offset_fetch()).await;

    let mut found: Vec<Customer> = Vec::new();
    let count = session
        .find(
            &mut found,
            Query::new().filter(col("age").gt(30)).limit(2).offset(4),
        )
        .await
        .unwrap();

    let (sql, vars) = conn.last();
    assert_eq!(
        sql,
        "SELECT * FROM customers WHERE age > :p1 \
         ORDER BY customer_id OFFSET 4 ROWS FETCH NEXT 2 ROWS ONLY"
    );
    assert_eq!(vars, [BindVar::In(SqlValue::Int(30))]);
    assert_eq!(count, 2);
    assert_eq!(
        found,
        [
            Customer {
                id: 7,
                name: "Alice".into(),
                age: Some(31),
            },
            Customer {
                id: 8,
                name: "Bob".into(),
                age: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_first_orders_by_primary_key() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(vec![row(1, "Alice", Some(30))]));
    let session = session_with(&conn, offset_fetch()).await;

    let first: Option<Customer> = session
        .first(Query::new().filter(col("customer_name").eq("Alice")))
        .await
        .unwrap();

    assert_eq!(first.map(|c| c.id), Some(1));
    assert_eq!(
        conn.last().0,
        "SELECT * FROM customers WHERE customer_name = :p1 \
         ORDER BY customer_id FETCH NEXT 1 ROWS ONLY"
    );
}

#[tokio::test]
async fn test_first_keeps_explicit_ordering() {
    let conn = RecordingConnection::new();
    let session = session_with(&conn, offset_fetch()).await;

    let first: Option<Customer> = session
        .first(Query::new().order_by(OrderBy::desc("age")))
        .await
        .unwrap();

    assert!(first.is_none());
    assert_eq!(
        conn.last().0,
        "SELECT * FROM customers ORDER BY age DESC FETCH NEXT 1 ROWS ONLY"
    );
}

#[tokio::test]
async fn test_unconvertible_value_fails_hydration() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(vec![vec![(
        "CUSTOMER_ID".to_string(),
        SqlValue::Bool(true),
    )]]));
    let session = session(&conn).await;

    let mut found: Vec<Customer> = Vec::new();
    let err = session.find(&mut found, Query::new()).await.unwrap_err();
    assert!(matches!(err, OraError::Core(_)));
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_query_failure_carries_sql() {
    let conn = RecordingConnection::new();
    conn.push_rows(Err(DriverError::new("table or view does not exist").with_code(942)));
    let session = session(&conn).await;

    let mut found: Vec<Customer> = Vec::new();
    let err = session.find(&mut found, Query::new()).await.unwrap_err();
    match err {
        OraError::Query { sql, source } => {
            assert_eq!(sql, "SELECT * FROM customers");
            assert_eq!(source.code, Some(942));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_savepoints_pass_through() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;

    session.savepoint("before_import").await.unwrap();
    session.rollback_to("before_import").await.unwrap();

    assert_eq!(
        conn.sql(),
        [
            "SAVEPOINT before_import",
            "ROLLBACK TO SAVEPOINT before_import",
        ]
    );
}

#[tokio::test]
async fn test_exec_reports_affected_rows() {
    let conn = RecordingConnection::new();
    let session = session(&conn).await;

    let vars = [BindVar::In(SqlValue::Int(3))];
    let affected = session
        .exec("DELETE FROM customers WHERE customer_id = :1", &vars)
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(
        session.explain("DELETE FROM customers WHERE customer_id = :1", &vars),
        "DELETE FROM customers WHERE customer_id = 3"
    );
}

#[tokio::test]
async fn test_find_appends_to_optional_elements() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(vec![row(3, "Carol", Some(41))]));
    let session = session(&conn).await;

    let mut found: Vec<Option<Customer>> = vec![None];
    let count = session.find(&mut found, Query::new()).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(found.len(), 2);
    assert!(found[0].is_none());
    assert_eq!(found[1].as_ref().map(|c| c.name.as_str()), Some("Carol"));
}
