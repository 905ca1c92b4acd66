//! Initialization: connection sources, version probe and configuration.

mod common;
use common::*;

use std::io::Write;
use std::sync::Arc;

use oxide_ora::dialector::VERSION_SQL;
use oxide_ora::{Config, Dialector, OraError};

#[tokio::test]
async fn test_probe_enables_12c_features() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(banner_row(
        "Oracle Database 19c Enterprise Edition Release 19.0.0.0.0 - Production",
    )));

    let session = Dialector::open("oracle://db/ORCL")
        .with_conn(conn.clone())
        .initialize()
        .await
        .unwrap();

    assert_eq!(conn.sql(), [VERSION_SQL]);
    let flags = session.dialect().config();
    assert!(flags.support_identity);
    assert!(flags.support_offset_fetch);
    assert!(session
        .config()
        .server_version
        .as_deref()
        .is_some_and(|v| v.contains("19c")));
}

#[tokio::test]
async fn test_legacy_server_keeps_defaults() {
    let conn = RecordingConnection::new();
    conn.push_rows(Ok(banner_row(
        "Oracle Database 11g Express Edition Release 11.2.0.2.0 - 64bit Production",
    )));

    let session = Dialector::open("oracle://db/XE")
        .with_conn(conn.clone())
        .initialize()
        .await
        .unwrap();

    assert!(!session.dialect().config().support_offset_fetch);
    assert!(!session.dialect().config().support_identity);
}

#[tokio::test]
async fn test_skipped_probe_uses_configured_version() {
    let conn = RecordingConnection::new();
    let config = Config {
        skip_initialize_with_version: true,
        server_version: Some("Oracle Database 21c Express Edition".into()),
        ..Config::new("oracle://db/XE")
    };

    let session = Dialector::new(config)
        .with_conn(conn.clone())
        .initialize()
        .await
        .unwrap();

    assert!(conn.sql().is_empty());
    assert!(session.dialect().config().support_offset_fetch);
}

#[tokio::test]
async fn test_probe_failure_is_a_query_error() {
    let conn = RecordingConnection::new();
    conn.push_rows(Err(oxide_ora::conn::DriverError::new("insufficient privileges")));

    let err = Dialector::open("oracle://db")
        .with_conn(conn.clone())
        .initialize()
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OraError::Query { ref sql, .. } if sql == VERSION_SQL));
}

#[tokio::test]
async fn test_driver_opens_the_connection() {
    let conn = RecordingConnection::new();
    let driver = Arc::new(StaticDriver {
        conn: Some(conn.clone()),
    });
    let config = Config {
        skip_initialize_with_version: true,
        ..Config::new("oracle://db")
    };

    let session = Dialector::new(config)
        .with_driver(driver)
        .initialize()
        .await
        .unwrap();
    session.savepoint("s1").await.unwrap();
    assert_eq!(conn.sql(), ["SAVEPOINT s1"]);
}

#[tokio::test]
async fn test_driver_failure_is_an_open_error() {
    let driver = Arc::new(StaticDriver { conn: None });
    let err = Dialector::open("oracle://unreachable")
        .with_driver(driver)
        .initialize()
        .await
        .err()
        .unwrap();

    match err {
        OraError::Open { driver, source } => {
            assert_eq!(driver, "oracle");
            assert_eq!(source.code, Some(12541));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_connection_source() {
    let err = Dialector::open("oracle://db").initialize().await.err().unwrap();
    assert!(matches!(err, OraError::NoConnection { .. }));
}

#[tokio::test]
async fn test_config_file_drives_the_dialect() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "dsn": "oracle://db/ORCL",
            "skip_initialize_with_version": true,
            "support_returning": false,
            "quote_identifiers": true
        }}"#
    )
    .unwrap();

    let config = Config::from_json_file(file.path()).unwrap();
    let conn = RecordingConnection::new();
    let session = Dialector::new(config)
        .with_conn(conn.clone())
        .initialize()
        .await
        .unwrap();

    assert!(!session.dialect().config().support_returning);
    assert!(session.dialect().config().quote_identifiers);
    assert_eq!(session.config().dsn, "oracle://db/ORCL");
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_json_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, OraError::Io { .. }));
}
