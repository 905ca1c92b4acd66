#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use oxide_ora::conn::{BoxFuture, Connection, Driver, DriverError, ExecOutcome, Row};
use oxide_ora::{Config, Dialector, Session};
use oxide_ora_core::{BindVar, SqlValue};
use oxide_ora_derive::Record;

#[derive(Debug, Clone, Default, PartialEq, Record)]
#[record(table = "customers")]
pub struct Customer {
    #[field(
        column = "customer_id",
        primary_key,
        auto_increment,
        sequence = "customers_s"
    )]
    pub id: i64,
    #[field(column = "customer_name", size = 100, not_null)]
    pub name: String,
    pub age: Option<i32>,
}

pub fn customer(name: &str, age: i32) -> Customer {
    Customer {
        id: 0,
        name: name.to_string(),
        age: Some(age),
    }
}

pub fn customers(n: usize) -> Vec<Customer> {
    (0..n)
        .map(|i| customer(&format!("customer {i}"), 20 + i32::try_from(i).unwrap()))
        .collect()
}

/// A connection that records every call and replays queued responses.
///
/// Without a queued response, `execute` reports one affected row and
/// `query` returns no rows.
#[derive(Default)]
pub struct RecordingConnection {
    calls: Mutex<Vec<(String, Vec<BindVar>)>>,
    outcomes: Mutex<VecDeque<Result<ExecOutcome, DriverError>>>,
    results: Mutex<VecDeque<Result<Vec<Row>, DriverError>>>,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_outcome(&self, outcome: Result<ExecOutcome, DriverError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn push_rows(&self, rows: Result<Vec<Row>, DriverError>) {
        self.results.lock().unwrap().push_back(rows);
    }

    pub fn sql(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    pub fn last(&self) -> (String, Vec<BindVar>) {
        self.calls.lock().unwrap().last().cloned().unwrap()
    }

    fn record(&self, sql: &str, vars: &[BindVar]) {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), vars.to_vec()));
    }
}

impl Connection for RecordingConnection {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        vars: &'a [BindVar],
    ) -> BoxFuture<'a, Result<Vec<Row>, DriverError>> {
        Box::pin(async move {
            self.record(sql, vars);
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }

    fn execute<'a>(
        &'a self,
        sql: &'a str,
        vars: &'a [BindVar],
    ) -> BoxFuture<'a, Result<ExecOutcome, DriverError>> {
        Box::pin(async move {
            self.record(sql, vars);
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ExecOutcome::rows(1)))
        })
    }
}

/// A driver handing out one shared connection, or failing.
pub struct StaticDriver {
    pub conn: Option<Arc<RecordingConnection>>,
}

impl Driver for StaticDriver {
    fn open<'a>(&'a self, dsn: &'a str) -> BoxFuture<'a, Result<Arc<dyn Connection>, DriverError>> {
        Box::pin(async move {
            match &self.conn {
                Some(conn) => Ok(conn.clone() as Arc<dyn Connection>),
                None => Err(DriverError::new(format!("cannot reach {dsn}")).with_code(12541)),
            }
        })
    }
}

pub fn banner_row(banner: &str) -> Vec<Row> {
    vec![vec![("BANNER".to_string(), SqlValue::Text(banner.to_string()))]]
}

/// A session over `conn` that skips the version probe.
pub async fn session_with(conn: &Arc<RecordingConnection>, config: Config) -> Session {
    let config = Config {
        skip_initialize_with_version: true,
        ..config
    };
    Dialector::new(config)
        .with_conn(conn.clone())
        .initialize()
        .await
        .unwrap()
}

pub async fn session(conn: &Arc<RecordingConnection>) -> Session {
    session_with(conn, Config::new("oracle://test")).await
}
