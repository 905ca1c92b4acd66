#![allow(dead_code)]

use oxide_ora_core::clause::{Clause, Insert, Returning, Values};
use oxide_ora_core::dialect::{DialectConfig, OracleDialect};
use oxide_ora_core::statement::CREATE_CLAUSES;
use oxide_ora_core::{BindVar, Record, Result, Shape, Statement, Target};
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

pub fn oracle() -> OracleDialect {
    OracleDialect::new(DialectConfig::default())
}

/// Builds the create statement for `target` the way a session does.
pub fn render_create<R: Record>(
    dialect: &OracleDialect,
    target: &Target<'_, R>,
    returning: Option<Returning>,
) -> Result<(String, Vec<BindVar>)> {
    let shape = if target.is_batch() {
        Shape::Batch { rows: target.len() }
    } else {
        Shape::Single
    };
    let mut stmt = Statement::new(R::schema(), shape);
    stmt.add_clause(Clause::Insert(Insert::default()));
    stmt.add_clause(Clause::Values(Values::from_target(target)));
    if let Some(returning) = returning {
        stmt.add_clause(Clause::Returning(returning));
    }
    stmt.build(dialect, CREATE_CLAUSES)?;
    Ok(stmt.into_parts())
}

/// Counts `:name` placeholders outside string literals.
pub fn placeholder_count(sql: &str) -> usize {
    let mut count = 0;
    let mut in_literal = false;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => in_literal = !in_literal,
            ':' if !in_literal => {
                if chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
                    count += 1;
                }
            }
            _ => {}
        }
    }
    count
}
