//! Insert strategies of the Oracle dialect.
//!
//! Prints the SQL synthesized for one schema under each insert shape:
//! single row, single row with RETURNING, batch, batch with RETURNING and
//! upsert.
//!
//! Run with: cargo run -p oxide-ora-core --example insert_strategies

use oxide_ora_core::clause::{Assignment, Clause, Insert, OnConflict, Returning, Values};
use oxide_ora_core::dialect::{DialectConfig, OracleDialect};
use oxide_ora_core::statement::CREATE_CLAUSES;
use oxide_ora_core::{BindVar, DataType, Dialect, Field, Result, Schema, Shape, SqlValue, Statement};

fn invoices() -> Schema {
    Schema::new(
        "invoices",
        vec![
            Field::new("invoice_id", DataType::Int)
                .primary_key()
                .auto_increment()
                .sequence("invoices_s"),
            Field::new("number", DataType::String).size(20).not_null(),
            Field::new("amount", DataType::Float),
        ],
    )
}

fn rows(n: i64) -> Values {
    Values::new(
        vec!["number".into(), "amount".into()],
        (1..=n)
            .map(|i| {
                vec![
                    BindVar::In(SqlValue::Text(format!("INV-{i:04}"))),
                    BindVar::In(SqlValue::Int(i * 100)),
                ]
            })
            .collect(),
    )
}

fn render(
    title: &str,
    dialect: &OracleDialect,
    schema: &Schema,
    n: i64,
    extra: Option<Clause>,
) -> Result<()> {
    let shape = if n > 1 {
        Shape::Batch {
            rows: usize::try_from(n).unwrap_or_default(),
        }
    } else {
        Shape::Single
    };
    let mut stmt = Statement::new(schema, shape);
    stmt.add_clause(Clause::Insert(Insert::default()));
    stmt.add_clause(Clause::Values(rows(n)));
    if let Some(clause) = extra {
        stmt.add_clause(clause);
    }
    stmt.build(dialect, CREATE_CLAUSES)?;

    println!("-- {title}");
    println!("{}", stmt.sql());
    println!("-- explained");
    println!("{}\n", dialect.explain(stmt.sql(), stmt.vars()));
    Ok(())
}

fn main() -> Result<()> {
    let schema = invoices();
    let dialect = OracleDialect::new(DialectConfig::default());
    let returning = || Some(Clause::Returning(Returning::columns(["invoice_id"])));

    render("single row", &dialect, &schema, 1, None)?;
    render("single row, key returned", &dialect, &schema, 1, returning())?;
    render("batch", &dialect, &schema, 3, None)?;
    render("batch, keys returned", &dialect, &schema, 3, returning())?;
    render(
        "upsert on number",
        &dialect,
        &schema,
        2,
        Some(Clause::OnConflict(OnConflict {
            columns: vec!["number".into()],
            do_updates: vec![Assignment::excluded("amount")],
            ..OnConflict::default()
        })),
    )?;
    Ok(())
}
