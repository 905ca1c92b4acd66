//! Queries through the Oracle dialect: pass-through clauses, positional
//! placeholders and OFFSET/FETCH pagination.

mod common;
use common::*;

use oxide_ora_core::clause::{col, Clause, Limit, OrderBy, Select, Table, Where};
use oxide_ora_core::dialect::{Dialect, DialectConfig, OracleDialect};
use oxide_ora_core::statement::QUERY_CLAUSES;
use oxide_ora_core::{BindVar, Record, Shape, SqlValue, Statement};

fn offset_fetch() -> OracleDialect {
    OracleDialect::new(DialectConfig {
        support_offset_fetch: true,
        ..DialectConfig::default()
    })
}

#[test]
fn test_limit_offset_becomes_offset_fetch() {
    let dialect = offset_fetch();
    let mut stmt = Statement::new(Customer::schema(), Shape::Batch { rows: 0 });
    stmt.add_clause(Clause::Select(Select::default()));
    stmt.add_clause(Clause::From(Table::default()));
    stmt.add_clause(Clause::Where(Where {
        exprs: vec![col("age").gt(30), col("customer_name").like("A%")],
    }));
    stmt.add_clause(Clause::Limit(Limit {
        limit: Some(10),
        offset: 20,
    }));
    stmt.build(&dialect, QUERY_CLAUSES).unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT * FROM customers WHERE age > :p1 AND customer_name LIKE :p2 \
         ORDER BY customer_id OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    assert_eq!(
        stmt.vars(),
        [
            BindVar::In(SqlValue::Int(30)),
            BindVar::In(SqlValue::Text("A%".into())),
        ]
    );
}

#[test]
fn test_explicit_ordering_is_not_duplicated() {
    let dialect = offset_fetch();
    let mut stmt = Statement::new(Customer::schema(), Shape::Batch { rows: 0 });
    stmt.add_clause(Clause::Select(Select {
        columns: vec!["customer_name".into()],
    }));
    stmt.add_clause(Clause::From(Table::default()));
    stmt.add_clause(Clause::OrderBy(OrderBy::desc("age")));
    stmt.add_clause(Clause::Limit(Limit {
        limit: Some(1),
        offset: 0,
    }));
    stmt.build(&dialect, QUERY_CLAUSES).unwrap();

    assert_eq!(
        stmt.sql(),
        "SELECT customer_name FROM customers ORDER BY age DESC FETCH NEXT 1 ROWS ONLY"
    );
    assert_eq!(stmt.sql().matches("ORDER BY").count(), 1);
}

#[test]
fn test_explain_inlines_bound_values() {
    let dialect = offset_fetch();
    let mut stmt = Statement::new(Customer::schema(), Shape::Single);
    stmt.add_clause(Clause::Select(Select::default()));
    stmt.add_clause(Clause::From(Table::default()));
    stmt.add_clause(Clause::Where(Where {
        exprs: vec![col("customer_name").eq("O'Brien")],
    }));
    stmt.build(&dialect, QUERY_CLAUSES).unwrap();

    assert_eq!(
        dialect.explain(stmt.sql(), stmt.vars()),
        "SELECT * FROM customers WHERE customer_name = 'O''Brien'"
    );
}

#[test]
fn test_reserved_and_mixed_case_names_are_quoted() {
    let dialect = OracleDialect::default();
    assert_eq!(dialect.quote_identifier("customers"), "customers");
    assert_eq!(dialect.quote_identifier("order"), "\"order\"");
    assert_eq!(dialect.quote_identifier("app.User Name"), "app.\"User Name\"");

    let always = OracleDialect::new(DialectConfig {
        quote_identifiers: true,
        ..DialectConfig::default()
    });
    assert_eq!(always.quote_identifier("customers"), "\"customers\"");
}
