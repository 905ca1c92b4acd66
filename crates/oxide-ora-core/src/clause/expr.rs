//! Filter expressions for WHERE clauses.
//!
//! An [`Expr`] keeps its SQL with `?` markers and the values bound to them,
//! in order. The WHERE builder replaces each marker with the dialect's
//! placeholder while binding the value.

use crate::value::{SqlValue, ToSqlValue};

/// Creates a column reference.
#[must_use]
pub fn col(name: &str) -> Column {
    Column {
        table: None,
        name: String::from(name),
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Optional table qualifier.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(table: &str, name: &str) -> Self {
        Self {
            table: Some(String::from(table)),
            name: String::from(name),
        }
    }

    /// Returns the SQL representation.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.table {
            Some(t) => format!("{t}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), "=", value.to_sql_value().into())
    }

    /// Creates an inequality expression.
    #[must_use]
    pub fn not_eq<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), "<>", value.to_sql_value().into())
    }

    /// Creates a less-than expression.
    #[must_use]
    pub fn lt<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), "<", value.to_sql_value().into())
    }

    /// Creates a less-than-or-equal expression.
    #[must_use]
    pub fn lt_eq<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), "<=", value.to_sql_value().into())
    }

    /// Creates a greater-than expression.
    #[must_use]
    pub fn gt<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), ">", value.to_sql_value().into())
    }

    /// Creates a greater-than-or-equal expression.
    #[must_use]
    pub fn gt_eq<T: ToSqlValue>(self, value: T) -> Expr {
        Expr::binary(self.into(), ">=", value.to_sql_value().into())
    }

    /// Creates an IS NULL expression.
    #[must_use]
    pub fn is_null(self) -> Expr {
        Expr::postfix(self.into(), "IS NULL")
    }

    /// Creates an IS NOT NULL expression.
    #[must_use]
    pub fn is_not_null(self) -> Expr {
        Expr::postfix(self.into(), "IS NOT NULL")
    }

    /// Creates a LIKE expression.
    #[must_use]
    pub fn like<T: ToSqlValue>(self, pattern: T) -> Expr {
        Expr::binary(self.into(), "LIKE", pattern.to_sql_value().into())
    }

    /// Creates a BETWEEN expression.
    #[must_use]
    pub fn between<T: ToSqlValue, U: ToSqlValue>(self, low: T, high: U) -> Expr {
        let mut expr: Expr = self.into();
        expr.sql.push_str(" BETWEEN ? AND ?");
        expr.params.push(low.to_sql_value());
        expr.params.push(high.to_sql_value());
        expr
    }

    /// Creates an IN expression.
    ///
    /// An empty list renders as a predicate that never holds, since Oracle
    /// rejects `IN ()`.
    #[must_use]
    pub fn in_list<T: ToSqlValue>(self, values: Vec<T>) -> Expr {
        if values.is_empty() {
            return Expr::raw("1 = 0");
        }
        let params: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        let markers = vec!["?"; params.len()].join(",");
        let mut expr: Expr = self.into();
        expr.sql = format!("{} IN ({markers})", expr.sql);
        expr.params.extend(params);
        expr
    }
}

/// A filter expression with `?` markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    sql: String,
    params: Vec<SqlValue>,
}

impl Expr {
    /// Creates an expression from raw SQL.
    ///
    /// **Warning**: `?` in the text is taken as a marker, so raw fragments
    /// must not carry user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: vec![],
        }
    }

    fn binary(left: Self, op: &str, right: Self) -> Self {
        let mut params = left.params;
        params.extend(right.params);
        Self {
            sql: format!("{} {op} {}", left.sql, right.sql),
            params,
        }
    }

    fn postfix(operand: Self, op: &str) -> Self {
        Self {
            sql: format!("{} {op}", operand.sql),
            params: operand.params,
        }
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::binary(self, "AND", other)
    }

    /// Creates an OR expression.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::binary(self, "OR", other)
    }

    /// Wraps the expression in parentheses.
    #[must_use]
    pub fn paren(self) -> Self {
        Self {
            sql: format!("({})", self.sql),
            params: self.params,
        }
    }

    /// Returns the SQL with `?` markers.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound values.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

impl From<Column> for Expr {
    fn from(col: Column) -> Self {
        Self {
            sql: col.to_sql(),
            params: vec![],
        }
    }
}

impl From<SqlValue> for Expr {
    fn from(value: SqlValue) -> Self {
        Self {
            sql: String::from("?"),
            params: vec![value],
        }
    }
}
