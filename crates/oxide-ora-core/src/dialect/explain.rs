//! SQL rendering with inlined values, for logs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::value::BindVar;

/// A quoted string literal, a named placeholder (`:p0_1`, `:o0`, `:1`) or a
/// `?` marker. Literals are matched so their content is never substituted.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'(?:[^']|'')*'|:\w+|\?").expect("placeholder pattern should compile")
});

/// Substitutes bound values into their placeholders, in order.
///
/// Output destinations keep their placeholder text; placeholders beyond
/// the last variable are left as written.
#[must_use]
pub fn explain_sql(sql: &str, vars: &[BindVar]) -> String {
    let mut vars = vars.iter();
    PLACEHOLDER
        .replace_all(sql, |caps: &Captures<'_>| {
            let matched = &caps[0];
            if matched.starts_with('\'') {
                return matched.to_string();
            }
            match vars.next() {
                Some(BindVar::In(value)) => value.to_sql_inline(),
                Some(BindVar::Out(_)) | None => matched.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{OutSlot, SqlValue};

    #[test]
    fn test_explain_named_placeholders() {
        let sql = "INSERT INTO t (a,b) VALUES (:p0_0,:p0_1) RETURNING id INTO :o2";
        let vars = [
            BindVar::In(SqlValue::Int(1)),
            BindVar::In(SqlValue::Text(String::from("O'Neil"))),
            BindVar::Out(OutSlot { row: 0, field: 2 }),
        ];
        assert_eq!(
            explain_sql(sql, &vars),
            "INSERT INTO t (a,b) VALUES (1,'O''Neil') RETURNING id INTO :o2"
        );
    }

    #[test]
    fn test_explain_skips_string_literals() {
        let sql = "SELECT * FROM t WHERE note = 'at 10:30?' AND id = ?";
        let vars = [BindVar::In(SqlValue::Int(7))];
        assert_eq!(
            explain_sql(sql, &vars),
            "SELECT * FROM t WHERE note = 'at 10:30?' AND id = 7"
        );
    }

    #[test]
    fn test_explain_leaves_unbound_placeholders() {
        assert_eq!(explain_sql("a = :p1 AND b = :p2", &[BindVar::In(SqlValue::Null)]), "a = NULL AND b = :p2");
    }

    #[test]
    fn test_explain_procedural_assignment() {
        let sql = "\tr(r.last).id := s.NEXTVAL;\n\t:p0_0 := r(r.last).id;\n\tr(r.last).name := :p0_1;";
        let vars = [
            BindVar::Out(OutSlot { row: 0, field: 0 }),
            BindVar::In(SqlValue::Text(String::from("x"))),
        ];
        assert_eq!(
            explain_sql(sql, &vars),
            "\tr(r.last).id := s.NEXTVAL;\n\t:p0_0 := r(r.last).id;\n\tr(r.last).name := 'x';"
        );
    }
}
