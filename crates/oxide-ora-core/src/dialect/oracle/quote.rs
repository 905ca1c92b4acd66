//! Identifier quoting.
//!
//! Oracle folds unquoted identifiers to upper case, so a name is only
//! quoted when it has to be: reserved words and names that are not plain
//! `[A-Za-z][A-Za-z0-9_$#]*`. Quoting a plain lower-case name would make it
//! case-sensitive and miss the table created without quotes.

/// Oracle reserved words that cannot be used as plain identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUDIT", "BETWEEN", "BY", "CHAR",
    "CHECK", "CLUSTER", "COLUMN", "COMMENT", "COMPRESS", "CONNECT", "CREATE", "CURRENT", "DATE",
    "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "EXCLUSIVE", "EXISTS",
    "FILE", "FLOAT", "FOR", "FROM", "GRANT", "GROUP", "HAVING", "IDENTIFIED", "IMMEDIATE", "IN",
    "INCREMENT", "INDEX", "INITIAL", "INSERT", "INTEGER", "INTERSECT", "INTO", "IS", "LEVEL",
    "LIKE", "LOCK", "LONG", "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE", "MODIFY", "NOAUDIT",
    "NOCOMPRESS", "NOT", "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "ON", "ONLINE", "OPTION",
    "OR", "ORDER", "PCTFREE", "PRIOR", "PUBLIC", "RAW", "RENAME", "RESOURCE", "REVOKE", "ROW",
    "ROWID", "ROWNUM", "ROWS", "SELECT", "SESSION", "SET", "SHARE", "SIZE", "SMALLINT", "START",
    "SUCCESSFUL", "SYNONYM", "SYSDATE", "TABLE", "THEN", "TO", "TRIGGER", "UID", "UNION",
    "UNIQUE", "UPDATE", "USER", "VALIDATE", "VALUES", "VARCHAR", "VARCHAR2", "VIEW", "WHENEVER",
    "WHERE", "WITH",
];

fn is_reserved(segment: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(segment))
}

fn is_plain(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'))
}

fn quote_segment(segment: &str, out: &mut String) {
    out.push('"');
    out.push_str(&segment.replace('"', "\"\""));
    out.push('"');
}

/// Quotes `name` segment by segment (`owner.table`, `t.column`).
///
/// With `always`, every segment is quoted. `*` and segments that are
/// already quoted pass through unchanged.
#[must_use]
pub fn quote_identifier(name: &str, always: bool) -> String {
    let trimmed = name.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len() + 2);
    for (i, segment) in trimmed.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if segment == "*" {
            out.push('*');
        } else if always || !is_plain(segment) || is_reserved(segment) {
            quote_segment(segment, &mut out);
        } else {
            out.push_str(segment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_pass_through() {
        assert_eq!(quote_identifier("customers", false), "customers");
        assert_eq!(quote_identifier("CUSTOMER_ID", false), "CUSTOMER_ID");
        assert_eq!(quote_identifier("a$b#c", false), "a$b#c");
    }

    #[test]
    fn test_reserved_and_irregular_names_are_quoted() {
        assert_eq!(quote_identifier("order", false), r#""order""#);
        assert_eq!(quote_identifier("Date", false), r#""Date""#);
        assert_eq!(quote_identifier("first name", false), r#""first name""#);
        assert_eq!(quote_identifier("1st", false), r#""1st""#);
        assert_eq!(quote_identifier(r#"we"ird"#, false), r#""we""ird""#);
    }

    #[test]
    fn test_dotted_names() {
        assert_eq!(quote_identifier("app.customers", false), "app.customers");
        assert_eq!(quote_identifier("app.order", false), r#"app."order""#);
        assert_eq!(quote_identifier("t.*", true), r#""t".*"#);
        assert_eq!(quote_identifier("app.customers", true), r#""app"."customers""#);
    }

    #[test]
    fn test_already_quoted_and_idempotent() {
        let once = quote_identifier("user", false);
        assert_eq!(once, r#""user""#);
        assert_eq!(quote_identifier(&once, false), once);
        assert_eq!(quote_identifier("user", false), quote_identifier("user", false));
    }
}
