//! Text rewrites from generic SQL to backend SQL.
//!
//! Generic SQL quotes identifiers with `` ` ``, writes `?` for every
//! parameter and may refer to a table's primary key as `(id)`. Each
//! dialect lists the [`Filter`]s that turn this into text its backend
//! accepts; [`rewrite`] applies them in that order.

use crate::dialect::Dialect;
use crate::schema::Table;

/// Quote character of generic SQL.
pub const GENERIC_QUOTE: char = '`';

/// Placeholder of generic SQL.
pub const GENERIC_PLACEHOLDER: char = '?';

const ID_ALIAS: &str = "(id)";

/// One rewrite pass.
pub trait Filter: Send + Sync {
    fn apply(&self, sql: &str, dialect: &dyn Dialect, table: Option<&Table>) -> String;
}

/// Replaces the generic quote with the dialect's.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteFilter;

impl Filter for QuoteFilter {
    fn apply(&self, sql: &str, dialect: &dyn Dialect, _table: Option<&Table>) -> String {
        let quote = dialect.quote_char();
        if quote == GENERIC_QUOTE {
            return sql.to_string();
        }
        sql.replace(GENERIC_QUOTE, &quote.to_string())
    }
}

/// Resolves the `(id)` alias to the table's primary key.
///
/// Only a table with exactly one primary-key column has an unambiguous
/// alias; otherwise the text is returned unchanged. The bare form is
/// replaced only between spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdFilter;

impl Filter for IdFilter {
    fn apply(&self, sql: &str, dialect: &dyn Dialect, table: Option<&Table>) -> String {
        let pk = match table.map(Table::primary_keys) {
            Some([pk]) => dialect.quote(pk),
            _ => return sql.to_string(),
        };

        let generic = format!("{GENERIC_QUOTE}{ID_ALIAS}{GENERIC_QUOTE}");
        let sql = sql.replace(&generic, &pk);
        let sql = sql.replace(&dialect.quote(ID_ALIAS), &pk);
        sql.replace(&format!(" {ID_ALIAS} "), &format!(" {pk} "))
    }
}

/// Renumbers `?` placeholders as `<prefix><n>`, counting from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqFilter {
    pub prefix: String,
    pub start: usize,
}

impl SeqFilter {
    #[must_use]
    pub fn new(prefix: impl Into<String>, start: usize) -> Self {
        Self {
            prefix: prefix.into(),
            start,
        }
    }
}

impl Filter for SeqFilter {
    fn apply(&self, sql: &str, _dialect: &dyn Dialect, _table: Option<&Table>) -> String {
        let mut parts = sql.split(GENERIC_PLACEHOLDER);
        let mut out = String::with_capacity(sql.len() + 8);
        if let Some(first) = parts.next() {
            out.push_str(first);
        }
        for (n, part) in (self.start..).zip(parts) {
            out.push_str(&self.prefix);
            out.push_str(&n.to_string());
            out.push_str(part);
        }
        out
    }
}

/// Runs every filter of `dialect` over `sql`.
///
/// ```ignore
/// let sql = rewrite(postgres.as_ref(), "SELECT `name` FROM `user` WHERE `(id)` = ?", Some(&user));
/// assert_eq!(sql, r#"SELECT "name" FROM "user" WHERE "id" = $1"#);
/// ```
#[must_use]
pub fn rewrite(dialect: &dyn Dialect, sql: &str, table: Option<&Table>) -> String {
    dialect
        .filters()
        .iter()
        .fold(sql.to_string(), |sql, filter| filter.apply(&sql, dialect, table))
}
