//! Reading schema back from the DDL text SQLite stores in `sqlite_master`.
//!
//! SQLite keeps no structured column catalog that survives every version,
//! only the original `CREATE TABLE` and `CREATE INDEX` statements. The
//! parser here is deliberately simple: the column list is split on commas
//! and each definition on whitespace. As a result it does not handle
//!
//! - table-level constraints such as `PRIMARY KEY (a, b)`,
//! - type names of more than one word (`DOUBLE PRECISION`),
//! - commas inside a type (`NUMERIC(10,2)`) or inside a default literal,
//! - defaults containing spaces.
//!
//! These cases fail with an error or yield the naive reading; they are
//! not patched up.

use std::sync::OnceLock;

use oxide_schema_core::{Column, Index, IndexType, Result, SchemaError, SqlType};
use regex::Regex;

const IDENT_QUOTES: &[char] = &['`', '"', '[', ']', '\''];

/// Columns of a `CREATE TABLE` statement, in declaration order.
pub fn parse_create_table(table: &str, sql: &str) -> Result<Vec<Column>> {
    let (Some(start), Some(end)) = (sql.find('('), sql.rfind(')')) else {
        return Err(SchemaError::NoSuchTable(table.to_string()));
    };
    if end <= start {
        return Err(SchemaError::NoSuchTable(table.to_string()));
    }

    sql[start + 1..end]
        .split(',')
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| parse_column_def(table, fragment))
        .collect()
}

/// One column definition, e.g. `` `id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL ``.
pub fn parse_column_def(table: &str, fragment: &str) -> Result<Column> {
    let tokens: Vec<&str> = fragment.split_whitespace().collect();
    let name = tokens
        .first()
        .map(|t| t.trim_matches(IDENT_QUOTES))
        .unwrap_or_default();
    let Some(native) = tokens.get(1) else {
        return Err(SchemaError::MissingColumnType {
            table: table.to_string(),
            column: name.to_string(),
        });
    };

    let sql_type = SqlType::parse(native)?;
    let mut col = Column::new(name, sql_type);

    for (i, token) in tokens.iter().enumerate().skip(2) {
        if token.eq_ignore_ascii_case("PRIMARY") {
            col.is_primary_key = true;
        } else if token.eq_ignore_ascii_case("AUTOINCREMENT") {
            col.is_auto_increment = true;
        } else if token.eq_ignore_ascii_case("NULL") {
            col.nullable = !tokens[i - 1].eq_ignore_ascii_case("NOT");
        } else if token.eq_ignore_ascii_case("DEFAULT") {
            if let Some(value) = tokens.get(i + 1) {
                col.default = (*value).to_string();
            }
        }
    }
    Ok(col)
}

fn index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)^\s*CREATE\s+(?P<unique>UNIQUE\s+)?INDEX\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<name>`[^`]+`|"[^"]+"|\[[^\]]+\]|'[^']+'|[^\s(]+)\s+ON\s+[^(]+\((?P<cols>.*)\)"#,
        )
        .expect("Invalid create index regex")
    })
}

/// A `CREATE [UNIQUE] INDEX` statement on `table`, under its logical name.
/// Returns `None` when the statement cannot be read as an index.
pub fn parse_create_index(table: &str, sql: &str) -> Option<Index> {
    let caps = index_regex().captures(sql)?;
    let raw_name = caps.name("name")?.as_str().trim_matches(IDENT_QUOTES);
    let index_type = if caps.name("unique").is_some() {
        IndexType::Unique
    } else {
        IndexType::NonUnique
    };

    let (name, is_regular) = Index::strip_physical_prefix(table, raw_name);
    let mut index = Index::new(name, index_type);
    index.add_column(
        caps.name("cols")?
            .as_str()
            .split(',')
            .map(|c| c.trim().trim_matches(IDENT_QUOTES)),
    );
    index.is_regular = is_regular;
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_schema_core::SqlTypeName;

    #[test]
    fn test_parse_column_def() {
        let col = parse_column_def("t", "`id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL").unwrap();
        assert_eq!(col.name, "id");
        assert_eq!(col.sql_type.name, SqlTypeName::Integer);
        assert!(col.is_primary_key);
        assert!(col.is_auto_increment);
        assert!(!col.nullable);
    }

    #[test]
    fn test_parse_column_defaults_to_nullable() {
        let col = parse_column_def("t", " \"name\" TEXT(255) DEFAULT 'x'").unwrap();
        assert_eq!(col.name, "name");
        assert_eq!(col.sql_type.name, SqlTypeName::Text);
        assert_eq!(col.length, 255);
        assert!(col.nullable);
        assert_eq!(col.default, "'x'");

        let explicit = parse_column_def("t", "n INT NULL").unwrap();
        assert!(explicit.nullable);
    }

    #[test]
    fn test_parse_column_without_type() {
        let err = parse_column_def("t", "`orphan`").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumnType { ref column, .. } if column == "orphan"
        ));
    }

    #[test]
    fn test_parse_create_table() {
        let cols = parse_create_table(
            "user",
            "CREATE TABLE `user` (`id` INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
             `name` TEXT(255) NOT NULL, `score` REAL NULL DEFAULT 0)",
        )
        .unwrap();

        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "name", "score"]);
        assert_eq!(cols[2].default, "0");
    }

    #[test]
    fn test_composite_key_clause_is_not_supported() {
        let err = parse_create_table(
            "t",
            "CREATE TABLE t (a INTEGER NOT NULL, b INTEGER NOT NULL, PRIMARY KEY ( a,b ))",
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSqlType { ref native } if native == "KEY"));
    }

    #[test]
    fn test_comma_in_precision_is_not_supported() {
        let err =
            parse_create_table("t", "CREATE TABLE t (amount NUMERIC(10,2) NOT NULL)").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSqlType { .. }));
    }

    #[test]
    fn test_multi_word_type_reads_first_word() {
        let cols = parse_create_table("t", "CREATE TABLE t (x DOUBLE PRECISION NOT NULL)").unwrap();
        assert_eq!(cols[0].sql_type.name, SqlTypeName::Double);

        let err = parse_create_table("t", "CREATE TABLE t (x CHARACTER VARYING(20))").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSqlType { ref native } if native == "CHARACTER"));
    }

    #[test]
    fn test_parse_create_index() {
        let index = parse_create_index(
            "user",
            "CREATE UNIQUE INDEX `UQE_user_email` ON `user` (`email`,`tenant`)",
        )
        .unwrap();
        assert_eq!(index.name, "email");
        assert!(index.is_unique());
        assert!(index.is_regular);
        assert_eq!(index.cols, ["email", "tenant"]);

        let custom = parse_create_index(
            "user",
            "CREATE INDEX IF NOT EXISTS by_name ON user (name)",
        )
        .unwrap();
        assert_eq!(custom.name, "by_name");
        assert_eq!(custom.index_type, IndexType::NonUnique);
        assert!(!custom.is_regular);
        assert_eq!(custom.cols, ["name"]);
    }

    #[test]
    fn test_parse_create_index_across_lines() {
        let index =
            parse_create_index("user", "CREATE INDEX IDX_user_name\nON user (name)").unwrap();
        assert_eq!(index.name, "name");
        assert!(index.is_regular);
        assert_eq!(index.cols, ["name"]);

        let tabbed = parse_create_index(
            "user",
            "CREATE UNIQUE INDEX\t\"UQE_user_email\" ON\n  \"user\" (\n  email,\n  tenant\n)",
        )
        .unwrap();
        assert_eq!(tabbed.name, "email");
        assert!(tabbed.is_unique());
        assert_eq!(tabbed.cols, ["email", "tenant"]);
    }

    #[test]
    fn test_parse_garbage_index() {
        assert!(parse_create_index("t", "CREATE VIEW v AS SELECT 1").is_none());
    }
}
