//! The contract every SQL backend implements.
//!
//! A [`Dialect`] knows how its backend spells types and identifiers, which
//! optional clauses it accepts, how to check for and introspect existing
//! schema objects, and which [`Filter`]s turn generic SQL into SQL it
//! understands. The DDL generator is shared through default methods;
//! backends override only the statements they spell differently.

mod base;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;

use futures::future::BoxFuture;
use tracing::debug;

pub use base::DialectBase;

use crate::error::Result;
use crate::filter::Filter;
use crate::schema::{Column, Index, IndexType, Table};
use crate::uri::{DbType, Uri};

/// A query checking for the existence of a schema object, with its
/// positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckQuery {
    pub sql: String,
    pub args: Vec<String>,
}

impl CheckQuery {
    #[must_use]
    pub fn new<I, S>(sql: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Backend-specific behaviour.
pub trait Dialect: Send + Sync {
    /// Binds the dialect to a parsed connection descriptor.
    fn init(&mut self, uri: Uri, driver_name: &str, data_source_name: &str) -> Result<()>;

    fn uri(&self) -> &Uri;

    fn db_type(&self) -> DbType {
        self.uri().db_type.clone()
    }

    fn driver_name(&self) -> &str;

    fn data_source_name(&self) -> &str;

    /// Applies backend-specific parameters. Unknown keys are ignored.
    fn set_params(&mut self, _params: HashMap<String, String>) {}

    /// Identifier quote character.
    fn quote_char(&self) -> char;

    /// Quotes an identifier.
    fn quote(&self, name: &str) -> String {
        let q = self.quote_char();
        format!("{q}{name}{q}")
    }

    /// Keyword appended to an auto-incrementing primary key, possibly empty.
    fn auto_incr_str(&self) -> &'static str;

    /// Whether `INSERT ... VALUES (...), (...)` is accepted.
    fn supports_insert_many(&self) -> bool;

    /// Whether `CREATE TABLE` accepts an `ENGINE=` clause.
    fn supports_engine(&self) -> bool;

    /// Whether `CREATE TABLE` accepts a `DEFAULT CHARSET` clause.
    fn supports_charset(&self) -> bool;

    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    /// Whether index names are scoped to their table rather than to the
    /// whole database.
    fn index_on_table(&self) -> bool;

    /// Whether column definitions spell out `NULL` as well as `NOT NULL`.
    fn show_create_null(&self) -> bool {
        true
    }

    /// Native type of a column, including length suffixes.
    fn sql_type(&self, col: &Column) -> String;

    /// One-time adjustment of a mapped column before it is added to a
    /// table.
    fn normalize_column(&self, _col: &mut Column) {}

    fn table_check_sql(&self, table: &str) -> CheckQuery;

    fn column_check_sql(&self, table: &str, column: &str) -> CheckQuery;

    fn index_check_sql(&self, table: &str, index: &Index) -> CheckQuery;

    /// Columns of `table`, in catalog order.
    fn get_columns<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Column>>>;

    /// All user tables, without columns or indexes.
    fn get_tables(&self) -> BoxFuture<'_, Result<Vec<Table>>>;

    /// Secondary indexes of `table`, under their logical names.
    fn get_indexes<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Index>>>;

    /// Rewrite passes applied to generic SQL, in order.
    fn filters(&self) -> Vec<Box<dyn Filter>>;

    /// Extra clause appended to a column definition.
    fn column_comment_clause(&self, _col: &Column) -> Option<String> {
        None
    }

    /// One column definition. With `inline_pk`, a primary-key column
    /// carries its own `PRIMARY KEY` clause.
    fn column_sql(&self, col: &Column, inline_pk: bool) -> String {
        let mut sql = format!("{} {}", self.quote(&col.name), self.sql_type(col));
        if inline_pk && col.is_primary_key {
            sql.push_str(" PRIMARY KEY");
            let auto = self.auto_incr_str();
            if col.is_auto_increment && !auto.is_empty() {
                sql.push(' ');
                sql.push_str(auto);
            }
        }
        if self.show_create_null() {
            sql.push_str(if col.nullable { " NULL" } else { " NOT NULL" });
        } else if !col.nullable {
            sql.push_str(" NOT NULL");
        }
        if col.has_default() {
            sql.push_str(" DEFAULT ");
            sql.push_str(&col.default);
        }
        if let Some(clause) = self.column_comment_clause(col) {
            sql.push(' ');
            sql.push_str(&clause);
        }
        sql
    }

    /// `CREATE TABLE IF NOT EXISTS` for `table`.
    ///
    /// `table_name` overrides the table's own name. `store_engine` and
    /// `charset` fall back to the table's settings; the charset finally
    /// falls back to the connection charset. Each suffix is emitted only
    /// when the backend supports it.
    fn create_table_sql(
        &self,
        table: &Table,
        table_name: Option<&str>,
        store_engine: Option<&str>,
        charset: Option<&str>,
    ) -> String {
        let name = table_name.unwrap_or(&table.name);
        let pks = table.primary_keys();
        let inline_pk = pks.len() == 1;

        let mut defs: Vec<String> =
            table.columns().map(|c| self.column_sql(c, inline_pk)).collect();
        if pks.len() > 1 {
            let cols: Vec<String> = pks.iter().map(|c| self.quote(c)).collect();
            defs.push(format!("PRIMARY KEY ( {} )", cols.join(",")));
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote(name),
            defs.join(", ")
        );

        if self.supports_engine() {
            let engine = store_engine.unwrap_or(&table.store_engine);
            if !engine.is_empty() {
                sql.push_str(" ENGINE=");
                sql.push_str(engine);
            }
        }
        if self.supports_charset() {
            let charset = [
                charset.unwrap_or(""),
                table.charset.as_str(),
                self.uri().charset.as_str(),
            ]
            .into_iter()
            .find(|c| !c.is_empty());
            if let Some(charset) = charset {
                sql.push_str(" DEFAULT CHARSET ");
                sql.push_str(charset);
            }
        }
        sql.push(';');

        debug!(table = %name, sql = %sql, "generated create table");
        sql
    }

    fn drop_table_sql(&self, table: &str) -> String {
        if self.supports_drop_if_exists() {
            format!("DROP TABLE IF EXISTS {}", self.quote(table))
        } else {
            format!("DROP TABLE {}", self.quote(table))
        }
    }

    /// `CREATE [UNIQUE] INDEX` under the index's physical name.
    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        let unique = if index.index_type == IndexType::Unique {
            " UNIQUE"
        } else {
            ""
        };
        let cols: Vec<String> = index.cols.iter().map(|c| self.quote(c)).collect();
        format!(
            "CREATE{unique} INDEX {} ON {} ({});",
            self.quote(&index.x_name(table)),
            self.quote(table),
            cols.join(",")
        )
    }

    fn drop_index_sql(&self, table: &str, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote(&physical_index_name(table, index)),
            self.quote(table)
        )
    }

    fn add_column_sql(&self, table: &str, col: &Column) -> String {
        format!("ALTER TABLE {} ADD {}", self.quote(table), self.column_sql(col, true))
    }

    fn modify_column_sql(&self, table: &str, col: &Column) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.quote(table),
            self.column_sql(col, false)
        )
    }

    /// Adds a row-locking clause to a `SELECT`.
    fn for_update_sql(&self, query: &str) -> String {
        format!("{query} FOR UPDATE")
    }
}

/// Name an index carries in the catalog: the prefixed form for indexes
/// created under the naming convention, the raw name otherwise.
#[must_use]
pub fn physical_index_name(table: &str, index: &Index) -> String {
    if index.is_regular {
        index.x_name(table)
    } else {
        index.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::TestDialect;
    use super::*;
    use crate::types::{SqlType, SqlTypeName};

    fn int(name: &str) -> Column {
        Column::new(name, SqlType::new(SqlTypeName::Int))
    }

    #[test]
    fn test_single_pk_is_inline() {
        let dialect = TestDialect::new();
        let table = Table::new("user")
            .column(int("id").primary_key().auto_increment())
            .unwrap()
            .column(
                Column::new("name", SqlType::with_lengths(SqlTypeName::Varchar, 255, 0))
                    .not_null(),
            )
            .unwrap();

        let sql = dialect.create_table_sql(&table, None, None, None);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `user` (`id` INT PRIMARY KEY AUTO_INCREMENT NOT NULL, \
             `name` VARCHAR(255) NOT NULL);"
        );
        assert_eq!(sql.matches("PRIMARY KEY").count(), 1);
    }

    #[test]
    fn test_composite_pk_is_trailing() {
        let dialect = TestDialect::new();
        let table = Table::new("t")
            .column(int("a").primary_key())
            .unwrap()
            .column(int("b").primary_key())
            .unwrap()
            .column(int("c").default_value("0"))
            .unwrap();

        let sql = dialect.create_table_sql(&table, None, None, None);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `t` (`a` INT NOT NULL, `b` INT NOT NULL, \
             `c` INT NULL DEFAULT 0, PRIMARY KEY ( `a`,`b` ));"
        );
        assert_eq!(sql.matches("PRIMARY KEY").count(), 1);
        for col in table.columns() {
            assert!(!dialect.column_sql(col, false).contains("PRIMARY KEY"));
        }
    }

    #[test]
    fn test_no_pk_has_no_key_clause() {
        let dialect = TestDialect::new();
        let table = Table::new("log").column(int("n")).unwrap();
        let sql = dialect.create_table_sql(&table, Some("log_2024"), None, None);
        assert_eq!(sql, "CREATE TABLE IF NOT EXISTS `log_2024` (`n` INT NULL);");
    }

    #[test]
    fn test_engine_and_charset_need_support() {
        let table = Table::new("t").column(int("n")).unwrap();

        let plain = TestDialect::new();
        let sql = plain.create_table_sql(&table, None, Some("InnoDB"), Some("utf8mb4"));
        assert!(!sql.contains("ENGINE"));
        assert!(!sql.contains("CHARSET"));

        let capable = TestDialect::new().with_engine_and_charset("latin1");
        let sql = capable.create_table_sql(&table, None, Some("InnoDB"), Some("utf8mb4"));
        assert!(sql.ends_with(") ENGINE=InnoDB DEFAULT CHARSET utf8mb4;"));

        // charset falls back to the connection's
        let sql = capable.create_table_sql(&table, None, None, None);
        assert!(sql.ends_with(") DEFAULT CHARSET latin1;"));
    }

    #[test]
    fn test_index_statements() {
        let dialect = TestDialect::new();
        let index = Index::unique("email").columns(["email", "tenant"]);
        assert_eq!(
            dialect.create_index_sql("user", &index),
            "CREATE UNIQUE INDEX `UQE_user_email` ON `user` (`email`,`tenant`);"
        );
        assert_eq!(
            dialect.drop_index_sql("user", &index),
            "DROP INDEX `UQE_user_email` ON `user`"
        );

        let mut custom = Index::new("legacy_idx", IndexType::NonUnique);
        custom.is_regular = false;
        assert_eq!(dialect.drop_index_sql("user", &custom), "DROP INDEX `legacy_idx` ON `user`");
    }

    #[test]
    fn test_alter_statements() {
        let dialect = TestDialect::new();
        assert_eq!(
            dialect.add_column_sql("user", &int("age").not_null().default_value("0")),
            "ALTER TABLE `user` ADD `age` INT NOT NULL DEFAULT 0"
        );
        assert_eq!(
            dialect.modify_column_sql("user", &int("age")),
            "ALTER TABLE `user` MODIFY COLUMN `age` INT NULL"
        );
        assert_eq!(dialect.drop_table_sql("user"), "DROP TABLE IF EXISTS `user`");
        assert_eq!(
            dialect.for_update_sql("SELECT 1"),
            "SELECT 1 FOR UPDATE"
        );
    }
}
