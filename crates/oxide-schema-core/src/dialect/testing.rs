//! In-memory dialect for unit tests.

use futures::future::BoxFuture;

use super::{CheckQuery, Dialect, DialectBase};
use crate::error::Result;
use crate::filter::{Filter, IdFilter, QuoteFilter, SeqFilter};
use crate::schema::{Column, Index, Table};
use crate::uri::{DbType, Uri};

/// Backtick-quoting dialect with `?` placeholders and no catalog.
pub struct TestDialect {
    base: DialectBase,
    quote: char,
    engine_and_charset: bool,
    numbered: bool,
}

impl TestDialect {
    pub fn new() -> Self {
        Self {
            base: DialectBase::new(DbType::new("test")),
            quote: '`',
            engine_and_charset: false,
            numbered: false,
        }
    }

    pub fn with_engine_and_charset(mut self, charset: &str) -> Self {
        self.engine_and_charset = true;
        self.base.uri_mut().charset = charset.to_string();
        self
    }

    /// Double-quoting dialect with `$n` placeholders.
    pub fn numbered() -> Self {
        Self {
            quote: '"',
            numbered: true,
            ..Self::new()
        }
    }
}

impl Dialect for TestDialect {
    fn init(&mut self, uri: Uri, driver_name: &str, data_source_name: &str) -> Result<()> {
        self.base.init(uri, driver_name, data_source_name)
    }

    fn uri(&self) -> &Uri {
        self.base.uri()
    }

    fn driver_name(&self) -> &str {
        self.base.driver_name()
    }

    fn data_source_name(&self) -> &str {
        self.base.data_source_name()
    }

    fn quote_char(&self) -> char {
        self.quote
    }

    fn auto_incr_str(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn supports_insert_many(&self) -> bool {
        true
    }

    fn supports_engine(&self) -> bool {
        self.engine_and_charset
    }

    fn supports_charset(&self) -> bool {
        self.engine_and_charset
    }

    fn index_on_table(&self) -> bool {
        true
    }

    fn sql_type(&self, col: &Column) -> String {
        match (col.length, col.length2) {
            (0, _) => col.sql_type.name.to_string(),
            (l, 0) => format!("{}({l})", col.sql_type.name),
            (l, l2) => format!("{}({l},{l2})", col.sql_type.name),
        }
    }

    fn table_check_sql(&self, table: &str) -> CheckQuery {
        CheckQuery::new("SELECT name FROM tables WHERE name = ?", [table])
    }

    fn column_check_sql(&self, table: &str, column: &str) -> CheckQuery {
        CheckQuery::new("SELECT name FROM columns WHERE tbl = ? AND name = ?", [table, column])
    }

    fn index_check_sql(&self, table: &str, index: &Index) -> CheckQuery {
        CheckQuery::new(
            "SELECT name FROM indexes WHERE tbl = ? AND name = ?",
            [table.to_string(), index.x_name(table)],
        )
    }

    fn get_columns<'a>(&'a self, _table: &'a str) -> BoxFuture<'a, Result<Vec<Column>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_tables(&self) -> BoxFuture<'_, Result<Vec<Table>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn get_indexes<'a>(&'a self, _table: &'a str) -> BoxFuture<'a, Result<Vec<Index>>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        if self.numbered {
            vec![
                Box::new(QuoteFilter),
                Box::new(IdFilter),
                Box::new(SeqFilter::new("$", 1)),
            ]
        } else {
            vec![Box::new(IdFilter)]
        }
    }
}
