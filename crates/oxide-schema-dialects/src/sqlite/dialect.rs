//! SQLite dialect.

use futures::future::BoxFuture;
use oxide_schema_core::dialect::physical_index_name;
use oxide_schema_core::{
    CheckQuery, Column, DbType, Dialect, DialectBase, Filter, IdFilter, Index, Result,
    SchemaError, SqlTypeName, Table, Uri,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;
use tracing::{debug, warn};

use super::ddl;
use crate::conn::{bounded, finish};

/// Dialect for SQLite 3.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    base: DialectBase,
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteDialect {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: DialectBase::new(DbType::SQLITE),
        }
    }

    async fn connect(&self) -> Result<SqliteConnection> {
        SqliteConnectOptions::new()
            .filename(&self.base.uri().db_name)
            .create_if_missing(false)
            .connect()
            .await
            .map_err(SchemaError::database)
    }
}

async fn read_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<Column>> {
    let sql = "SELECT sql FROM sqlite_master WHERE type='table' AND name = ?";
    debug!(table, sql, "reading table definition");
    let row: Option<(String,)> = sqlx::query_as(sql)
        .bind(table)
        .fetch_optional(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    let (ddl_text,) = row.ok_or_else(|| SchemaError::NoSuchTable(table.to_string()))?;
    ddl::parse_create_table(table, &ddl_text)
}

async fn read_tables(conn: &mut SqliteConnection) -> Result<Vec<Table>> {
    // The sqlite_ prefix is reserved for internal tables (sequence, stat1, stat4).
    let sql = r"SELECT name FROM sqlite_master
                WHERE type='table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'";
    debug!(sql, "reading tables");
    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    Ok(rows.into_iter().map(|(name,)| Table::new(name)).collect())
}

async fn read_indexes(conn: &mut SqliteConnection, table: &str) -> Result<Vec<Index>> {
    let sql = "SELECT name, sql FROM sqlite_master WHERE type='index' AND tbl_name = ?";
    debug!(table, sql, "reading indexes");
    let rows: Vec<(String, Option<String>)> = sqlx::query_as(sql)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;

    let mut indexes = Vec::with_capacity(rows.len());
    for (name, index_sql) in rows {
        // Automatic indexes backing UNIQUE and PRIMARY KEY constraints have no DDL.
        let Some(index_sql) = index_sql else {
            warn!(table, index = %name, "skipping index without definition");
            continue;
        };
        let index = ddl::parse_create_index(table, &index_sql).ok_or_else(|| {
            SchemaError::UnreadableIndex {
                table: table.to_string(),
                index: name,
            }
        })?;
        indexes.push(index);
    }
    Ok(indexes)
}

impl Dialect for SqliteDialect {
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
        '`'
    }

    fn auto_incr_str(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn supports_insert_many(&self) -> bool {
        true
    }

    fn supports_engine(&self) -> bool {
        false
    }

    fn supports_charset(&self) -> bool {
        false
    }

    fn index_on_table(&self) -> bool {
        false
    }

    fn sql_type(&self, col: &Column) -> String {
        use SqlTypeName as N;

        let native = match col.sql_type.name {
            N::Bool | N::Boolean => "INTEGER",
            N::Date | N::DateTime | N::TimeStamp | N::Time => "DATETIME",
            N::TimeStampz
            | N::Char
            | N::Varchar
            | N::NChar
            | N::NVarchar
            | N::TinyText
            | N::Text
            | N::NText
            | N::Clob
            | N::MediumText
            | N::LongText
            | N::Json
            | N::Jsonb
            | N::Xml
            | N::Uuid
            | N::Enum
            | N::Set
            | N::Array => "TEXT",
            N::Bit
            | N::TinyInt
            | N::SmallInt
            | N::MediumInt
            | N::Int
            | N::Integer
            | N::BigInt
            | N::Serial
            | N::BigSerial
            | N::Year => "INTEGER",
            N::Float | N::Double | N::Real => "REAL",
            N::Decimal | N::Numeric | N::Money | N::SmallMoney => "NUMERIC",
            N::Binary
            | N::VarBinary
            | N::TinyBlob
            | N::Blob
            | N::MediumBlob
            | N::LongBlob
            | N::Bytea => "BLOB",
        };

        // INTEGER PRIMARY KEY AUTOINCREMENT accepts no length.
        match (native, col.length, col.length2) {
            ("INTEGER", _, _) | (_, 0, _) => native.to_string(),
            (_, l, 0) => format!("{native}({l})"),
            (_, l, l2) => format!("{native}({l},{l2})"),
        }
    }

    fn normalize_column(&self, col: &mut Column) {
        if col.sql_type.name.is_serial() {
            col.is_primary_key = true;
            col.is_auto_increment = true;
            col.nullable = false;
        }
        if col.sql_type.name.is_bool() {
            if col.default.eq_ignore_ascii_case("true") {
                col.default = "1".to_string();
            } else if col.default.eq_ignore_ascii_case("false") {
                col.default = "0".to_string();
            }
        }
    }

    fn table_check_sql(&self, table: &str) -> CheckQuery {
        CheckQuery::new("SELECT name FROM sqlite_master WHERE type='table' AND name = ?", [table])
    }

    fn column_check_sql(&self, table: &str, column: &str) -> CheckQuery {
        CheckQuery::new("SELECT name FROM pragma_table_info(?) WHERE name = ?", [table, column])
    }

    fn index_check_sql(&self, table: &str, index: &Index) -> CheckQuery {
        CheckQuery::new(
            "SELECT name FROM sqlite_master WHERE type='index' AND name = ?",
            [physical_index_name(table, index)],
        )
    }

    fn get_columns<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Column>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let columns = read_columns(&mut conn, table).await;
            finish(conn, columns).await
        }))
    }

    fn get_tables(&self) -> BoxFuture<'_, Result<Vec<Table>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let tables = read_tables(&mut conn).await;
            finish(conn, tables).await
        }))
    }

    fn get_indexes<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Index>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let indexes = read_indexes(&mut conn, table).await;
            finish(conn, indexes).await
        }))
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(IdFilter)]
    }

    fn drop_index_sql(&self, table: &str, index: &Index) -> String {
        format!("DROP INDEX {}", self.quote(&physical_index_name(table, index)))
    }

    fn for_update_sql(&self, query: &str) -> String {
        query.to_string()
    }
}
