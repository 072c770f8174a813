//! MySQL dialect.

use futures::future::BoxFuture;
use oxide_schema_core::dialect::physical_index_name;
use oxide_schema_core::{
    CheckQuery, Column, DbType, Dialect, DialectBase, Filter, IdFilter, Index, Result,
    SchemaError, SqlTypeName, Table, Uri,
};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode};
use sqlx::ConnectOptions;
use tracing::debug;

use super::catalog::{self, ColumnRow, IndexRow};
use crate::conn::{bounded, finish, quote_literal};

const COLUMNS_SQL: &str = r"
    SELECT
        CAST(COLUMN_NAME AS CHAR(255)) AS column_name,
        CAST(COLUMN_TYPE AS CHAR(1024)) AS column_type,
        CAST(COLUMN_DEFAULT AS CHAR(1024)) AS column_default,
        CAST(IS_NULLABLE AS CHAR(3)) AS is_nullable,
        CAST(COLUMN_KEY AS CHAR(3)) AS column_key,
        CAST(EXTRA AS CHAR(255)) AS extra,
        CAST(COLUMN_COMMENT AS CHAR(1024)) AS column_comment
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
";

const TABLES_SQL: &str = r"
    SELECT
        CAST(TABLE_NAME AS CHAR(255)) AS table_name,
        CAST(COALESCE(ENGINE, '') AS CHAR(64)) AS engine,
        CAST(COALESCE(TABLE_COMMENT, '') AS CHAR(2048)) AS table_comment
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
";

const INDEXES_SQL: &str = r"
    SELECT
        CAST(INDEX_NAME AS CHAR(255)) AS index_name,
        CAST(COLUMN_NAME AS CHAR(255)) AS column_name,
        CAST(NON_UNIQUE AS SIGNED) AS non_unique
    FROM INFORMATION_SCHEMA.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
    ORDER BY INDEX_NAME, SEQ_IN_INDEX
";

/// Dialect for MySQL and MariaDB.
#[derive(Debug, Clone)]
pub struct MysqlDialect {
    base: DialectBase,
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl MysqlDialect {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: DialectBase::new(DbType::MYSQL),
        }
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        let uri = self.base.uri();
        let mut options = MySqlConnectOptions::new()
            .database(&uri.db_name)
            .ssl_mode(MySqlSslMode::Preferred);
        if uri.proto == "unix" {
            options = options.socket(&uri.host);
        } else if !uri.host.is_empty() {
            options = options.host(&uri.host);
        }
        if let Some(port) = uri.port {
            options = options.port(port);
        }
        if !uri.user.is_empty() {
            options = options.username(&uri.user);
        }
        if !uri.passwd.is_empty() {
            options = options.password(&uri.passwd);
        }
        if !uri.charset.is_empty() {
            options = options.charset(&uri.charset);
        }
        options.connect().await.map_err(SchemaError::database)
    }
}

async fn read_columns(conn: &mut MySqlConnection, db: &str, table: &str) -> Result<Vec<Column>> {
    debug!(db, table, "reading columns");
    let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
        .bind(db)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    rows.into_iter().map(ColumnRow::into_column).collect()
}

async fn read_tables(conn: &mut MySqlConnection, db: &str) -> Result<Vec<Table>> {
    debug!(db, "reading tables");
    let rows: Vec<(String, String, String)> = sqlx::query_as(TABLES_SQL)
        .bind(db)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    Ok(rows
        .into_iter()
        .map(|(name, engine, comment)| {
            let mut table = Table::new(name);
            table.store_engine = engine;
            table.comment = comment;
            table
        })
        .collect())
}

async fn read_indexes(conn: &mut MySqlConnection, db: &str, table: &str) -> Result<Vec<Index>> {
    debug!(db, table, "reading indexes");
    let rows: Vec<IndexRow> = sqlx::query_as(INDEXES_SQL)
        .bind(db)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    Ok(catalog::group_index_rows(table, rows))
}

impl Dialect for MysqlDialect {
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
        "AUTO_INCREMENT"
    }

    fn supports_insert_many(&self) -> bool {
        true
    }

    fn supports_engine(&self) -> bool {
        true
    }

    fn supports_charset(&self) -> bool {
        true
    }

    fn index_on_table(&self) -> bool {
        true
    }

    fn sql_type(&self, col: &Column) -> String {
        use SqlTypeName as N;

        let native = match col.sql_type.name {
            N::Bool | N::Boolean => return "TINYINT(1)".to_string(),
            N::TimeStampz => return "CHAR(64)".to_string(),
            N::Uuid => return "VARCHAR(40)".to_string(),
            N::Enum | N::Set => {
                let members: Vec<String> =
                    col.enum_options.iter().map(|m| quote_literal(m)).collect();
                return format!("{}({})", col.sql_type.name, members.join(","));
            }
            N::BigInt if col.length == 0 => return "BIGINT(20)".to_string(),
            N::Serial => "INT",
            N::BigSerial => "BIGINT",
            N::Bytea => "BLOB",
            N::NVarchar => "VARCHAR",
            N::NChar => "CHAR",
            N::Json | N::Jsonb | N::Xml | N::Array | N::Clob | N::NText => "TEXT",
            N::Money | N::SmallMoney => "DECIMAL",
            other => other.as_str(),
        };

        match (col.length, col.length2) {
            (0, _) => native.to_string(),
            (l, 0) => format!("{native}({l})"),
            (l, l2) => format!("{native}({l},{l2})"),
        }
    }

    fn normalize_column(&self, col: &mut Column) {
        if col.sql_type.name.is_serial() {
            col.is_primary_key = true;
            col.is_auto_increment = true;
            col.nullable = false;
        }
    }

    fn column_comment_clause(&self, col: &Column) -> Option<String> {
        (!col.comment.is_empty()).then(|| format!("COMMENT {}", quote_literal(&col.comment)))
    }

    fn table_check_sql(&self, table: &str) -> CheckQuery {
        CheckQuery::new(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ?",
            [self.uri().db_name.as_str(), table],
        )
    }

    fn column_check_sql(&self, table: &str, column: &str) -> CheckQuery {
        CheckQuery::new(
            "SELECT `COLUMN_NAME` FROM `INFORMATION_SCHEMA`.`COLUMNS` \
             WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ? AND `COLUMN_NAME` = ?",
            [self.uri().db_name.as_str(), table, column],
        )
    }

    fn index_check_sql(&self, table: &str, index: &Index) -> CheckQuery {
        CheckQuery::new(
            "SELECT `INDEX_NAME` FROM `INFORMATION_SCHEMA`.`STATISTICS` \
             WHERE `TABLE_SCHEMA` = ? AND `TABLE_NAME` = ? AND `INDEX_NAME` = ?",
            [self.uri().db_name.clone(), table.to_string(), physical_index_name(table, index)],
        )
    }

    fn get_columns<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Column>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let columns = read_columns(&mut conn, &self.uri().db_name, table).await;
            finish(conn, columns).await
        }))
    }

    fn get_tables(&self) -> BoxFuture<'_, Result<Vec<Table>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let tables = read_tables(&mut conn, &self.uri().db_name).await;
            finish(conn, tables).await
        }))
    }

    fn get_indexes<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Index>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let indexes = read_indexes(&mut conn, &self.uri().db_name, table).await;
            finish(conn, indexes).await
        }))
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(IdFilter)]
    }
}
