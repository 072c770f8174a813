//! PostgreSQL dialect.

use std::collections::HashMap;

use futures::future::BoxFuture;
use oxide_schema_core::dialect::physical_index_name;
use oxide_schema_core::{
    CheckQuery, Column, DbType, Dialect, DialectBase, Filter, IdFilter, Index, QuoteFilter,
    Result, SchemaError, SeqFilter, SqlTypeName, Table, Uri,
};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::ConnectOptions;
use tracing::debug;

use super::catalog::{self, ColumnRow};
use crate::conn::{bounded, finish};

const DEFAULT_SCHEMA: &str = "public";

const COLUMNS_SQL: &str = r"
    SELECT
        c.column_name::text AS column_name,
        c.data_type::text AS data_type,
        c.column_default::text AS default_value,
        COALESCE(c.character_maximum_length,
                 CASE WHEN c.data_type = 'numeric' THEN c.numeric_precision END,
                 0)::int4 AS length,
        COALESCE(CASE WHEN c.data_type = 'numeric' THEN c.numeric_scale END, 0)::int4 AS scale,
        (c.is_nullable = 'YES') AS nullable,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON tc.constraint_name = kcu.constraint_name
             AND tc.table_schema = kcu.table_schema
             AND tc.table_name = kcu.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS is_primary_key,
        col_description(
            (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass,
            c.ordinal_position::int4
        ) AS comment
    FROM information_schema.columns c
    WHERE c.table_schema = $1 AND c.table_name = $2
    ORDER BY c.ordinal_position
";

/// Dialect for PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    base: DialectBase,
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresDialect {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: DialectBase::new(DbType::POSTGRES),
        }
    }

    /// Namespace searched by introspection and check queries.
    #[must_use]
    pub fn schema(&self) -> &str {
        let schema = self.base.uri().schema.as_str();
        if schema.is_empty() {
            DEFAULT_SCHEMA
        } else {
            schema
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        let uri = self.base.uri();
        let mut options = PgConnectOptions::new();
        if !uri.host.is_empty() {
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
        options = options.database(&uri.db_name);
        options.connect().await.map_err(SchemaError::database)
    }
}

async fn read_columns(conn: &mut PgConnection, schema: &str, table: &str) -> Result<Vec<Column>> {
    debug!(schema, table, "reading columns");
    let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
        .bind(schema)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    rows.into_iter().map(ColumnRow::into_column).collect()
}

async fn read_tables(conn: &mut PgConnection, schema: &str) -> Result<Vec<Table>> {
    let sql = "SELECT tablename::text FROM pg_tables WHERE schemaname = $1 ORDER BY tablename";
    debug!(schema, sql, "reading tables");
    let rows: Vec<(String,)> = sqlx::query_as(sql)
        .bind(schema)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;
    Ok(rows.into_iter().map(|(name,)| Table::new(name)).collect())
}

async fn read_indexes(conn: &mut PgConnection, schema: &str, table: &str) -> Result<Vec<Index>> {
    let sql = "SELECT indexname::text, indexdef FROM pg_indexes \
               WHERE schemaname = $1 AND tablename = $2 ORDER BY indexname";
    debug!(schema, table, sql, "reading indexes");
    let rows: Vec<(String, String)> = sqlx::query_as(sql)
        .bind(schema)
        .bind(table)
        .fetch_all(&mut *conn)
        .await
        .map_err(SchemaError::database)?;

    let mut indexes = Vec::with_capacity(rows.len());
    for (name, def) in rows {
        if name.ends_with("_pkey") {
            continue;
        }
        let index = catalog::parse_index_def(table, &name, &def).ok_or_else(|| {
            SchemaError::UnreadableIndex {
                table: table.to_string(),
                index: name,
            }
        })?;
        indexes.push(index);
    }
    Ok(indexes)
}

impl Dialect for PostgresDialect {
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

    fn set_params(&mut self, params: HashMap<String, String>) {
        if let Some(schema) = params.get("schema") {
            debug!(schema = %schema, "postgres schema set");
            self.base.uri_mut().schema.clone_from(schema);
        }
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn auto_incr_str(&self) -> &'static str {
        ""
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
            N::TinyInt => "SMALLINT",
            N::Bit | N::Bool | N::Boolean => "BOOLEAN",
            N::MediumInt | N::Int | N::Integer => {
                if col.is_auto_increment {
                    "SERIAL"
                } else {
                    "INTEGER"
                }
            }
            N::BigInt => {
                if col.is_auto_increment {
                    "BIGSERIAL"
                } else {
                    "BIGINT"
                }
            }
            N::Binary
            | N::VarBinary
            | N::TinyBlob
            | N::Blob
            | N::MediumBlob
            | N::LongBlob
            | N::Bytea => "BYTEA",
            N::DateTime => "TIMESTAMP",
            N::TimeStampz => "timestamp with time zone",
            N::Float => "REAL",
            N::TinyText | N::MediumText | N::LongText | N::Clob | N::NText | N::Enum | N::Set => {
                "TEXT"
            }
            N::NVarchar => "VARCHAR",
            N::NChar => "CHAR",
            N::Double => "DOUBLE PRECISION",
            N::Year => "INTEGER",
            N::SmallMoney => "MONEY",
            N::Array => "TEXT[]",
            other => other.as_str(),
        };

        let sized = matches!(
            col.sql_type.name,
            N::Char | N::NChar | N::Varchar | N::NVarchar | N::Decimal | N::Numeric
        );
        match (sized, col.length, col.length2) {
            (false, _, _) | (true, 0, _) => native.to_string(),
            (true, l, 0) => format!("{native}({l})"),
            (true, l, l2) => format!("{native}({l},{l2})"),
        }
    }

    fn normalize_column(&self, col: &mut Column) {
        if col.sql_type.name.is_serial() {
            col.is_auto_increment = true;
            col.nullable = false;
        }
    }

    fn table_check_sql(&self, table: &str) -> CheckQuery {
        CheckQuery::new(
            "SELECT tablename FROM pg_tables WHERE schemaname = $1 AND tablename = $2",
            [self.schema(), table],
        )
    }

    fn column_check_sql(&self, table: &str, column: &str) -> CheckQuery {
        CheckQuery::new(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 AND column_name = $3",
            [self.schema(), table, column],
        )
    }

    fn index_check_sql(&self, table: &str, index: &Index) -> CheckQuery {
        CheckQuery::new(
            "SELECT indexname FROM pg_indexes WHERE schemaname = $1 AND tablename = $2 AND indexname = $3",
            [self.schema().to_string(), table.to_string(), physical_index_name(table, index)],
        )
    }

    fn get_columns<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Column>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let columns = read_columns(&mut conn, self.schema(), table).await;
            finish(conn, columns).await
        }))
    }

    fn get_tables(&self) -> BoxFuture<'_, Result<Vec<Table>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let tables = read_tables(&mut conn, self.schema()).await;
            finish(conn, tables).await
        }))
    }

    fn get_indexes<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<Vec<Index>>> {
        Box::pin(bounded(self.uri(), async move {
            let mut conn = self.connect().await?;
            let indexes = read_indexes(&mut conn, self.schema(), table).await;
            finish(conn, indexes).await
        }))
    }

    fn filters(&self) -> Vec<Box<dyn Filter>> {
        vec![Box::new(QuoteFilter), Box::new(IdFilter), Box::new(SeqFilter::new("$", 1))]
    }

    fn drop_index_sql(&self, table: &str, index: &Index) -> String {
        let name = self.quote(&physical_index_name(table, index));
        let schema = self.uri().schema.as_str();
        if schema.is_empty() {
            format!("DROP INDEX {name}")
        } else {
            format!("DROP INDEX {}.{name}", self.quote(schema))
        }
    }

    fn modify_column_sql(&self, table: &str, col: &Column) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote(table),
            self.quote(&col.name),
            self.sql_type(col)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_schema_core::{filter, IndexType, SqlType};

    fn col(name: &str, t: SqlTypeName) -> Column {
        Column::new(name, SqlType::new(t))
    }

    fn user_table() -> Table {
        Table::new("user")
            .column(col("id", SqlTypeName::BigInt).primary_key().auto_increment())
            .unwrap()
            .column(col("name", SqlTypeName::Varchar).lengths(255, 0).not_null())
            .unwrap()
            .column(col("joined", SqlTypeName::DateTime))
            .unwrap()
    }

    #[test]
    fn test_sql_type() {
        let d = PostgresDialect::new();
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Int).auto_increment()), "SERIAL");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Int)), "INTEGER");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Blob)), "BYTEA");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Double)), "DOUBLE PRECISION");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::TimeStampz)), "timestamp with time zone");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Varchar).lengths(64, 0)), "VARCHAR(64)");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Decimal).lengths(10, 2)), "DECIMAL(10,2)");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Int).lengths(11, 0)), "INTEGER");
        assert_eq!(d.sql_type(&col("a", SqlTypeName::Jsonb)), "JSONB");
    }

    #[test]
    fn test_create_table() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.create_table_sql(&user_table(), None, Some("InnoDB"), None),
            "CREATE TABLE IF NOT EXISTS \"user\" (\"id\" BIGSERIAL PRIMARY KEY NOT NULL, \
             \"name\" VARCHAR(255) NOT NULL, \"joined\" TIMESTAMP NULL);"
        );
    }

    #[test]
    fn test_schema_param() {
        let mut d = PostgresDialect::new();
        assert_eq!(d.schema(), "public");
        assert_eq!(d.table_check_sql("user").args, ["public", "user"]);

        d.set_params(HashMap::from([("schema".to_string(), "sales".to_string())]));
        assert_eq!(d.schema(), "sales");
        assert_eq!(d.column_check_sql("user", "name").args, ["sales", "user", "name"]);

        let index = Index::new("name", IndexType::NonUnique);
        assert_eq!(d.index_check_sql("user", &index).args, ["sales", "user", "IDX_user_name"]);
        assert_eq!(d.drop_index_sql("user", &index), "DROP INDEX \"sales\".\"IDX_user_name\"");
    }

    #[test]
    fn test_alter_statements() {
        let d = PostgresDialect::new();
        let name = col("name", SqlTypeName::Varchar).lengths(64, 0);
        assert_eq!(
            d.modify_column_sql("user", &name),
            "ALTER TABLE \"user\" ALTER COLUMN \"name\" TYPE VARCHAR(64)"
        );
        let index = Index::unique("name").columns(["name"]);
        assert_eq!(d.drop_index_sql("user", &index), "DROP INDEX \"UQE_user_name\"");
    }

    #[test]
    fn test_rewrite_generic_sql() {
        let d = PostgresDialect::new();
        let table = user_table();
        assert_eq!(
            filter::rewrite(
                &d,
                "SELECT `name` FROM `user` WHERE `(id)` = ? AND `name` = ?",
                Some(&table)
            ),
            "SELECT \"name\" FROM \"user\" WHERE \"id\" = $1 AND \"name\" = $2"
        );
    }
}
