//! # oxide-schema-dialects
//!
//! SQLite, PostgreSQL and MySQL implementations of the
//! [`Dialect`](oxide_schema_core::Dialect) contract, with live catalog
//! introspection over `sqlx`, plus the process-wide registry that maps
//! driver names and backend tags to them.
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_schema_core::introspect;
//!
//! let dialect = oxide_schema_dialects::open_dialect("sqlite3", "app.db")?;
//! for table in introspect::load_tables(dialect.as_ref()).await? {
//!     println!("{}: {:?}", table.name, table.columns_seq());
//! }
//! ```
//!
//! | driver name          | backend tag | dialect              |
//! |----------------------|-------------|----------------------|
//! | `sqlite3`, `sqlite`  | `sqlite3`   | [`SqliteDialect`]    |
//! | `postgres`           | `postgres`  | [`PostgresDialect`]  |
//! | `mysql`              | `mysql`     | [`MysqlDialect`]     |
//!
//! `mssql` and `oracle` tags exist in the vocabulary but have no built-in
//! backend; register one with [`register_dialect`] and [`register_driver`].

mod conn;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

use std::sync::{Arc, OnceLock};

use oxide_schema_core::{DbType, Dialect, DialectFactory, Driver, Registry, Result, SchemaError};
use tracing::info;

pub use mysql::{MysqlDialect, MysqlDriver};
pub use postgres::{PostgresDialect, PostgresDriver};
pub use sqlite::{SqliteDialect, SqliteDriver};

fn sqlite_dialect() -> Box<dyn Dialect> {
    Box::new(SqliteDialect::new())
}

fn postgres_dialect() -> Box<dyn Dialect> {
    Box::new(PostgresDialect::new())
}

fn mysql_dialect() -> Box<dyn Dialect> {
    Box::new(MysqlDialect::new())
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = Registry::new();
        registry.register_dialect(DbType::SQLITE, sqlite_dialect);
        registry.register_dialect(DbType::POSTGRES, postgres_dialect);
        registry.register_dialect(DbType::MYSQL, mysql_dialect);

        registry.register_driver("sqlite3", Arc::new(SqliteDriver));
        registry.register_driver("sqlite", Arc::new(SqliteDriver));
        registry.register_driver("postgres", Arc::new(PostgresDriver));
        registry.register_driver("mysql", Arc::new(MysqlDriver));
        registry
    })
}

/// Registers a dialect in the global registry.
///
/// # Panics
///
/// Panics if a dialect is already registered for `db_type`, including the
/// built-in ones.
pub fn register_dialect(db_type: DbType, factory: DialectFactory) {
    registry().register_dialect(db_type, factory);
}

/// Registers a driver in the global registry.
///
/// # Panics
///
/// Panics if a driver is already registered as `name`.
pub fn register_driver(name: &str, driver: Arc<dyn Driver>) {
    registry().register_driver(name, driver);
}

/// A fresh, uninitialized dialect for `db_type`.
#[must_use]
pub fn query_dialect(db_type: &DbType) -> Option<Box<dyn Dialect>> {
    registry().query_dialect(db_type)
}

#[must_use]
pub fn query_driver(name: &str) -> Option<Arc<dyn Driver>> {
    registry().query_driver(name)
}

/// Backend tags with a registered dialect.
#[must_use]
pub fn dialect_tags() -> Vec<DbType> {
    registry().dialect_tags()
}

/// Parses `data_source_name` with the driver `driver_name` and returns the
/// matching dialect, initialized with the result.
///
/// # Errors
///
/// [`SchemaError::UnsupportedDriver`] when no driver is registered under
/// `driver_name`, [`SchemaError::UnsupportedDialect`] when the parsed
/// backend has no dialect, and any error of the driver's parser.
pub fn open_dialect(driver_name: &str, data_source_name: &str) -> Result<Box<dyn Dialect>> {
    let driver =
        query_driver(driver_name)
            .ok_or_else(|| SchemaError::UnsupportedDriver(driver_name.to_string()))?;
    let uri = driver.parse(driver_name, data_source_name)?;
    let mut dialect = query_dialect(&uri.db_type)
        .ok_or_else(|| SchemaError::UnsupportedDialect(uri.db_type.to_string()))?;
    info!(driver = driver_name, db_type = %uri.db_type, "opening dialect");
    dialect.init(uri, driver_name, data_source_name)?;
    Ok(dialect)
}
