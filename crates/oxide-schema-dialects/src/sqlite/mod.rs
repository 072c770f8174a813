//! SQLite backend.

pub mod ddl;
mod dialect;
mod driver;

pub use dialect::SqliteDialect;
pub use driver::SqliteDriver;
