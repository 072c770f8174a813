//! PostgreSQL backend.

pub mod catalog;
mod dialect;
mod driver;

pub use dialect::PostgresDialect;
pub use driver::PostgresDriver;
