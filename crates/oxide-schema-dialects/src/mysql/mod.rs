//! MySQL backend.

pub mod catalog;
mod dialect;
mod driver;

pub use dialect::MysqlDialect;
pub use driver::MysqlDriver;
