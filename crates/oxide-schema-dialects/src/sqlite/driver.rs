//! SQLite data source names.

use oxide_schema_core::{DbType, Driver, Result, SchemaError, Uri};

/// Parses SQLite data source names: a file path, optionally written as
/// `file:path`, `sqlite:path` or `sqlite://path`, with query parameters
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn parse(&self, _driver_name: &str, data_source_name: &str) -> Result<Uri> {
        let mut path = data_source_name.trim();
        for prefix in ["sqlite://", "sqlite:", "file:"] {
            if let Some(rest) = path.strip_prefix(prefix) {
                path = rest;
                break;
            }
        }
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        if path.is_empty() {
            return Err(SchemaError::InvalidDsn(data_source_name.to_string()));
        }

        let mut uri = Uri::new(DbType::SQLITE);
        uri.db_name = path.to_string();
        Ok(uri)
    }
}
