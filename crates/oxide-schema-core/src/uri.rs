//! Parsed connection descriptors.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend tag used to select a dialect.
///
/// Open set: the constants name the backends known to this crate, and a
/// third-party dialect can register under any other tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DbType(Cow<'static, str>);

impl DbType {
    pub const SQLITE: Self = Self(Cow::Borrowed("sqlite3"));
    pub const POSTGRES: Self = Self(Cow::Borrowed("postgres"));
    pub const MYSQL: Self = Self(Cow::Borrowed("mysql"));
    pub const MSSQL: Self = Self(Cow::Borrowed("mssql"));
    pub const ORACLE: Self = Self(Cow::Borrowed("oracle"));

    /// Creates a tag from any name.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DbType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Connection descriptor produced by a driver from a data source name.
///
/// Fields a backend does not use stay empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uri {
    pub db_type: DbType,
    /// Transport, e.g. `tcp` or `unix`.
    pub proto: String,
    pub host: String,
    pub port: Option<u16>,
    /// Database name, or the file path for SQLite.
    pub db_name: String,
    pub user: String,
    pub passwd: String,
    pub charset: String,
    pub laddr: String,
    pub raddr: String,
    /// Bound applied to every introspection call.
    pub timeout: Option<Duration>,
    /// Namespace inside the database (PostgreSQL `search_path`).
    pub schema: String,
}

impl Uri {
    /// Creates an empty descriptor for `db_type`.
    #[must_use]
    pub fn new(db_type: DbType) -> Self {
        Self {
            db_type,
            proto: String::new(),
            host: String::new(),
            port: None,
            db_name: String::new(),
            user: String::new(),
            passwd: String::new(),
            charset: String::new(),
            laddr: String::new(),
            raddr: String::new(),
            timeout: None,
            schema: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_type_constants_compare_with_owned() {
        assert_eq!(DbType::new("sqlite3"), DbType::SQLITE);
        assert_eq!(DbType::from("postgres"), DbType::POSTGRES);
        assert_ne!(DbType::MYSQL, DbType::MSSQL);
        assert_eq!(DbType::ORACLE.to_string(), "oracle");
    }

    #[test]
    fn test_new_uri_is_empty() {
        let uri = Uri::new(DbType::MYSQL);
        assert_eq!(uri.db_type.as_str(), "mysql");
        assert!(uri.host.is_empty());
        assert_eq!(uri.port, None);
        assert_eq!(uri.timeout, None);
    }
}
