//! Error types for schema metadata, dialects and introspection.

use std::time::Duration;

/// Boxed error coming from a database driver.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building, translating or introspecting schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A native type name has no entry in the canonical vocabulary.
    #[error("unknown SQL type '{native}'")]
    UnknownSqlType {
        /// The type name as reported by the backend or attribute.
        native: String,
    },

    /// A column definition carried no type at all.
    #[error("column '{column}' of table '{table}' has no declared type")]
    MissingColumnType {
        /// Table being introspected.
        table: String,
        /// Column without a type token.
        column: String,
    },

    /// A column with the same (case-insensitive) name already exists.
    #[error("column '{column}' already exists in table '{table}'")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// An index references a column the table does not have.
    #[error("index '{index}' references unknown column '{column}' of table '{table}'")]
    UnknownIndexColumn {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// Missing column name.
        column: String,
    },

    /// An index definition in the catalog could not be read.
    #[error("cannot read definition of index '{index}' on table '{table}'")]
    UnreadableIndex {
        /// Table name.
        table: String,
        /// Physical index name.
        index: String,
    },

    /// The catalog holds no definition for the requested table.
    #[error("no table named '{0}'")]
    NoSuchTable(String),

    /// A struct field nests deeper than one level.
    #[error("field '{0}' nests deeper than one level")]
    NestingTooDeep(String),

    /// A connection string could not be parsed.
    #[error("invalid data source name: {0}")]
    InvalidDsn(String),

    /// No driver is registered under this name.
    #[error("no driver registered as '{0}'")]
    UnsupportedDriver(String),

    /// No dialect is registered for this backend tag.
    #[error("no dialect registered for backend '{0}'")]
    UnsupportedDialect(String),

    /// A database call did not finish within the configured timeout.
    #[error("database call timed out after {0:?}")]
    Timeout(Duration),

    /// Connectivity or query error reported by the driver.
    #[error("database error: {0}")]
    Database(#[source] BoxError),
}

impl SchemaError {
    /// Wraps a driver error.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Box::new(err))
    }

    /// Builds an [`SchemaError::UnknownSqlType`] for `native`.
    pub fn unknown_type(native: impl Into<String>) -> Self {
        Self::UnknownSqlType {
            native: native.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
