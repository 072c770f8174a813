//! Index metadata.

use serde::{Deserialize, Serialize};

const NON_UNIQUE_PREFIX: &str = "IDX_";
const UNIQUE_PREFIX: &str = "UQE_";

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexType {
    #[default]
    NonUnique,
    Unique,
}

/// An index on one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Logical name, without the physical prefix.
    pub name: String,
    pub index_type: IndexType,
    /// Column names, in key order.
    pub cols: Vec<String>,
    /// Whether the physical name followed the `IDX_`/`UQE_` convention.
    pub is_regular: bool,
}

impl Index {
    /// Creates an empty index.
    #[must_use]
    pub fn new(name: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            name: name.into(),
            index_type,
            cols: Vec::new(),
            is_regular: true,
        }
    }

    /// Creates a unique index.
    #[must_use]
    pub fn unique(name: impl Into<String>) -> Self {
        Self::new(name, IndexType::Unique)
    }

    /// Appends columns. Duplicates are kept.
    pub fn add_column<I, S>(&mut self, cols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cols.extend(cols.into_iter().map(Into::into));
    }

    /// Builder form of [`Index::add_column`].
    #[must_use]
    pub fn columns<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_column(cols);
        self
    }

    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.index_type == IndexType::Unique
    }

    /// Physical name used when the index is created on `table`.
    ///
    /// ```
    /// use oxide_schema_core::schema::{Index, IndexType};
    ///
    /// let idx = Index::new("email", IndexType::Unique);
    /// assert_eq!(idx.x_name("public.users"), "UQE_public_users_email");
    /// ```
    #[must_use]
    pub fn x_name(&self, table: &str) -> String {
        if self.name.starts_with(NON_UNIQUE_PREFIX) || self.name.starts_with(UNIQUE_PREFIX) {
            return self.name.clone();
        }
        let table = table.replace('"', "").replace('.', "_");
        let prefix = match self.index_type {
            IndexType::Unique => UNIQUE_PREFIX,
            IndexType::NonUnique => NON_UNIQUE_PREFIX,
        };
        format!("{prefix}{table}_{}", self.name)
    }

    /// Recovers the logical name from a physical index name read from a
    /// catalog. Returns the name and whether a prefix was stripped.
    #[must_use]
    pub fn strip_physical_prefix(table: &str, raw: &str) -> (String, bool) {
        let table = table.replace('"', "").replace('.', "_");
        for prefix in [NON_UNIQUE_PREFIX, UNIQUE_PREFIX] {
            let head = format!("{prefix}{table}_");
            if raw.len() > head.len() && raw.starts_with(&head) {
                return (raw[head.len()..].to_string(), true);
            }
        }
        (raw.to_string(), false)
    }
}
