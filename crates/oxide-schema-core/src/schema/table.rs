//! Table metadata.
//!
//! A [`Table`] is built once, column by column, and then only read. The
//! derived fields (primary keys, auto-increment column, bookkeeping
//! columns) are maintained by [`Table::add_column`] and cannot be set
//! directly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::index::Index;
use crate::error::{Result, SchemaError};

/// Schema of one table.
///
/// Serialized as a [`TableSnapshot`]; deserializing replays the columns
/// and indexes through [`Table::add_column`] and [`Table::add_index`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TableSnapshot", try_from = "TableSnapshot")]
pub struct Table {
    pub name: String,
    /// Storage engine (MySQL), empty for the backend default.
    pub store_engine: String,
    /// Character set, empty for the connection default.
    pub charset: String,
    pub comment: String,
    columns_seq: Vec<String>,
    columns: HashMap<String, Column>,
    indexes: BTreeMap<String, Index>,
    primary_keys: Vec<String>,
    auto_increment: Option<String>,
    created: BTreeSet<String>,
    updated: Option<String>,
    version: Option<String>,
}

/// Serialized form of a [`Table`]: the declared parts only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    #[serde(default)]
    pub store_engine: String,
    #[serde(default)]
    pub charset: String,
    #[serde(default)]
    pub comment: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl From<Table> for TableSnapshot {
    fn from(mut table: Table) -> Self {
        let columns = table
            .columns_seq
            .iter()
            .filter_map(|name| table.columns.remove(&name.to_lowercase()))
            .collect();
        Self {
            name: table.name,
            store_engine: table.store_engine,
            charset: table.charset,
            comment: table.comment,
            columns,
            indexes: table.indexes.into_values().collect(),
        }
    }
}

impl TryFrom<TableSnapshot> for Table {
    type Error = SchemaError;

    fn try_from(snapshot: TableSnapshot) -> Result<Self> {
        let mut table = Self::new(snapshot.name);
        table.store_engine = snapshot.store_engine;
        table.charset = snapshot.charset;
        table.comment = snapshot.comment;
        for mut col in snapshot.columns {
            // Rebuilt from the index list below.
            col.indexes.clear();
            table.add_column(col)?;
        }
        for index in snapshot.indexes {
            table.add_index(index)?;
        }
        Ok(table)
    }
}

impl Table {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a column and updates the derived fields.
    ///
    /// Column names are unique ignoring case.
    pub fn add_column(&mut self, col: Column) -> Result<()> {
        let key = col.name.to_lowercase();
        if self.columns.contains_key(&key) {
            return Err(SchemaError::DuplicateColumn {
                table: self.name.clone(),
                column: col.name,
            });
        }

        if col.is_primary_key {
            self.primary_keys.push(col.name.clone());
        }
        if col.is_auto_increment {
            self.auto_increment = Some(col.name.clone());
        }
        if col.is_created {
            self.created.insert(col.name.clone());
        }
        if col.is_updated {
            self.updated = Some(col.name.clone());
        }
        if col.is_version {
            self.version = Some(col.name.clone());
        }

        self.columns_seq.push(col.name.clone());
        self.columns.insert(key, col);
        Ok(())
    }

    /// Builder form of [`Table::add_column`].
    pub fn column(mut self, col: Column) -> Result<Self> {
        self.add_column(col)?;
        Ok(self)
    }

    /// Adds an index. Every indexed column must already exist; the index
    /// name is recorded on each of them.
    pub fn add_index(&mut self, index: Index) -> Result<()> {
        let keys = index
            .cols
            .iter()
            .map(|c| {
                let key = c.to_lowercase();
                if self.columns.contains_key(&key) {
                    Ok(key)
                } else {
                    Err(SchemaError::UnknownIndexColumn {
                        table: self.name.clone(),
                        index: index.name.clone(),
                        column: c.clone(),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        for key in keys {
            if let Some(col) = self.columns.get_mut(&key) {
                col.indexes.insert(index.name.clone());
            }
        }
        self.indexes.insert(index.name.clone(), index);
        Ok(())
    }

    /// Builder form of [`Table::add_index`].
    pub fn index(mut self, index: Index) -> Result<Self> {
        self.add_index(index)?;
        Ok(self)
    }

    /// Column names in insertion order.
    #[must_use]
    pub fn columns_seq(&self) -> &[String] {
        &self.columns_seq
    }

    /// Columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns_seq
            .iter()
            .filter_map(|name| self.columns.get(&name.to_lowercase()))
    }

    /// Looks up a column, ignoring case.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(&name.to_lowercase())
    }

    #[must_use]
    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    /// Primary-key columns in key order.
    #[must_use]
    pub fn pk_columns(&self) -> Vec<&Column> {
        self.primary_keys
            .iter()
            .filter_map(|name| self.get_column(name))
            .collect()
    }

    #[must_use]
    pub fn auto_increment(&self) -> Option<&str> {
        self.auto_increment.as_deref()
    }

    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&Column> {
        self.auto_increment.as_deref().and_then(|name| self.get_column(name))
    }

    #[must_use]
    pub const fn created(&self) -> &BTreeSet<String> {
        &self.created
    }

    #[must_use]
    pub fn updated(&self) -> Option<&str> {
        self.updated.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Indexes by name.
    #[must_use]
    pub const fn indexes(&self) -> &BTreeMap<String, Index> {
        &self.indexes
    }

    #[must_use]
    pub fn get_index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }
}
