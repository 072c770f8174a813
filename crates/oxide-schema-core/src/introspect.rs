//! Rebuilding full [`Table`]s from a live database.
//!
//! Dialects expose three primitive catalog reads. The helpers here combine
//! them into complete tables; like the primitives, they either return the
//! whole result or an error.

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};
use crate::schema::{Column, Table};

/// Reads one table with its columns and indexes.
pub async fn load_table(dialect: &dyn Dialect, name: &str) -> Result<Table> {
    let columns = dialect.get_columns(name).await?;
    if columns.is_empty() {
        return Err(SchemaError::NoSuchTable(name.to_string()));
    }
    let mut table = Table::new(name);
    fill(&mut table, columns, dialect).await?;
    Ok(table)
}

/// Reads every table with its columns and indexes.
pub async fn load_tables(dialect: &dyn Dialect) -> Result<Vec<Table>> {
    let mut tables = dialect.get_tables().await?;
    for table in &mut tables {
        let columns = dialect.get_columns(&table.name).await?;
        fill(table, columns, dialect).await?;
    }
    debug!(db_type = %dialect.db_type(), tables = tables.len(), "loaded schema");
    Ok(tables)
}

async fn fill(table: &mut Table, columns: Vec<Column>, dialect: &dyn Dialect) -> Result<()> {
    for col in columns {
        table.add_column(col)?;
    }
    let indexes = dialect.get_indexes(&table.name).await?;
    for index in indexes {
        table.add_index(index)?;
    }
    Ok(())
}
