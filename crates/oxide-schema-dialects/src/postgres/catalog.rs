//! Translating `information_schema` and `pg_indexes` rows into metadata.

use oxide_schema_core::{Column, Index, IndexType, Result, SqlType, SqlTypeName};

/// One row of the column catalog query.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnRow {
    pub column_name: String,
    pub data_type: String,
    pub default_value: Option<String>,
    pub length: i32,
    pub scale: i32,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub comment: Option<String>,
}

/// Canonical type for a `data_type` as reported by `information_schema`.
pub fn native_type(data_type: &str) -> Result<SqlType> {
    let name = match data_type.to_ascii_lowercase().as_str() {
        "character varying" => SqlTypeName::Varchar,
        "character" => SqlTypeName::Char,
        "timestamp without time zone" => SqlTypeName::DateTime,
        "timestamp with time zone" => SqlTypeName::TimeStampz,
        "time without time zone" | "time with time zone" => SqlTypeName::Time,
        "double precision" => SqlTypeName::Double,
        "boolean" => SqlTypeName::Bool,
        "oid" => SqlTypeName::BigInt,
        "array" => SqlTypeName::Array,
        other => other.parse()?,
    };
    Ok(SqlType::new(name))
}

impl ColumnRow {
    /// Builds the column. A `nextval(...)` default marks the column
    /// auto-incrementing and is dropped.
    pub fn into_column(self) -> Result<Column> {
        let sql_type = native_type(&self.data_type)?;
        let mut col = Column::new(self.column_name, sql_type);
        col.length = u32::try_from(self.length).unwrap_or_default();
        col.length2 = u32::try_from(self.scale).unwrap_or_default();
        col.nullable = self.nullable;
        col.is_primary_key = self.is_primary_key;
        col.comment = self.comment.unwrap_or_default();

        let default = match self.default_value {
            Some(d) if d.starts_with("nextval(") => {
                col.is_auto_increment = true;
                None
            }
            Some(d) => Some(strip_cast(&d).to_string()),
            None => None,
        };
        Ok(col.with_catalog_default(default))
    }
}

/// Drops a trailing `::type` cast, as in `'draft'::character varying`.
pub fn strip_cast(default: &str) -> &str {
    match default.rfind("::") {
        Some(pos) if !default[pos..].contains('\'') => &default[..pos],
        _ => default,
    }
}

/// Reads a `pg_indexes.indexdef`. Primary-key indexes yield `None`.
pub fn parse_index_def(table: &str, index_name: &str, def: &str) -> Option<Index> {
    if index_name.ends_with("_pkey") {
        return None;
    }
    let index_type = if def.to_ascii_uppercase().starts_with("CREATE UNIQUE INDEX") {
        IndexType::Unique
    } else {
        IndexType::NonUnique
    };

    let start = def.find('(')?;
    let end = def.rfind(')')?;
    if end <= start {
        return None;
    }

    let (name, is_regular) = Index::strip_physical_prefix(table, index_name);
    let mut index = Index::new(name, index_type);
    index.add_column(def[start + 1..end].split(',').map(|c| c.trim().trim_matches('"')));
    index.is_regular = is_regular;
    Some(index)
}
