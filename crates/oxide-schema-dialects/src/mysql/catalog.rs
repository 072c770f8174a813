//! Translating `INFORMATION_SCHEMA` rows into metadata.

use oxide_schema_core::{Column, Index, IndexType, Result, SqlType, SqlTypeName};

/// One row of `INFORMATION_SCHEMA.COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnRow {
    pub column_name: String,
    pub column_type: String,
    pub column_default: Option<String>,
    pub is_nullable: String,
    pub column_key: String,
    pub extra: String,
    pub column_comment: String,
}

/// One row of `INFORMATION_SCHEMA.STATISTICS`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct IndexRow {
    pub index_name: String,
    pub column_name: String,
    pub non_unique: i64,
}

/// A parsed `COLUMN_TYPE` such as `int(11) unsigned` or `enum('a','b')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    pub sql_type: SqlType,
    pub length: u32,
    pub length2: u32,
    pub enum_options: Vec<String>,
}

/// Parses a full `COLUMN_TYPE`. Enum and set members keep their case;
/// members containing commas are not supported.
pub fn parse_column_type(raw: &str) -> Result<ColumnType> {
    let raw = raw.trim();
    let (head, args) = match (raw.find('('), raw.rfind(')')) {
        (Some(open), Some(close)) if close > open => (&raw[..open], Some(&raw[open + 1..close])),
        _ => (raw, None),
    };
    // Drops modifiers such as `unsigned` and `zerofill`.
    let base = head.split_whitespace().next().unwrap_or_default();
    let name: SqlTypeName = base.parse()?;

    let mut parsed = ColumnType {
        sql_type: SqlType::new(name),
        length: 0,
        length2: 0,
        enum_options: Vec::new(),
    };
    let Some(args) = args else {
        return Ok(parsed);
    };

    if matches!(name, SqlTypeName::Enum | SqlTypeName::Set) {
        parsed.enum_options = args
            .split(',')
            .map(|member| member.trim().trim_matches('\'').to_string())
            .collect();
    } else {
        let mut lengths = args.split(',').map(|l| l.trim().parse::<u32>().unwrap_or_default());
        parsed.length = lengths.next().unwrap_or_default();
        parsed.length2 = lengths.next().unwrap_or_default();
    }
    Ok(parsed)
}

impl ColumnRow {
    pub fn into_column(self) -> Result<Column> {
        let parsed = parse_column_type(&self.column_type)?;
        let mut col =
            Column::new(self.column_name, parsed.sql_type).lengths(parsed.length, parsed.length2);
        col.enum_options = parsed.enum_options;
        col.nullable = self.is_nullable.eq_ignore_ascii_case("YES");
        col.is_primary_key = self.column_key == "PRI";
        col.is_auto_increment = self.extra.to_ascii_lowercase().contains("auto_increment");
        col.comment = self.column_comment;
        Ok(col.with_catalog_default(self.column_default))
    }
}

/// Groups statistics rows, ordered by index and key position, into
/// indexes on `table`. The primary key is skipped.
pub fn group_index_rows(table: &str, rows: Vec<IndexRow>) -> Vec<Index> {
    let mut indexes: Vec<(String, Index)> = Vec::new();
    for row in rows {
        if row.index_name == "PRIMARY" {
            continue;
        }
        if let Some((_, index)) = indexes.iter_mut().find(|(raw, _)| *raw == row.index_name) {
            index.add_column([row.column_name]);
            continue;
        }
        let index_type = if row.non_unique == 0 {
            IndexType::Unique
        } else {
            IndexType::NonUnique
        };
        let (name, is_regular) = Index::strip_physical_prefix(table, &row.index_name);
        let mut index = Index::new(name, index_type).columns([row.column_name]);
        index.is_regular = is_regular;
        indexes.push((row.index_name, index));
    }
    indexes.into_iter().map(|(_, index)| index).collect()
}
