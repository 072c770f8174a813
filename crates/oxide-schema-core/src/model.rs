//! Deriving table schema from Rust structs.
//!
//! `#[derive(Schema)]` (from `oxide-schema-derive`) describes a struct's
//! fields as [`FieldDef`]s; [`TableMapper`] turns that description into a
//! [`Table`] for a given dialect.
//!
//! ```
//! use oxide_schema_core::model::{FieldAttrs, FieldDef, Schema};
//! use oxide_schema_core::host::{HostType, SqlMapped};
//!
//! // What the derive generates for a struct with two fields.
//! struct User;
//!
//! impl Schema for User {
//!     const TYPE_NAME: &'static str = "User";
//!     const TABLE_NAME: Option<&'static str> = None;
//!
//!     fn fields() -> Vec<FieldDef> {
//!         vec![
//!             FieldDef::new("id", <i64 as SqlMapped>::host_type(), FieldAttrs {
//!                 primary_key: true,
//!                 autoincr: true,
//!                 ..FieldAttrs::default()
//!             }),
//!             FieldDef::new("name", <String as SqlMapped>::host_type(), FieldAttrs::default()),
//!         ]
//!     }
//! }
//!
//! assert_eq!(User::fields()[1].host_type, HostType::String);
//! ```

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{Result, SchemaError};
use crate::host::{host_type_to_sql_type, nullable_host_type_to_sql_type, HostType};
use crate::mapper::{NameMapper, SnakeMapper};
use crate::schema::{Column, Index, IndexType, Table};
use crate::types::{SqlType, SqlTypeName};

/// A struct that maps to a table.
pub trait Schema {
    /// Rust type name, mapped to the table name unless overridden.
    const TYPE_NAME: &'static str;

    /// Explicit table name.
    const TABLE_NAME: Option<&'static str>;

    /// Field descriptions in declaration order.
    fn fields() -> Vec<FieldDef>;
}

/// One struct field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub field_name: &'static str,
    pub host_type: HostType,
    pub attrs: FieldAttrs,
    /// Fields of an embedded struct whose columns are inlined.
    pub nested: Option<fn() -> Vec<FieldDef>>,
}

impl FieldDef {
    #[must_use]
    pub const fn new(field_name: &'static str, host_type: HostType, attrs: FieldAttrs) -> Self {
        Self {
            field_name,
            host_type,
            attrs,
            nested: None,
        }
    }

    /// A field whose own fields become columns of the outer table.
    #[must_use]
    pub const fn extends(
        field_name: &'static str,
        host_type: HostType,
        attrs: FieldAttrs,
        nested: fn() -> Vec<FieldDef>,
    ) -> Self {
        Self {
            field_name,
            host_type,
            attrs,
            nested: Some(nested),
        }
    }
}

/// Column attributes of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttrs {
    /// Column name override.
    pub name: Option<&'static str>,
    /// Type override, `NAME` or `NAME(len[,len2])`.
    pub sql_type: Option<&'static str>,
    pub length: Option<u32>,
    pub length2: Option<u32>,
    pub primary_key: bool,
    pub autoincr: bool,
    /// `Some(true)` forces NULL, `Some(false)` NOT NULL; otherwise
    /// `Option` fields are nullable and all others are not.
    pub nullable: Option<bool>,
    pub default: Option<&'static str>,
    pub created: bool,
    pub updated: bool,
    pub version: bool,
    pub cascade: bool,
    /// Non-unique indexes; an empty name means the column name.
    pub index: &'static [&'static str],
    /// Unique indexes; an empty name means the column name.
    pub unique: &'static [&'static str],
    pub comment: Option<&'static str>,
    pub ignore: bool,
}

/// Builds [`Table`]s from [`Schema`] types.
pub struct TableMapper {
    table_names: Box<dyn NameMapper>,
    column_names: Box<dyn NameMapper>,
}

impl Default for TableMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TableMapper {
    /// Snake-case table and column names.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mappers(SnakeMapper, SnakeMapper)
    }

    #[must_use]
    pub fn with_mappers(
        table_names: impl NameMapper + 'static,
        column_names: impl NameMapper + 'static,
    ) -> Self {
        Self {
            table_names: Box::new(table_names),
            column_names: Box::new(column_names),
        }
    }

    /// Table name for `T`.
    #[must_use]
    pub fn table_name<T: Schema>(&self) -> String {
        T::TABLE_NAME.map_or_else(|| self.table_names.obj_to_table(T::TYPE_NAME), str::to_string)
    }

    /// Builds the table for `T` as `dialect` would create it.
    pub fn map<T: Schema>(&self, dialect: &dyn Dialect) -> Result<Table> {
        let mut table = Table::new(self.table_name::<T>());
        let mut indexes: Vec<Index> = Vec::new();

        for field in T::fields() {
            if field.attrs.ignore {
                continue;
            }
            match field.nested {
                Some(nested) => {
                    for inner in nested() {
                        if inner.attrs.ignore {
                            continue;
                        }
                        let path = format!("{}.{}", field.field_name, inner.field_name);
                        if inner.nested.is_some() {
                            return Err(SchemaError::NestingTooDeep(path));
                        }
                        self.add_field(&mut table, &mut indexes, &inner, path, dialect)?;
                    }
                }
                None => {
                    let path = field.field_name.to_string();
                    self.add_field(&mut table, &mut indexes, &field, path, dialect)?;
                }
            }
        }

        for index in indexes {
            table.add_index(index)?;
        }

        debug!(
            table = %table.name,
            columns = table.columns_seq().len(),
            indexes = table.indexes().len(),
            "mapped schema"
        );
        Ok(table)
    }

    fn add_field(
        &self,
        table: &mut Table,
        indexes: &mut Vec<Index>,
        field: &FieldDef,
        path: String,
        dialect: &dyn Dialect,
    ) -> Result<()> {
        let mut col = self.column(field, path)?;
        dialect.normalize_column(&mut col);

        for (names, index_type) in [
            (field.attrs.index, IndexType::NonUnique),
            (field.attrs.unique, IndexType::Unique),
        ] {
            for &name in names {
                let name = if name.is_empty() { col.name.as_str() } else { name };
                match indexes.iter_mut().find(|i| i.name == name) {
                    Some(index) => index.add_column([col.name.clone()]),
                    None => indexes.push(Index::new(name, index_type).columns([col.name.clone()])),
                }
            }
        }

        table.add_column(col)
    }

    fn column(&self, field: &FieldDef, path: String) -> Result<Column> {
        let attrs = &field.attrs;
        let name = attrs
            .name
            .map_or_else(|| self.column_names.obj_to_table(field.field_name), str::to_string);

        let sql_type = match (attrs.sql_type, &field.host_type) {
            (Some(native), _) => SqlType::parse(native)?,
            (None, HostType::Nullable(inner)) => nullable_host_type_to_sql_type(inner)
                .unwrap_or_else(|| SqlType::new(SqlTypeName::Text)),
            (None, host) => host_type_to_sql_type(host),
        };

        let mut col = Column::new(name, sql_type).field_name(path);
        if let Some(length) = attrs.length {
            col.length = length;
        }
        if let Some(length2) = attrs.length2 {
            col.length2 = length2;
        }
        col.nullable = attrs.nullable.unwrap_or_else(|| field.host_type.is_nullable());
        if let Some(default) = attrs.default {
            col = col.default_value(default);
        }
        if let Some(comment) = attrs.comment {
            col = col.comment(comment);
        }
        if attrs.primary_key {
            col = col.primary_key();
        }
        col.is_auto_increment = attrs.autoincr;
        col.is_created = attrs.created;
        col.is_updated = attrs.updated;
        col.is_version = attrs.version;
        col.is_cascade = attrs.cascade;
        Ok(col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::testing::TestDialect;
    use crate::host::SqlMapped;
    use crate::mapper::GonicMapper;

    struct Audit;

    impl Schema for Audit {
        const TYPE_NAME: &'static str = "Audit";
        const TABLE_NAME: Option<&'static str> = None;

        fn fields() -> Vec<FieldDef> {
            vec![
                FieldDef::new(
                    "created_at",
                    <chrono::NaiveDateTime as SqlMapped>::host_type(),
                    FieldAttrs {
                        created: true,
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "note",
                    <Option<String> as SqlMapped>::host_type(),
                    FieldAttrs {
                        ignore: true,
                        ..FieldAttrs::default()
                    },
                ),
            ]
        }
    }

    struct UserProfile;

    impl Schema for UserProfile {
        const TYPE_NAME: &'static str = "UserProfile";
        const TABLE_NAME: Option<&'static str> = None;

        fn fields() -> Vec<FieldDef> {
            vec![
                FieldDef::new(
                    "id",
                    <i64 as SqlMapped>::host_type(),
                    FieldAttrs {
                        primary_key: true,
                        autoincr: true,
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "email",
                    <String as SqlMapped>::host_type(),
                    FieldAttrs {
                        unique: &[""],
                        length: Some(128),
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "first_name",
                    <Option<String> as SqlMapped>::host_type(),
                    FieldAttrs {
                        index: &["name"],
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "last_name",
                    <Option<String> as SqlMapped>::host_type(),
                    FieldAttrs {
                        index: &["name"],
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "balance",
                    <String as SqlMapped>::host_type(),
                    FieldAttrs {
                        sql_type: Some("DECIMAL(12,2)"),
                        default: Some("0"),
                        ..FieldAttrs::default()
                    },
                ),
                FieldDef::new(
                    "avatar",
                    <Option<Vec<u8>> as SqlMapped>::host_type(),
                    FieldAttrs::default(),
                ),
                FieldDef::extends(
                    "audit",
                    HostType::Struct(Audit::TYPE_NAME),
                    FieldAttrs::default(),
                    Audit::fields,
                ),
                FieldDef::new(
                    "cache",
                    <Vec<String> as SqlMapped>::host_type(),
                    FieldAttrs {
                        ignore: true,
                        ..FieldAttrs::default()
                    },
                ),
            ]
        }
    }

    #[test]
    fn test_map_columns() {
        let table = TableMapper::new().map::<UserProfile>(&TestDialect::new()).unwrap();

        assert_eq!(table.name, "user_profile");
        assert_eq!(
            table.columns_seq(),
            ["id", "email", "first_name", "last_name", "balance", "avatar", "created_at"]
        );
        assert_eq!(table.primary_keys(), ["id"]);
        assert_eq!(table.auto_increment(), Some("id"));

        let id = table.get_column("id").unwrap();
        assert_eq!(id.sql_type.name, SqlTypeName::BigInt);
        assert!(!id.nullable);

        let email = table.get_column("email").unwrap();
        assert_eq!((email.sql_type.name, email.length), (SqlTypeName::Varchar, 128));
        assert!(!email.nullable);

        let first = table.get_column("first_name").unwrap();
        assert!(first.nullable);

        let balance = table.get_column("balance").unwrap();
        assert_eq!((balance.length, balance.length2), (12, 2));
        assert_eq!(balance.default, "0");

        // no primitive mapping for a nullable byte vector
        assert_eq!(table.get_column("avatar").unwrap().sql_type.name, SqlTypeName::Text);
    }

    #[test]
    fn test_map_extends_one_level() {
        let table = TableMapper::new().map::<UserProfile>(&TestDialect::new()).unwrap();
        let created = table.get_column("created_at").unwrap();
        assert_eq!(created.field_name, "audit.created_at");
        assert!(table.created().contains("created_at"));
        assert!(table.get_column("note").is_none());
        assert!(table.get_column("cache").is_none());
    }

    #[test]
    fn test_map_indexes() {
        let table = TableMapper::new().map::<UserProfile>(&TestDialect::new()).unwrap();

        let email = table.get_index("email").unwrap();
        assert!(email.is_unique());
        assert_eq!(email.cols, ["email"]);

        let name = table.get_index("name").unwrap();
        assert!(!name.is_unique());
        assert_eq!(name.cols, ["first_name", "last_name"]);
        assert!(table.get_column("last_name").unwrap().indexes.contains("name"));
    }

    struct Deep;

    impl Schema for Deep {
        const TYPE_NAME: &'static str = "Deep";
        const TABLE_NAME: Option<&'static str> = Some("deep_things");

        fn fields() -> Vec<FieldDef> {
            vec![FieldDef::extends(
                "outer",
                HostType::Struct("Outer"),
                FieldAttrs::default(),
                || {
                    vec![FieldDef::extends(
                        "inner",
                        HostType::Struct("Audit"),
                        FieldAttrs::default(),
                        Audit::fields,
                    )]
                },
            )]
        }
    }

    #[test]
    fn test_nesting_too_deep() {
        let err = TableMapper::new().map::<Deep>(&TestDialect::new()).unwrap_err();
        assert!(matches!(err, SchemaError::NestingTooDeep(ref path) if path == "outer.inner"));
        assert_eq!(TableMapper::new().table_name::<Deep>(), "deep_things");
    }

    #[test]
    fn test_custom_mappers() {
        let mapper = TableMapper::with_mappers(GonicMapper::new(), GonicMapper::new());
        assert_eq!(mapper.table_name::<UserProfile>(), "user_profile");
    }

    #[test]
    fn test_bad_type_override_fails() {
        struct Bad;

        impl Schema for Bad {
            const TYPE_NAME: &'static str = "Bad";
            const TABLE_NAME: Option<&'static str> = None;

            fn fields() -> Vec<FieldDef> {
                vec![FieldDef::new(
                    "shape",
                    HostType::String,
                    FieldAttrs {
                        sql_type: Some("GEOMETRY"),
                        ..FieldAttrs::default()
                    },
                )]
            }
        }

        let err = TableMapper::new().map::<Bad>(&TestDialect::new()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSqlType { .. }));
    }
}
