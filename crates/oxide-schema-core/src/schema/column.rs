//! Column metadata.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::SqlType;

/// Schema definition for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// SQL identifier.
    pub name: String,
    /// Accessor path on the host struct, `outer.inner` for nested fields.
    pub field_name: String,
    /// Canonical type.
    pub sql_type: SqlType,
    /// Length or precision, 0 when unset.
    pub length: u32,
    /// Scale, 0 when unset.
    pub length2: u32,
    /// Whether the column allows NULL values.
    pub nullable: bool,
    /// Raw SQL literal used as default, empty for none.
    pub default: String,
    pub is_primary_key: bool,
    pub is_auto_increment: bool,
    /// Filled with the insertion time.
    pub is_created: bool,
    /// Refreshed with the update time.
    pub is_updated: bool,
    pub is_cascade: bool,
    /// Optimistic-lock counter.
    pub is_version: bool,
    /// Names of the indexes this column participates in.
    pub indexes: BTreeSet<String>,
    /// Column comment (MySQL).
    pub comment: String,
    /// Members of an ENUM or SET column, in declaration order.
    pub enum_options: Vec<String>,
}

impl Column {
    /// Creates a nullable column using the type's default lengths.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        let name = name.into();
        Self {
            field_name: name.clone(),
            name,
            sql_type,
            length: sql_type.default_length,
            length2: sql_type.default_length2,
            nullable: true,
            default: String::new(),
            is_primary_key: false,
            is_auto_increment: false,
            is_created: false,
            is_updated: false,
            is_cascade: false,
            is_version: false,
            indexes: BTreeSet::new(),
            comment: String::new(),
            enum_options: Vec::new(),
        }
    }

    /// Sets the host accessor path.
    #[must_use]
    pub fn field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }

    /// Overrides length and scale.
    #[must_use]
    pub fn lengths(mut self, length: u32, length2: u32) -> Self {
        self.length = length;
        self.length2 = length2;
        self
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the column as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets the raw default literal.
    #[must_use]
    pub fn default_value(mut self, literal: impl Into<String>) -> Self {
        self.default = literal.into();
        self
    }

    /// Marks the column as part of the primary key; keys are never NULL.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    #[must_use]
    pub fn created(mut self) -> Self {
        self.is_created = true;
        self
    }

    #[must_use]
    pub fn updated(mut self) -> Self {
        self.is_updated = true;
        self
    }

    #[must_use]
    pub fn version(mut self) -> Self {
        self.is_version = true;
        self
    }

    #[must_use]
    pub fn cascade(mut self) -> Self {
        self.is_cascade = true;
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether a default literal is set.
    #[must_use]
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }

    /// Sets a default as read from a catalog, which reports character and
    /// temporal defaults without quotes. Such defaults are quoted unless
    /// they already are or are expressions (`now()`, `CURRENT_TIMESTAMP`).
    #[must_use]
    pub fn with_catalog_default(mut self, default: Option<String>) -> Self {
        let Some(default) = default else {
            return self;
        };
        let quote = (self.sql_type.is_text() || self.sql_type.is_time())
            && !default.starts_with('\'')
            && !is_default_expression(&default);
        self.default = if quote {
            format!("'{}'", default.replace('\'', "''"))
        } else {
            default
        };
        self
    }
}

/// Expression defaults: SQL keywords, parenthesised expressions and calls
/// to known functions such as `now()` or `nextval('seq')`.
fn is_default_expression(literal: &str) -> bool {
    const KEYWORDS: &[&str] = &[
        "NULL",
        "CURRENT_TIMESTAMP",
        "CURRENT_DATE",
        "CURRENT_TIME",
        "LOCALTIMESTAMP",
    ];
    const FUNCTIONS: &[&str] = &[
        "now",
        "current_timestamp",
        "localtimestamp",
        "utc_timestamp",
        "sysdate",
        "curdate",
        "curtime",
        "getdate",
        "datetime",
        "date",
        "time",
        "strftime",
        "uuid",
        "gen_random_uuid",
        "nextval",
    ];

    if KEYWORDS.iter().any(|k| literal.eq_ignore_ascii_case(k)) {
        return true;
    }
    if literal.starts_with('(') && literal.ends_with(')') {
        return true;
    }
    literal
        .split_once('(')
        .filter(|(_, rest)| rest.ends_with(')'))
        .is_some_and(|(ident, _)| FUNCTIONS.iter().any(|f| ident.eq_ignore_ascii_case(f)))
}
