//! Canonical SQL type vocabulary.
//!
//! Every column in the metadata model carries one of the names below,
//! independent of the backend it was read from or will be written to.
//! Dialects translate these into native syntax; introspectors translate
//! native names back and fail on anything outside the vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

macro_rules! sql_type_names {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)+) => {
        /// A type name from the canonical vocabulary.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum SqlTypeName {
            $($(#[$doc])* $variant,)+
        }

        impl SqlTypeName {
            /// All names in the vocabulary.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Returns the canonical upper-case spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl FromStr for SqlTypeName {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self> {
                let upper = s.trim().to_ascii_uppercase();
                match upper.as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(SchemaError::unknown_type(s.trim())),
                }
            }
        }
    };
}

sql_type_names! {
    Bit => "BIT",
    TinyInt => "TINYINT",
    SmallInt => "SMALLINT",
    MediumInt => "MEDIUMINT",
    Int => "INT",
    Integer => "INTEGER",
    BigInt => "BIGINT",

    Enum => "ENUM",
    Set => "SET",

    Char => "CHAR",
    Varchar => "VARCHAR",
    NChar => "NCHAR",
    NVarchar => "NVARCHAR",
    TinyText => "TINYTEXT",
    Text => "TEXT",
    NText => "NTEXT",
    Clob => "CLOB",
    MediumText => "MEDIUMTEXT",
    LongText => "LONGTEXT",
    Uuid => "UUID",

    Date => "DATE",
    DateTime => "DATETIME",
    Time => "TIME",
    TimeStamp => "TIMESTAMP",
    /// Timestamp with time zone.
    TimeStampz => "TIMESTAMPZ",
    Year => "YEAR",

    Decimal => "DECIMAL",
    Numeric => "NUMERIC",
    Money => "MONEY",
    SmallMoney => "SMALLMONEY",

    Real => "REAL",
    Float => "FLOAT",
    Double => "DOUBLE",

    Binary => "BINARY",
    VarBinary => "VARBINARY",
    TinyBlob => "TINYBLOB",
    Blob => "BLOB",
    MediumBlob => "MEDIUMBLOB",
    LongBlob => "LONGBLOB",
    Bytea => "BYTEA",

    Bool => "BOOL",
    Boolean => "BOOLEAN",

    /// Auto-incrementing 32-bit integer.
    Serial => "SERIAL",
    /// Auto-incrementing 64-bit integer.
    BigSerial => "BIGSERIAL",

    Json => "JSON",
    Jsonb => "JSONB",
    Xml => "XML",
    Array => "ARRAY",
}

impl SqlTypeName {
    /// Character data; defaults of these types are quoted literals.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::Enum
                | Self::Set
                | Self::Char
                | Self::Varchar
                | Self::NChar
                | Self::NVarchar
                | Self::TinyText
                | Self::Text
                | Self::NText
                | Self::Clob
                | Self::MediumText
                | Self::LongText
                | Self::Uuid
                | Self::Json
                | Self::Jsonb
                | Self::Xml
        )
    }

    /// Binary large objects and byte strings.
    #[must_use]
    pub const fn is_blob(self) -> bool {
        matches!(
            self,
            Self::Binary
                | Self::VarBinary
                | Self::TinyBlob
                | Self::Blob
                | Self::MediumBlob
                | Self::LongBlob
                | Self::Bytea
        )
    }

    #[must_use]
    pub const fn is_time(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::DateTime
                | Self::Time
                | Self::TimeStamp
                | Self::TimeStampz
                | Self::Year
        )
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Bit
                | Self::TinyInt
                | Self::SmallInt
                | Self::MediumInt
                | Self::Int
                | Self::Integer
                | Self::BigInt
                | Self::Decimal
                | Self::Numeric
                | Self::Money
                | Self::SmallMoney
                | Self::Real
                | Self::Float
                | Self::Double
                | Self::Serial
                | Self::BigSerial
        )
    }

    #[must_use]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool | Self::Boolean)
    }

    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::Jsonb)
    }

    #[must_use]
    pub const fn is_array(self) -> bool {
        matches!(self, Self::Array)
    }

    /// Generated-identity integer types.
    #[must_use]
    pub const fn is_serial(self) -> bool {
        matches!(self, Self::Serial | Self::BigSerial)
    }
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical SQL type with its default length/precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlType {
    /// Vocabulary name.
    pub name: SqlTypeName,
    /// Default length or precision, 0 when unset.
    pub default_length: u32,
    /// Default scale, 0 when unset.
    pub default_length2: u32,
}

impl SqlType {
    /// Creates a type without default lengths.
    #[must_use]
    pub const fn new(name: SqlTypeName) -> Self {
        Self {
            name,
            default_length: 0,
            default_length2: 0,
        }
    }

    /// Creates a type with default lengths.
    #[must_use]
    pub const fn with_lengths(name: SqlTypeName, length: u32, length2: u32) -> Self {
        Self {
            name,
            default_length: length,
            default_length2: length2,
        }
    }

    /// Parses `NAME`, `NAME(len)` or `NAME(len,len2)`.
    ///
    /// ```
    /// use oxide_schema_core::types::{SqlType, SqlTypeName};
    ///
    /// let t = SqlType::parse("decimal(10, 2)").unwrap();
    /// assert_eq!(t.name, SqlTypeName::Decimal);
    /// assert_eq!((t.default_length, t.default_length2), (10, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, lengths) = match s.find('(') {
            Some(open) => {
                let close = s
                    .rfind(')')
                    .filter(|&c| c > open)
                    .ok_or_else(|| SchemaError::unknown_type(s))?;
                (&s[..open], Some(&s[open + 1..close]))
            }
            None => (s, None),
        };

        let name: SqlTypeName = name.parse()?;
        let mut parsed = Self::new(name);
        if let Some(lengths) = lengths {
            let mut parts = lengths.split(',').map(str::trim);
            if let Some(first) = parts.next() {
                parsed.default_length = first.parse().map_err(|_| SchemaError::unknown_type(s))?;
            }
            if let Some(second) = parts.next() {
                parsed.default_length2 = second.parse().map_err(|_| SchemaError::unknown_type(s))?;
            }
        }
        Ok(parsed)
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        self.name.is_text()
    }

    #[must_use]
    pub const fn is_blob(&self) -> bool {
        self.name.is_blob()
    }

    #[must_use]
    pub const fn is_time(&self) -> bool {
        self.name.is_time()
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.name.is_numeric()
    }
}

impl From<SqlTypeName> for SqlType {
    fn from(name: SqlTypeName) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.default_length, self.default_length2) {
            (0, 0) => write!(f, "{}", self.name),
            (l, 0) => write!(f, "{}({l})", self.name),
            (l, l2) => write!(f, "{}({l},{l2})", self.name),
        }
    }
}
