//! Mapping between Rust value types and the canonical SQL vocabulary.
//!
//! Rust has no runtime reflection, so each mappable type describes itself
//! through [`SqlMapped::host_type`]. The derive macro calls it for every
//! field; the mapping functions below then turn the description into a
//! [`SqlType`].
//!
//! The reverse direction, [`sql_type_to_host_type`], is lossy on purpose:
//! all text types collapse to `String`, all blobs to `Vec<u8>`, all
//! temporal types to one time type and decimals to `String`.

use std::collections::{BTreeMap, HashMap};

use crate::types::{SqlType, SqlTypeName};

/// Shape of a Rust value as far as column mapping is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HostType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    /// Complex number of two `f32`.
    Complex64,
    /// Complex number of two `f64`.
    Complex128,
    String,
    /// A date and/or time value.
    Time,
    /// Sequence of elements (`Vec<T>`, `[T; N]`).
    Slice(Box<HostType>),
    /// Key/value mapping.
    Map(Box<HostType>, Box<HostType>),
    /// Any other composite type, by name.
    Struct(&'static str),
    /// A value that may be absent (`Option<T>`).
    Nullable(Box<HostType>),
}

impl HostType {
    /// `Vec<u8>`.
    #[must_use]
    pub fn bytes() -> Self {
        Self::Slice(Box::new(Self::U8))
    }

    /// Whether this is a nullable wrapper.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }
}

/// Types that can be stored in a column.
pub trait SqlMapped {
    /// Describes the type for schema derivation.
    fn host_type() -> HostType;
}

macro_rules! impl_sql_mapped {
    ($($ty:ty => $host:ident),+ $(,)?) => {
        $(
            impl SqlMapped for $ty {
                fn host_type() -> HostType {
                    HostType::$host
                }
            }
        )+
    };
}

impl_sql_mapped! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    &str => String,
    chrono::NaiveDate => Time,
    chrono::NaiveTime => Time,
    chrono::NaiveDateTime => Time,
}

impl<Tz: chrono::TimeZone> SqlMapped for chrono::DateTime<Tz> {
    fn host_type() -> HostType {
        HostType::Time
    }
}

impl<T: SqlMapped> SqlMapped for Option<T> {
    fn host_type() -> HostType {
        HostType::Nullable(Box::new(T::host_type()))
    }
}

impl<T: SqlMapped> SqlMapped for Vec<T> {
    fn host_type() -> HostType {
        HostType::Slice(Box::new(T::host_type()))
    }
}

impl<T: SqlMapped, const N: usize> SqlMapped for [T; N] {
    fn host_type() -> HostType {
        HostType::Slice(Box::new(T::host_type()))
    }
}

impl<K: SqlMapped, V: SqlMapped, S> SqlMapped for HashMap<K, V, S> {
    fn host_type() -> HostType {
        HostType::Map(Box::new(K::host_type()), Box::new(V::host_type()))
    }
}

impl<K: SqlMapped, V: SqlMapped> SqlMapped for BTreeMap<K, V> {
    fn host_type() -> HostType {
        HostType::Map(Box::new(K::host_type()), Box::new(V::host_type()))
    }
}

/// Maps a host type to its canonical SQL type. Total: composite types
/// with no better mapping become `TEXT`.
#[must_use]
pub fn host_type_to_sql_type(t: &HostType) -> SqlType {
    match t {
        HostType::I8
        | HostType::I16
        | HostType::I32
        | HostType::U8
        | HostType::U16
        | HostType::U32 => SqlType::new(SqlTypeName::Int),
        HostType::I64 | HostType::Isize | HostType::U64 | HostType::Usize => {
            SqlType::new(SqlTypeName::BigInt)
        }
        HostType::F32 => SqlType::new(SqlTypeName::Float),
        HostType::F64 => SqlType::new(SqlTypeName::Double),
        HostType::Complex64 | HostType::Complex128 => {
            SqlType::with_lengths(SqlTypeName::Varchar, 64, 0)
        }
        HostType::Bool => SqlType::new(SqlTypeName::Bool),
        HostType::String => SqlType::with_lengths(SqlTypeName::Varchar, 255, 0),
        HostType::Slice(elem) if **elem == HostType::U8 => SqlType::new(SqlTypeName::Blob),
        HostType::Slice(_) | HostType::Map(..) => SqlType::new(SqlTypeName::Text),
        HostType::Time => SqlType::new(SqlTypeName::DateTime),
        // TODO: map associations to foreign keys once relations are modelled.
        HostType::Struct(_) => SqlType::new(SqlTypeName::Text),
        HostType::Nullable(inner) => host_type_to_sql_type(inner),
    }
}

/// Maps the inner type of a nullable field, matching only the primitive
/// forms. `None` lets the caller pick its own fallback.
#[must_use]
pub fn nullable_host_type_to_sql_type(inner: &HostType) -> Option<SqlType> {
    match inner {
        HostType::String
        | HostType::Bool
        | HostType::Complex64
        | HostType::Complex128
        | HostType::F32
        | HostType::F64
        | HostType::I8
        | HostType::I16
        | HostType::I32
        | HostType::I64
        | HostType::Isize
        | HostType::U8
        | HostType::U16
        | HostType::U32
        | HostType::U64
        | HostType::Usize
        | HostType::Time => Some(host_type_to_sql_type(inner)),
        _ => None,
    }
}

/// Maps a canonical SQL type to the host type a value is read into.
#[must_use]
pub fn sql_type_to_host_type(st: &SqlType) -> HostType {
    use SqlTypeName as N;

    match st.name {
        N::Bit | N::TinyInt | N::SmallInt | N::MediumInt | N::Int | N::Integer | N::Serial => {
            HostType::I32
        }
        N::BigInt | N::BigSerial => HostType::I64,
        N::Float | N::Real => HostType::F32,
        N::Double => HostType::F64,
        N::Bool | N::Boolean => HostType::Bool,
        name if name.is_blob() => HostType::bytes(),
        name if name.is_time() => HostType::Time,
        // text, decimal/money (no precision loss) and everything else
        _ => HostType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths() {
        assert_eq!(host_type_to_sql_type(&i32::host_type()).name, SqlTypeName::Int);
        assert_eq!(host_type_to_sql_type(&u8::host_type()).name, SqlTypeName::Int);
        assert_eq!(host_type_to_sql_type(&i64::host_type()).name, SqlTypeName::BigInt);
        assert_eq!(host_type_to_sql_type(&u64::host_type()).name, SqlTypeName::BigInt);
    }

    #[test]
    fn test_string_is_varchar_255() {
        let st = host_type_to_sql_type(&String::host_type());
        assert_eq!(st, SqlType::with_lengths(SqlTypeName::Varchar, 255, 0));
    }

    #[test]
    fn test_bytes_are_blob() {
        assert_eq!(host_type_to_sql_type(&<Vec<u8>>::host_type()).name, SqlTypeName::Blob);
        assert_eq!(host_type_to_sql_type(&<[u8; 16]>::host_type()).name, SqlTypeName::Blob);
    }

    #[test]
    fn test_other_collections_are_text() {
        assert_eq!(host_type_to_sql_type(&<Vec<String>>::host_type()).name, SqlTypeName::Text);
        assert_eq!(
            host_type_to_sql_type(&<HashMap<String, i64>>::host_type()).name,
            SqlTypeName::Text
        );
        assert_eq!(host_type_to_sql_type(&HostType::Struct("Address")).name, SqlTypeName::Text);
    }

    #[test]
    fn test_floats_bools_complex_and_time() {
        assert_eq!(host_type_to_sql_type(&f32::host_type()).name, SqlTypeName::Float);
        assert_eq!(host_type_to_sql_type(&f64::host_type()).name, SqlTypeName::Double);
        assert_eq!(host_type_to_sql_type(&bool::host_type()).name, SqlTypeName::Bool);
        assert_eq!(
            host_type_to_sql_type(&HostType::Complex128),
            SqlType::with_lengths(SqlTypeName::Varchar, 64, 0)
        );
        assert_eq!(
            host_type_to_sql_type(&chrono::NaiveDateTime::host_type()).name,
            SqlTypeName::DateTime
        );
        assert_eq!(
            host_type_to_sql_type(&chrono::DateTime::<chrono::Utc>::host_type()).name,
            SqlTypeName::DateTime
        );
    }

    #[test]
    fn test_nullable_maps_like_inner() {
        let t = Option::<i64>::host_type();
        assert!(t.is_nullable());
        assert_eq!(host_type_to_sql_type(&t).name, SqlTypeName::BigInt);
    }

    #[test]
    fn test_nullable_primitive_forms() {
        assert_eq!(
            nullable_host_type_to_sql_type(&HostType::String).map(|t| t.name),
            Some(SqlTypeName::Varchar)
        );
        assert_eq!(
            nullable_host_type_to_sql_type(&HostType::Time).map(|t| t.name),
            Some(SqlTypeName::DateTime)
        );
        assert_eq!(nullable_host_type_to_sql_type(&HostType::bytes()), None);
        assert_eq!(nullable_host_type_to_sql_type(&HostType::Struct("Address")), None);
    }

    #[test]
    fn test_reverse_mapping_is_lossy() {
        let text = sql_type_to_host_type(&SqlType::new(SqlTypeName::LongText));
        let varchar = sql_type_to_host_type(&SqlType::with_lengths(SqlTypeName::Varchar, 40, 0));
        assert_eq!(text, HostType::String);
        assert_eq!(varchar, HostType::String);

        assert_eq!(sql_type_to_host_type(&SqlType::new(SqlTypeName::Bytea)), HostType::bytes());
        assert_eq!(sql_type_to_host_type(&SqlType::new(SqlTypeName::TimeStampz)), HostType::Time);
        assert_eq!(sql_type_to_host_type(&SqlType::new(SqlTypeName::Decimal)), HostType::String);
        assert_eq!(sql_type_to_host_type(&SqlType::new(SqlTypeName::BigSerial)), HostType::I64);
        assert_eq!(sql_type_to_host_type(&SqlType::new(SqlTypeName::Xml)), HostType::String);
    }

    #[test]
    fn test_round_trip_is_not_identity() {
        let original = SqlType::new(SqlTypeName::Decimal);
        let back = host_type_to_sql_type(&sql_type_to_host_type(&original));
        assert_ne!(back.name, original.name);
    }
}
