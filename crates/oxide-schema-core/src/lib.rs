//! # oxide-schema-core
//!
//! Backend-independent schema metadata and the dialect contract behind it.
//!
//! This crate provides:
//! - A canonical SQL type vocabulary and its mapping to and from Rust types
//! - The [`Table`]/[`Column`]/[`Index`] metadata model
//! - The [`Dialect`] trait, with a shared `CREATE TABLE` generator
//! - A filter pipeline rewriting generic SQL into backend SQL
//! - Registries for dialects and connection-string drivers
//! - Schema derivation from Rust structs
//!
//! Concrete backends live in `oxide-schema-dialects`.
//!
//! ## Deriving a table
//!
//! ```rust,ignore
//! use oxide_schema_core::{Schema, TableMapper};
//! use oxide_schema_derive::Schema;
//!
//! #[derive(Schema)]
//! #[table(name = "users")]
//! struct User {
//!     #[column(primary_key, autoincrement)]
//!     id: i64,
//!     #[column(unique, length = 128)]
//!     email: String,
//!     nickname: Option<String>,
//! }
//!
//! let table = TableMapper::new().map::<User>(dialect.as_ref())?;
//! let ddl = dialect.create_table_sql(&table, None, None, None);
//! ```
//!
//! ## Rewriting generic SQL
//!
//! Generic SQL quotes with `` ` ``, uses `?` placeholders and may name the
//! primary key `(id)`:
//!
//! ```rust,ignore
//! let sql = filter::rewrite(
//!     dialect.as_ref(),
//!     "DELETE FROM `users` WHERE `(id)` = ?",
//!     Some(&table),
//! );
//! // PostgreSQL: DELETE FROM "users" WHERE "id" = $1
//! ```

pub mod dialect;
pub mod error;
pub mod filter;
pub mod host;
pub mod introspect;
pub mod mapper;
pub mod model;
pub mod registry;
pub mod schema;
pub mod types;
pub mod uri;

pub use dialect::{CheckQuery, Dialect, DialectBase};
pub use error::{Result, SchemaError};
pub use filter::{Filter, IdFilter, QuoteFilter, SeqFilter};
pub use host::{HostType, SqlMapped};
pub use mapper::{GonicMapper, NameMapper, PrefixMapper, SameMapper, SnakeMapper, SuffixMapper};
pub use model::{FieldAttrs, FieldDef, Schema, TableMapper};
pub use registry::{DialectFactory, Driver, Registry};
pub use schema::{Column, Index, IndexType, Table, TableSnapshot};
pub use types::{SqlType, SqlTypeName};
pub use uri::{DbType, Uri};
