//! Backend-independent schema metadata.
//!
//! [`Table`], [`Column`] and [`Index`] describe one table regardless of the
//! database it lives in. They are produced either by mapping a Rust struct
//! (see [`crate::model`]) or by introspecting a live database through a
//! [`Dialect`](crate::dialect::Dialect).

mod column;
mod index;
mod table;

pub use column::Column;
pub use index::{Index, IndexType};
pub use table::{Table, TableSnapshot};
