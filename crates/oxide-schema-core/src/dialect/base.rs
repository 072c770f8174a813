//! State shared by every dialect implementation.

use tracing::info;

use crate::error::Result;
use crate::uri::{DbType, Uri};

/// Connection state a dialect keeps after [`init`](DialectBase::init).
#[derive(Debug, Clone)]
pub struct DialectBase {
    uri: Uri,
    driver_name: String,
    data_source_name: String,
}

impl DialectBase {
    /// Creates an unbound base for `db_type`.
    #[must_use]
    pub fn new(db_type: DbType) -> Self {
        Self {
            uri: Uri::new(db_type),
            driver_name: String::new(),
            data_source_name: String::new(),
        }
    }

    /// Takes ownership of the descriptor.
    pub fn init(&mut self, uri: Uri, driver_name: &str, data_source_name: &str) -> Result<()> {
        info!(db_type = %uri.db_type, driver = driver_name, "dialect initialized");
        self.uri = uri;
        self.driver_name = driver_name.to_string();
        self.data_source_name = data_source_name.to_string();
        Ok(())
    }

    #[must_use]
    pub const fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn uri_mut(&mut self) -> &mut Uri {
        &mut self.uri
    }

    #[must_use]
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    #[must_use]
    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }
}
