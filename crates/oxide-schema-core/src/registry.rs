//! Lookup tables from backend tags to dialects and from driver names to
//! connection-string parsers.
//!
//! Registration is a startup concern: registering the same key twice is a
//! programming error and panics. Lookups of unknown keys return `None`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::Result;
use crate::uri::{DbType, Uri};

/// Builds a fresh, uninitialized dialect.
pub type DialectFactory = fn() -> Box<dyn Dialect>;

/// Parses a data source name into a [`Uri`].
pub trait Driver: Send + Sync {
    fn parse(&self, driver_name: &str, data_source_name: &str) -> Result<Uri>;
}

/// Dialect and driver lookup tables.
#[derive(Default)]
pub struct Registry {
    dialects: RwLock<HashMap<DbType, DialectFactory>>,
    drivers: RwLock<HashMap<String, Arc<dyn Driver>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the dialect for `db_type`.
    ///
    /// # Panics
    ///
    /// Panics if a dialect is already registered for `db_type`.
    pub fn register_dialect(&self, db_type: DbType, factory: DialectFactory) {
        let mut dialects = self.dialects.write().unwrap_or_else(PoisonError::into_inner);
        assert!(
            !dialects.contains_key(&db_type),
            "dialect for backend '{db_type}' registered twice"
        );
        debug!(db_type = %db_type, "registered dialect");
        dialects.insert(db_type, factory);
    }

    /// Registers the driver `name`.
    ///
    /// # Panics
    ///
    /// Panics if a driver is already registered as `name`.
    pub fn register_driver(&self, name: &str, driver: Arc<dyn Driver>) {
        let mut drivers = self.drivers.write().unwrap_or_else(PoisonError::into_inner);
        assert!(!drivers.contains_key(name), "driver '{name}' registered twice");
        debug!(driver = name, "registered driver");
        drivers.insert(name.to_string(), driver);
    }

    /// Returns a new dialect for `db_type`.
    #[must_use]
    pub fn query_dialect(&self, db_type: &DbType) -> Option<Box<dyn Dialect>> {
        let dialects = self.dialects.read().unwrap_or_else(PoisonError::into_inner);
        dialects.get(db_type).map(|factory| factory())
    }

    #[must_use]
    pub fn query_driver(&self, name: &str) -> Option<Arc<dyn Driver>> {
        let drivers = self.drivers.read().unwrap_or_else(PoisonError::into_inner);
        drivers.get(name).cloned()
    }

    /// Registered backend tags, sorted.
    #[must_use]
    pub fn dialect_tags(&self) -> Vec<DbType> {
        let dialects = self.dialects.read().unwrap_or_else(PoisonError::into_inner);
        let mut tags: Vec<DbType> = dialects.keys().cloned().collect();
        tags.sort();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::testing::TestDialect;

    fn test_dialect() -> Box<dyn Dialect> {
        Box::new(TestDialect::new())
    }

    struct EchoDriver;

    impl Driver for EchoDriver {
        fn parse(&self, _driver_name: &str, data_source_name: &str) -> Result<Uri> {
            let mut uri = Uri::new(DbType::new("test"));
            uri.db_name = data_source_name.to_string();
            Ok(uri)
        }
    }

    #[test]
    fn test_query_registered_dialect() {
        let registry = Registry::new();
        registry.register_dialect(DbType::new("test"), test_dialect);

        let dialect = registry.query_dialect(&DbType::new("test")).unwrap();
        assert_eq!(dialect.quote_char(), '`');
        assert_eq!(registry.dialect_tags(), vec![DbType::new("test")]);
    }

    #[test]
    fn test_query_unknown_is_none() {
        let registry = Registry::new();
        assert!(registry.query_dialect(&DbType::ORACLE).is_none());
        assert!(registry.query_driver("oracle").is_none());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_dialect_panics() {
        let registry = Registry::new();
        registry.register_dialect(DbType::new("test"), test_dialect);
        registry.register_dialect(DbType::new("test"), test_dialect);
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_driver_panics() {
        let registry = Registry::new();
        registry.register_driver("echo", Arc::new(EchoDriver));
        registry.register_driver("echo", Arc::new(EchoDriver));
    }

    #[test]
    fn test_driver_lookup() {
        let registry = Registry::new();
        registry.register_driver("echo", Arc::new(EchoDriver));
        let uri = registry.query_driver("echo").unwrap().parse("echo", "db").unwrap();
        assert_eq!(uri.db_name, "db");
    }
}
