//! Helpers shared by the catalog readers.

use std::future::Future;

use oxide_schema_core::{Result, SchemaError, Uri};
use sqlx::Connection;

/// Runs `fut`, bounded by the descriptor's timeout when one is set.
pub(crate) async fn bounded<T, F>(uri: &Uri, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match uri.timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| SchemaError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Closes `conn` and returns `result`. A query error wins over a close
/// error.
pub(crate) async fn finish<C: Connection, T>(conn: C, result: Result<T>) -> Result<T> {
    let closed = conn.close().await;
    let value = result?;
    closed.map_err(SchemaError::database)?;
    Ok(value)
}

/// Escapes a string for use inside a single-quoted SQL literal.
pub(crate) fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use oxide_schema_core::DbType;

    use super::*;

    #[tokio::test]
    async fn test_bounded_times_out() {
        let mut uri = Uri::new(DbType::SQLITE);
        uri.timeout = Some(Duration::from_millis(10));
        let result: Result<()> = bounded(&uri, std::future::pending()).await;
        assert!(matches!(
            result,
            Err(SchemaError::Timeout(limit)) if limit == Duration::from_millis(10)
        ));
    }

    #[tokio::test]
    async fn test_bounded_without_timeout() {
        let uri = Uri::new(DbType::SQLITE);
        assert_eq!(bounded(&uri, async { Ok(7) }).await.unwrap(), 7);
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("it's"), "'it''s'");
    }
}
