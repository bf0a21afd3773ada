use crate::error::Result;
use crate::types::{ConnectionSettings, RawRecord, StatementQuery};
use async_trait::async_trait;
use std::sync::Arc;

/// A data store that executes parameterized statements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Get the type name of this store
    fn store_type(&self) -> &'static str;

    /// Execute one statement and return its rows as plain records.
    /// Only the first page, bounded by `query.limit`, is returned.
    async fn execute_statement(&self, query: &StatementQuery) -> Result<Vec<RawRecord>>;
}

/// Builds store clients from connection settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Get the backend type this connector handles
    fn backend_type(&self) -> &'static str;

    /// Create a new client for `settings`
    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn StatementStore>>;
}
