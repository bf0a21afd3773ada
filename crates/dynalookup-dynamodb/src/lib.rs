//! DynamoDB implementation of the dynalookup-query store traits
//!
//! Statements are executed with PartiQL `ExecuteStatement`; the single
//! entity parameter is bound as a string attribute and returned items are
//! unmarshalled into plain JSON records.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dynalookup_dynamodb::DynamoDbConnector;
//! use dynalookup_query::{Entity, LookupExecutor, LookupOptions};
//!
//! # async fn example() {
//! let executor = LookupExecutor::new(Arc::new(DynamoDbConnector::new()));
//!
//! let options = LookupOptions::new(
//!     "us-east-1",
//!     "SELECT * FROM \"users\" WHERE \"pk\" = ?",
//!     "USER#{{entity}}",
//! )
//! .with_endpoint("http://localhost:8000")
//! .with_credentials("local", "local");
//!
//! let results = executor.lookup(&[Entity::new("42")], &options).await;
//! # }
//! ```

pub mod unmarshall;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::config::{Region, SharedCredentialsProvider};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use dynalookup_query::{
    ConnectionSettings, DataError, RawRecord, Result, StatementQuery, StatementStore,
    StoreConnector,
};
use std::sync::Arc;
use tracing::{debug, error};

pub use unmarshall::{attribute_to_json, unmarshall};

/// Name reported to AWS for credentials supplied through lookup options
const CREDENTIALS_PROVIDER_NAME: &str = "dynalookup-options";

/// DynamoDB statement store
pub struct DynamoDbStore {
    client: Client,
    region: String,
}

impl DynamoDbStore {
    /// Create a new DynamoDB store
    ///
    /// # Arguments
    ///
    /// * `settings` - Region, optional custom endpoint (DynamoDB Local,
    ///   LocalStack) and credentials. Blank credentials fall back to the
    ///   default AWS provider chain.
    pub async fn new(settings: &ConnectionSettings) -> Result<Self> {
        if settings.region.trim().is_empty() {
            return Err(DataError::ConnectionFailed(
                "A region is required to create a DynamoDB client".to_string(),
            ));
        }

        debug!(
            "Creating DynamoDB client for region: {} (endpoint: {:?})",
            settings.region, settings.endpoint
        );

        let region_provider =
            RegionProviderChain::first_try(Region::new(settings.region.clone()));

        let mut config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region_provider);

        if !settings.access_key_id.is_empty() || !settings.secret_access_key.is_empty() {
            let credentials = Credentials::new(
                settings.access_key_id.clone(),
                settings.secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            );
            config_builder =
                config_builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        if let Some(endpoint) = settings.endpoint.as_deref() {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let config = config_builder.load().await;
        let client = Client::new(&config);

        debug!("DynamoDB client created successfully");

        Ok(Self {
            client,
            region: settings.region.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl StatementStore for DynamoDbStore {
    fn store_type(&self) -> &'static str {
        "dynamodb"
    }

    async fn execute_statement(&self, query: &StatementQuery) -> Result<Vec<RawRecord>> {
        let parameters: Vec<AttributeValue> = query
            .parameters
            .iter()
            .map(|p| AttributeValue::S(p.clone()))
            .collect();

        let output = self
            .client
            .execute_statement()
            .statement(&query.statement)
            .set_parameters(Some(parameters))
            .set_limit(query.limit)
            .send()
            .await
            .map_err(|e| {
                error!(
                    "Failed to execute PartiQL statement '{}': {}",
                    query.statement,
                    DisplayErrorContext(&e)
                );
                DataError::QueryFailed(DisplayErrorContext(&e).to_string())
            })?;

        let records = output
            .items()
            .iter()
            .map(unmarshall)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "PartiQL statement returned {} items in region {}",
            records.len(),
            self.region
        );

        Ok(records)
    }
}

/// Builds [`DynamoDbStore`] clients for the connection manager
#[derive(Debug, Clone, Default)]
pub struct DynamoDbConnector;

impl DynamoDbConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for DynamoDbConnector {
    fn backend_type(&self) -> &'static str {
        "dynamodb"
    }

    async fn connect(&self, settings: &ConnectionSettings) -> Result<Arc<dyn StatementStore>> {
        let store = DynamoDbStore::new(settings).await?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(region: &str) -> ConnectionSettings {
        ConnectionSettings {
            region: region.to_string(),
            endpoint: Some("http://localhost:8000".to_string()),
            access_key_id: "local".to_string(),
            secret_access_key: "local".to_string(),
        }
    }

    #[test]
    fn test_backend_type() {
        assert_eq!(DynamoDbConnector::new().backend_type(), "dynamodb");
    }

    #[tokio::test]
    async fn test_connect_requires_region() {
        let result = DynamoDbConnector::new().connect(&settings(" ")).await;
        assert!(matches!(result, Err(DataError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_store_created_with_local_endpoint() {
        let store = DynamoDbStore::new(&settings("us-west-2")).await.unwrap();
        assert_eq!(store.region(), "us-west-2");
        assert_eq!(store.store_type(), "dynamodb");
    }
}
