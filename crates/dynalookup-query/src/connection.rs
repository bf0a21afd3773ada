use crate::error::Result;
use crate::traits::{StatementStore, StoreConnector};
use crate::types::ConnectionSettings;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

struct ActiveClient {
    settings: ConnectionSettings,
    store: Arc<dyn StatementStore>,
}

/// Owns the shared store client and rebuilds it when the connection
/// settings change.
///
/// The compare-and-swap runs under a lock, so concurrent callers never build
/// two clients for the same settings. Batches already holding the previous
/// `Arc` keep using it until they finish.
pub struct ConnectionManager {
    connector: Arc<dyn StoreConnector>,
    active: Mutex<Option<ActiveClient>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connector,
            active: Mutex::new(None),
        }
    }

    /// Return the client for `settings`, building a new one when there is
    /// none yet or the settings differ from the last ones used.
    pub async fn ensure_client(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn StatementStore>> {
        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref() {
            if current.settings == *settings {
                trace!("Reusing existing {} client", self.connector.backend_type());
                return Ok(current.store.clone());
            }
        }

        debug!(
            backend = self.connector.backend_type(),
            settings = ?settings,
            "Creating new store client"
        );

        let store = self.connector.connect(settings).await?;
        *active = Some(ActiveClient {
            settings: settings.clone(),
            store: store.clone(),
        });

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::traits::{MockStatementStore, MockStoreConnector};

    fn settings(region: &str, secret: &str) -> ConnectionSettings {
        ConnectionSettings {
            region: region.to_string(),
            endpoint: None,
            access_key_id: "AKIA".to_string(),
            secret_access_key: secret.to_string(),
        }
    }

    fn connector_expecting(times: usize) -> MockStoreConnector {
        let mut connector = MockStoreConnector::new();
        connector.expect_backend_type().return_const("mock");
        connector.expect_connect().times(times).returning(|_| {
            let mut store = MockStatementStore::new();
            store.expect_store_type().return_const("mock");
            Ok(Arc::new(store) as Arc<dyn StatementStore>)
        });
        connector
    }

    #[tokio::test]
    async fn test_reuses_client_for_same_settings() {
        let manager = ConnectionManager::new(Arc::new(connector_expecting(1)));

        let first = manager.ensure_client(&settings("us-east-1", "s")).await.unwrap();
        let second = manager.ensure_client(&settings("us-east-1", "s")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_rebuilds_client_when_settings_change() {
        let manager = ConnectionManager::new(Arc::new(connector_expecting(3)));

        let first = manager.ensure_client(&settings("us-east-1", "s")).await.unwrap();
        let second = manager.ensure_client(&settings("eu-west-1", "s")).await.unwrap();
        let third = manager.ensure_client(&settings("eu-west-1", "rotated")).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_client() {
        let manager = Arc::new(ConnectionManager::new(Arc::new(connector_expecting(1))));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move {
                    manager
                        .ensure_client(&settings("us-east-1", "s"))
                        .await
                        .map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_connect_failure_is_not_cached() {
        let mut connector = MockStoreConnector::new();
        connector.expect_backend_type().return_const("mock");
        connector
            .expect_connect()
            .times(2)
            .returning(|_| Err(DataError::ConnectionFailed("bad credentials".to_string())));

        let manager = ConnectionManager::new(Arc::new(connector));
        assert!(manager.ensure_client(&settings("us-east-1", "s")).await.is_err());
        assert!(manager.ensure_client(&settings("us-east-1", "s")).await.is_err());
    }
}
