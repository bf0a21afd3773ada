use crate::connection::ConnectionManager;
use crate::error::{DataError, LookupError, Result};
use crate::projection::Projection;
use crate::query::build_query;
use crate::traits::{StatementStore, StoreConnector};
use crate::types::{Entity, LookupOptions, LookupResult, StatementQuery};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, trace};

/// Maximum number of statements in flight for one batch
pub const MAX_CONCURRENT_QUERIES: usize = 10;

/// Detail attached to every batch failure
pub const LOOKUP_ERROR_DETAIL: &str = "Error running PartiQL query";

/// Runs batch lookups: one statement per entity, bounded concurrency,
/// results in input order.
pub struct LookupExecutor {
    connections: ConnectionManager,
    max_concurrency: usize,
}

impl LookupExecutor {
    pub fn new(connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            connections: ConnectionManager::new(connector),
            max_concurrency: MAX_CONCURRENT_QUERIES,
        }
    }

    /// Lower the in-flight limit; values are clamped to 1..=10
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.clamp(1, MAX_CONCURRENT_QUERIES);
        self
    }

    /// Look up every entity and return one result per entity, in input
    /// order.
    ///
    /// The first failing statement fails the whole batch; no partial
    /// results are returned. Statements already sent are left to finish,
    /// queued ones are abandoned.
    pub async fn lookup(
        &self,
        entities: &[Entity],
        options: &LookupOptions,
    ) -> std::result::Result<Vec<LookupResult>, LookupError> {
        match self.run_batch(entities, options).await {
            Ok(results) => {
                trace!(lookup_results = ?results, "lookup results");
                Ok(results)
            }
            Err(err) => {
                error!(error = %err, "lookup failed");
                Err(LookupError::from_data_error(&err, Some(LOOKUP_ERROR_DETAIL)))
            }
        }
    }

    async fn run_batch(
        &self,
        entities: &[Entity],
        options: &LookupOptions,
    ) -> Result<Vec<LookupResult>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let projection = Arc::new(Projection::compile(options)?);
        let store = self
            .connections
            .ensure_client(&options.connection_settings())
            .await?;

        debug!(
            entity_count = entities.len(),
            max_concurrency = self.max_concurrency,
            "Starting lookup batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let abandoned = Arc::new(AtomicBool::new(false));
        let mut tasks: JoinSet<Result<(usize, Option<LookupResult>)>> = JoinSet::new();

        for (index, entity) in entities.iter().enumerate() {
            tasks.spawn(run_task(
                index,
                entity.clone(),
                build_query(entity, options),
                store.clone(),
                projection.clone(),
                semaphore.clone(),
                abandoned.clone(),
            ));
        }

        let mut slots: Vec<Option<LookupResult>> = vec![None; entities.len()];

        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| DataError::Internal(format!("Lookup task failed: {}", e)))
                .and_then(|result| result);

            match outcome {
                Ok((index, Some(result))) => slots[index] = Some(result),
                Ok((_, None)) => {}
                Err(err) => {
                    abandoned.store(true, Ordering::Release);
                    // Let statements that are already running complete
                    tasks.detach_all();
                    return Err(err);
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| DataError::Internal(format!("No result for entity {}", index)))
            })
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_task(
    index: usize,
    entity: Entity,
    query: StatementQuery,
    store: Arc<dyn StatementStore>,
    projection: Arc<Projection>,
    semaphore: Arc<Semaphore>,
    abandoned: Arc<AtomicBool>,
) -> Result<(usize, Option<LookupResult>)> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| DataError::Internal(format!("Query slot unavailable: {}", e)))?;

    if abandoned.load(Ordering::Acquire) {
        return Ok((index, None));
    }

    trace!(query = ?query, "search PartiQL query");
    let records = store.execute_statement(&query).await?;

    let data = if records.is_empty() {
        None
    } else {
        Some(projection.project(records))
    };

    Ok((index, Some(LookupResult { entity, data })))
}
