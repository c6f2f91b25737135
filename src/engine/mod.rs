mod availability;
mod cache;
mod error;
mod mutations;
mod queries;
mod rules;
mod store;

pub use availability::{expand_dates, subtract_reserved};
pub use cache::AvailabilityCache;
pub use error::EngineError;
pub use rules::{DateRangeRules, Validation, DEFAULT_MAX_STAY_DAYS};
pub use store::{MemoryStore, ReservationStore};

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot, Mutex};
use ulid::Ulid;

use crate::model::{DateSpan, Horizon, Reservation, ReservationDraft};

use mutations::{Mutation, MutationLane};
use queries::{Query, QueryContext};

/// Queued-but-unserved depth per lane before submitters start waiting.
const MUTATION_QUEUE_DEPTH: usize = 4096;
const QUERY_QUEUE_DEPTH: usize = 4096;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Parallel workers for read-only availability queries.
    pub query_workers: usize,
    /// Serve availability reads from the cache instead of recomputing from
    /// the store. Off by default; the cache is still maintained by writes.
    pub use_cache_for_reads: bool,
    /// Longest permitted stay, in days.
    pub max_stay_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_workers: 5,
            use_cache_for_reads: false,
            max_stay_days: DEFAULT_MAX_STAY_DAYS,
        }
    }
}

/// The reservation service facade. Owns the serialized mutation lane and the
/// bounded query pool; the request layer mounts on these methods.
pub struct Engine {
    mutation_tx: mpsc::Sender<Mutation>,
    query_tx: mpsc::Sender<Query>,
    store: Arc<dyn ReservationStore>,
    cache: Arc<AvailabilityCache>,
}

impl Engine {
    /// Build the engine: warm the availability cache from the store, then
    /// spawn the mutation lane and the query pool.
    pub async fn new(
        store: Arc<dyn ReservationStore>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let horizon = Horizon::current(rules::today());
        let cache = Arc::new(AvailabilityCache::for_horizon(&horizon));
        for reservation in store.find_overlapping(&horizon.span()).await? {
            cache.add(&reservation);
        }
        metrics::gauge!(crate::observability::CACHE_FREE_DATES).set(cache.free_count() as f64);

        let lane = MutationLane {
            store: store.clone(),
            cache: cache.clone(),
            rules: DateRangeRules::new(store.clone(), config.max_stay_days),
        };
        let (mutation_tx, mutation_rx) = mpsc::channel(MUTATION_QUEUE_DEPTH);
        tokio::spawn(mutations::mutation_loop(lane, mutation_rx));

        let ctx = QueryContext {
            store: store.clone(),
            cache: cache.clone(),
            use_cache_for_reads: config.use_cache_for_reads,
        };
        let (query_tx, query_rx) = mpsc::channel(QUERY_QUEUE_DEPTH);
        let query_rx = Arc::new(Mutex::new(query_rx));
        for worker in 0..config.query_workers.max(1) {
            tokio::spawn(queries::query_loop(worker, ctx.clone(), query_rx.clone()));
        }

        Ok(Self {
            mutation_tx,
            query_tx,
            store,
            cache,
        })
    }

    /// Reserve the campsite. Validation runs inside the mutation lane, so of
    /// two concurrent requests for overlapping windows at most one succeeds.
    pub async fn create_reservation(
        &self,
        draft: ReservationDraft,
    ) -> Result<Reservation, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.submit(Mutation::Create { draft, response: tx }, rx).await
    }

    /// Replace a reservation's dates and holder fields; the identifier is
    /// preserved. On validation failure the stored reservation is untouched.
    pub async fn modify_reservation(
        &self,
        id: Ulid,
        draft: ReservationDraft,
    ) -> Result<Reservation, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.submit(Mutation::Modify { id, draft, response: tx }, rx).await
    }

    pub async fn cancel_reservation(&self, id: Ulid) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.submit(Mutation::Cancel { id, response: tx }, rx).await
    }

    /// Free days in the given window, or across the whole horizon if `None`.
    /// Served by the query pool; never blocks on the mutation lane, so the
    /// answer may trail an in-flight mutation but never shows a partial one.
    pub async fn availability(
        &self,
        window: Option<DateSpan>,
    ) -> Result<Vec<NaiveDate>, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.query_tx
            .send(Query::Availability { window, response: tx })
            .await
            .map_err(|_| EngineError::LaneClosed)?;
        rx.await.map_err(|_| EngineError::LaneClosed)?
    }

    /// Point read from the store, bypassing both lanes.
    pub async fn find_reservation(&self, id: Ulid) -> Result<Option<Reservation>, EngineError> {
        self.store.find_by_id(id).await
    }

    /// Every active reservation, ordered by start date.
    pub async fn list_reservations(&self) -> Result<Vec<Reservation>, EngineError> {
        self.store.find_all().await
    }

    /// The availability cache, for the horizon rotator and read fast-path.
    pub fn cache(&self) -> Arc<AvailabilityCache> {
        self.cache.clone()
    }

    async fn submit<T>(
        &self,
        op: Mutation,
        rx: oneshot::Receiver<Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        self.mutation_tx
            .send(op)
            .await
            .map_err(|_| EngineError::LaneClosed)?;
        rx.await.map_err(|_| EngineError::LaneClosed)?
    }
}
