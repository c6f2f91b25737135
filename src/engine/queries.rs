use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;

use crate::model::{DateSpan, Horizon};
use crate::observability;

use super::availability::subtract_reserved;
use super::cache::AvailabilityCache;
use super::rules::{today, DateRangeRules};
use super::store::ReservationStore;
use super::EngineError;

/// One read-only computation, with its reply channel.
pub(super) enum Query {
    Availability {
        /// `None` means the whole current horizon.
        window: Option<DateSpan>,
        response: oneshot::Sender<Result<Vec<NaiveDate>, EngineError>>,
    },
}

/// Shared dependencies of the query pool. Cloned once per worker.
#[derive(Clone)]
pub(super) struct QueryContext {
    pub store: Arc<dyn ReservationStore>,
    pub cache: Arc<AvailabilityCache>,
    pub use_cache_for_reads: bool,
}

/// One worker of the bounded query pool. Workers share a single receiver;
/// whichever is idle picks up the next query, so reads proceed in parallel
/// with each other and with the in-flight mutation.
pub(super) async fn query_loop(
    worker: usize,
    ctx: QueryContext,
    rx: Arc<Mutex<mpsc::Receiver<Query>>>,
) {
    loop {
        let op = rx.lock().await.recv().await;
        let Some(op) = op else { break };
        match op {
            Query::Availability { window, response } => {
                let started = Instant::now();
                let result = ctx.availability(window).await;
                let status = if result.is_ok() { "ok" } else { "error" };
                metrics::counter!(observability::QUERIES_TOTAL, "status" => status).increment(1);
                metrics::histogram!(observability::QUERY_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                let _ = response.send(result);
            }
        }
    }
    debug!("query worker {worker} shutting down");
}

impl QueryContext {
    async fn availability(&self, window: Option<DateSpan>) -> Result<Vec<NaiveDate>, EngineError> {
        let horizon = Horizon::current(today());
        let span = match window {
            Some(w) => {
                DateRangeRules::window_bounds(&w, &horizon).into_result()?;
                w
            }
            None => horizon.span(),
        };

        if self.use_cache_for_reads {
            return Ok(self.cache.available_dates_in(&span));
        }

        // Canonical path: recompute from the authoritative store.
        let reservations = self.store.find_overlapping(&span).await?;
        Ok(subtract_reserved(&span, &reservations))
    }
}
