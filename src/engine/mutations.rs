use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::model::{Reservation, ReservationDraft};
use crate::observability;

use super::cache::AvailabilityCache;
use super::rules::{today, DateRangeRules};
use super::store::ReservationStore;
use super::EngineError;

/// One state-changing operation, with its reply channel.
pub(super) enum Mutation {
    Create {
        draft: ReservationDraft,
        response: oneshot::Sender<Result<Reservation, EngineError>>,
    },
    Modify {
        id: Ulid,
        draft: ReservationDraft,
        response: oneshot::Sender<Result<Reservation, EngineError>>,
    },
    Cancel {
        id: Ulid,
        response: oneshot::Sender<Result<(), EngineError>>,
    },
}

/// Shared dependencies of the serial mutation lane.
pub(super) struct MutationLane {
    pub store: Arc<dyn ReservationStore>,
    pub cache: Arc<AvailabilityCache>,
    pub rules: DateRangeRules,
}

/// The single-worker mutation lane. Exactly one operation runs at a time,
/// start to finish, so the read-validate-write sequence inside each operation
/// can never interleave with another mutation. Operations execute in arrival
/// order; a caller that gave up waiting still gets its effect applied.
pub(super) async fn mutation_loop(lane: MutationLane, mut rx: mpsc::Receiver<Mutation>) {
    while let Some(op) = rx.recv().await {
        let started = Instant::now();
        match op {
            Mutation::Create { draft, response } => {
                let result = lane.create(draft).await;
                record("create", started, result.is_ok());
                let _ = response.send(result);
            }
            Mutation::Modify { id, draft, response } => {
                let result = lane.modify(id, draft).await;
                record("modify", started, result.is_ok());
                let _ = response.send(result);
            }
            Mutation::Cancel { id, response } => {
                let result = lane.cancel(id).await;
                record("cancel", started, result.is_ok());
                let _ = response.send(result);
            }
        }
        metrics::gauge!(observability::CACHE_FREE_DATES).set(lane.cache.free_count() as f64);
    }
    debug!("mutation lane drained, shutting down");
}

fn record(op: &'static str, started: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(observability::MUTATIONS_TOTAL, "op" => op, "status" => status).increment(1);
    metrics::histogram!(observability::MUTATION_DURATION_SECONDS, "op" => op)
        .record(started.elapsed().as_secs_f64());
}

impl MutationLane {
    async fn create(&self, draft: ReservationDraft) -> Result<Reservation, EngineError> {
        // Re-validate inside the lane: the caller's own check may have gone
        // stale while this operation waited its turn.
        self.rules.validate(&draft.span, today()).await?.into_result()?;

        let reservation = Reservation::from_draft(draft);
        let saved = self.store.save(reservation).await?;
        self.cache.add(&saved);
        info!("created reservation {} for {}..={}", saved.id, saved.span.start, saved.span.end);
        Ok(saved)
    }

    async fn modify(&self, id: Ulid, draft: ReservationDraft) -> Result<Reservation, EngineError> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(EngineError::NotFound(id))?;

        // The reservation's own current window must not count as a conflict.
        self.rules
            .validate_excluding(&draft.span, today(), Some(id))
            .await?
            .into_result()?;

        self.cache.remove(existing.id);
        let updated = Reservation::with_id(existing.id, draft);
        let saved = self.store.save(updated).await?;
        self.cache.add(&saved);
        info!("modified reservation {} to {}..={}", saved.id, saved.span.start, saved.span.end);
        Ok(saved)
    }

    async fn cancel(&self, id: Ulid) -> Result<(), EngineError> {
        let existing = match self.store.find_by_id(id).await? {
            Some(r) => r,
            None => {
                warn!("cancel of unknown reservation {id}");
                return Err(EngineError::NotFound(id));
            }
        };
        self.cache.remove(existing.id);
        self.store.delete_by_id(id).await?;
        info!("cancelled reservation {id}");
        Ok(())
    }
}
