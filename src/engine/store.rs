use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{DateSpan, Reservation};

use super::EngineError;

/// The authoritative reservation store. This is the single source of truth;
/// the availability cache only mirrors it. Implementations may be backed by
/// anything that can answer an overlapping-range query.
///
/// Overlap is inclusive on both ends: a stored reservation overlaps `span`
/// unless it ends before `span.start` or starts after `span.end`.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn find_by_id(&self, id: Ulid) -> Result<Option<Reservation>, EngineError>;

    /// Insert or replace by identifier, returning the stored value.
    async fn save(&self, reservation: Reservation) -> Result<Reservation, EngineError>;

    async fn delete_by_id(&self, id: Ulid) -> Result<(), EngineError>;

    /// All reservations whose span overlaps `span`, ordered by start date.
    async fn find_overlapping(&self, span: &DateSpan) -> Result<Vec<Reservation>, EngineError>;

    /// Every stored reservation, ordered by start date.
    async fn find_all(&self) -> Result<Vec<Reservation>, EngineError>;
}

/// In-memory store. Concurrent readers are fine; writes arrive only from the
/// serialized mutation lane.
pub struct MemoryStore {
    reservations: DashMap<Ulid, Reservation>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn find_by_id(&self, id: Ulid) -> Result<Option<Reservation>, EngineError> {
        Ok(self.reservations.get(&id).map(|e| e.value().clone()))
    }

    async fn save(&self, reservation: Reservation) -> Result<Reservation, EngineError> {
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn delete_by_id(&self, id: Ulid) -> Result<(), EngineError> {
        self.reservations.remove(&id);
        Ok(())
    }

    async fn find_overlapping(&self, span: &DateSpan) -> Result<Vec<Reservation>, EngineError> {
        let mut hits: Vec<Reservation> = self
            .reservations
            .iter()
            .filter(|e| e.value().span.overlaps(span))
            .map(|e| e.value().clone())
            .collect();
        hits.sort_by_key(|r| r.span.start);
        Ok(hits)
    }

    async fn find_all(&self) -> Result<Vec<Reservation>, EngineError> {
        let mut all: Vec<Reservation> = self.reservations.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|r| r.span.start);
        Ok(all)
    }
}
