use std::sync::Arc;

use chrono::{Local, NaiveDate};
use ulid::Ulid;

use crate::model::{DateSpan, Horizon};

use super::store::ReservationStore;
use super::EngineError;

/// Longest permitted stay, in days.
pub const DEFAULT_MAX_STAY_DAYS: i64 = 3;

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Outcome of checking a candidate window. First failing rule wins; the rules
/// run in a fixed order: start bound, end bound, length, conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Ok,
    InvalidStart,
    InvalidEnd,
    RangeTooLong,
    /// Carries the id of one reservation already holding a requested day.
    Conflict(Ulid),
}

impl Validation {
    pub fn into_result(self) -> Result<(), EngineError> {
        match self {
            Validation::Ok => Ok(()),
            Validation::InvalidStart => Err(EngineError::InvalidStart),
            Validation::InvalidEnd => Err(EngineError::InvalidEnd),
            Validation::RangeTooLong => Err(EngineError::RangeTooLong),
            Validation::Conflict(id) => Err(EngineError::Conflict(id)),
        }
    }
}

/// Pure window-and-length rules plus the store-backed conflict check.
/// Validation never mutates anything and may run concurrently from any caller.
pub struct DateRangeRules {
    store: Arc<dyn ReservationStore>,
    max_stay_days: i64,
}

impl DateRangeRules {
    pub fn new(store: Arc<dyn ReservationStore>, max_stay_days: i64) -> Self {
        Self { store, max_stay_days }
    }

    /// Bounds-only check, used for availability query windows where length and
    /// occupancy don't apply.
    pub fn window_bounds(span: &DateSpan, horizon: &Horizon) -> Validation {
        if !horizon.contains(span.start) {
            return Validation::InvalidStart;
        }
        if !horizon.contains(span.end) {
            return Validation::InvalidEnd;
        }
        Validation::Ok
    }

    pub async fn validate(&self, span: &DateSpan, today: NaiveDate) -> Result<Validation, EngineError> {
        self.validate_excluding(span, today, None).await
    }

    /// Full validation of a booking window. `exclude` names a reservation that
    /// must not count as a conflict — the modify path passes the reservation
    /// being modified so it can keep or shift its own dates.
    pub async fn validate_excluding(
        &self,
        span: &DateSpan,
        today: NaiveDate,
        exclude: Option<Ulid>,
    ) -> Result<Validation, EngineError> {
        let horizon = Horizon::current(today);
        match Self::window_bounds(span, &horizon) {
            Validation::Ok => {}
            failed => return Ok(failed),
        }
        if span.length_days() > self.max_stay_days {
            return Ok(Validation::RangeTooLong);
        }

        // The conflict check reads the authoritative store, never the cache:
        // it must observe the latest committed state.
        let overlapping = self.store.find_overlapping(span).await?;
        if let Some(hit) = overlapping.iter().find(|r| exclude != Some(r.id)) {
            return Ok(Validation::Conflict(hit.id));
        }
        Ok(Validation::Ok)
    }
}
