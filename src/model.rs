use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::engine::EngineError;

/// First bookable day is tomorrow.
pub const HORIZON_LEAD_DAYS: u64 = 1;
/// Last bookable day is one month from today.
pub const HORIZON_MONTHS: u32 = 1;

/// Inclusive calendar-day interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DateSpan start must not be after end");
        Self { start, end }
    }

    /// Boundary constructor for caller-supplied dates.
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::EndBeforeStart);
        }
        Ok(Self { start, end })
    }

    /// Number of days covered, counting both endpoints.
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Inclusive overlap: the spans share at least one day.
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Every day in the span, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// The sliding window of bookable dates, recomputed relative to `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub begin: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn current(today: NaiveDate) -> Self {
        Self {
            begin: today + Days::new(HORIZON_LEAD_DAYS),
            end: today + Months::new(HORIZON_MONTHS),
        }
    }

    pub fn span(&self) -> DateSpan {
        DateSpan::new(self.begin, self.end)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.begin <= day && day <= self.end
    }
}

/// An active reservation. The identifier is assigned once and never changes;
/// every other field may be replaced by a modify operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub name: String,
    pub email: String,
    pub span: DateSpan,
}

impl Reservation {
    /// Mint a new reservation with a fresh identifier.
    pub fn from_draft(draft: ReservationDraft) -> Self {
        Self::with_id(Ulid::new(), draft)
    }

    /// Rebuild a reservation around an existing identifier (modify path).
    pub fn with_id(id: Ulid, draft: ReservationDraft) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            span: draft.span,
        }
    }
}

/// Caller-supplied reservation fields, before an identifier exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub name: String,
    pub email: String,
    pub span: DateSpan,
}

/// Parse a `YYYY-MM-DD` calendar day from the request layer.
pub fn parse_day(input: &str) -> Result<NaiveDate, EngineError> {
    input
        .parse()
        .map_err(|_| EngineError::MalformedInput("dates must be in the form YYYY-MM-DD".into()))
}

/// Parse a reservation identifier from the request layer.
pub fn parse_reservation_id(input: &str) -> Result<Ulid, EngineError> {
    input
        .parse()
        .map_err(|_| EngineError::MalformedInput("id must be a valid ULID".into()))
}
