use ulid::Ulid;

use crate::model::{HORIZON_LEAD_DAYS, HORIZON_MONTHS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    NotFound(Ulid),
    InvalidStart,
    InvalidEnd,
    RangeTooLong,
    EndBeforeStart,
    Conflict(Ulid),
    MalformedInput(String),
    Store(String),
    LaneClosed,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::InvalidStart => write!(
                f,
                "invalid start date: the campsite can be reserved minimum {HORIZON_LEAD_DAYS} day(s) \
                 ahead of arrival and up to {HORIZON_MONTHS} month in advance"
            ),
            EngineError::InvalidEnd => write!(
                f,
                "invalid end date: the campsite can be reserved minimum {HORIZON_LEAD_DAYS} day(s) \
                 ahead of arrival and up to {HORIZON_MONTHS} month in advance"
            ),
            EngineError::RangeTooLong => {
                write!(f, "invalid date range: the campsite can be reserved for at most 3 days")
            }
            EngineError::EndBeforeStart => write!(f, "end date cannot be before start date"),
            EngineError::Conflict(id) => write!(
                f,
                "one or more requested dates have already been reserved (conflicts with {id})"
            ),
            EngineError::MalformedInput(msg) => write!(f, "malformed input: {msg}"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
            EngineError::LaneClosed => write!(f, "execution lane shut down"),
        }
    }
}

impl std::error::Error for EngineError {}
