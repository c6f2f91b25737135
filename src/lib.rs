//! Exclusive reservation of a single campsite across a rolling one-month
//! booking horizon.
//!
//! All state-changing operations funnel through one serialized mutation lane,
//! which is what makes double-booking impossible without store-level locking;
//! availability reads run on a small parallel pool and may trail an in-flight
//! mutation. An in-memory per-day cache mirrors the authoritative store and
//! is rotated forward one day every night.

pub mod engine;
pub mod model;
pub mod observability;
pub mod rotator;

pub use engine::{Engine, EngineConfig, EngineError};
pub use model::{DateSpan, Horizon, Reservation, ReservationDraft};
