use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{Months, NaiveDate};
use ulid::Ulid;

use crate::model::{DateSpan, Horizon, Reservation, HORIZON_MONTHS};

/// In-memory mirror of per-day occupancy across the booking horizon.
///
/// One key per covered day; `None` means free. The cache is advisory: the
/// store stays authoritative, and callers (the mutation lane) are responsible
/// for never adding a reservation over a live collision. All operations
/// serialize on a single internal lock, independent of the mutation lane's
/// own serialization.
pub struct AvailabilityCache {
    slots: Mutex<BTreeMap<NaiveDate, Option<Reservation>>>,
}

impl AvailabilityCache {
    /// A cache covering the given horizon with every day free.
    pub fn for_horizon(horizon: &Horizon) -> Self {
        let slots = horizon.span().days().map(|day| (day, None)).collect();
        Self {
            slots: Mutex::new(slots),
        }
    }

    fn slots(&self) -> MutexGuard<'_, BTreeMap<NaiveDate, Option<Reservation>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark every day of the reservation's span as held by it. Overwrites
    /// whatever was there; collision-freedom is guaranteed upstream.
    pub fn add(&self, reservation: &Reservation) {
        let mut slots = self.slots();
        for day in reservation.span.days() {
            slots.insert(day, Some(reservation.clone()));
        }
    }

    /// Free every day currently held by the given identifier. Matching is by
    /// identifier, not by recomputing the reservation's span, so stale or
    /// already-mutated copies of the reservation can't leave days behind.
    pub fn remove(&self, id: Ulid) {
        let mut slots = self.slots();
        for slot in slots.values_mut() {
            if slot.as_ref().is_some_and(|r| r.id == id) {
                *slot = None;
            }
        }
    }

    /// Point lookup: who holds this day, if anyone.
    pub fn get(&self, day: NaiveDate) -> Option<Reservation> {
        self.slots().get(&day).cloned().flatten()
    }

    /// All free days across the covered horizon, ascending.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.slots()
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(day, _)| *day)
            .collect()
    }

    /// Free days within `[span.start, span.end]`, ascending.
    pub fn available_dates_in(&self, span: &DateSpan) -> Vec<NaiveDate> {
        self.slots()
            .range(span.start..=span.end)
            .filter(|(_, slot)| slot.is_none())
            .map(|(day, _)| *day)
            .collect()
    }

    /// Slide the covered horizon forward one day: drop `today` (no longer
    /// bookable) and open `today + 1 month` as free. Re-running on the same
    /// day removes nothing further and leaves an already-opened day untouched.
    pub fn rotate(&self, today: NaiveDate) {
        let mut slots = self.slots();
        slots.remove(&today);
        slots.entry(today + Months::new(HORIZON_MONTHS)).or_insert(None);
    }

    pub fn free_count(&self) -> usize {
        self.slots().values().filter(|slot| slot.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationDraft;
    use chrono::Days;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn horizon() -> Horizon {
        Horizon::current(d("2026-09-01"))
    }

    fn reservation(start: &str, end: &str) -> Reservation {
        Reservation::from_draft(ReservationDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            span: DateSpan::new(d(start), d(end)),
        })
    }

    #[test]
    fn starts_fully_free() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        // 2026-09-02 through 2026-10-01 inclusive.
        assert_eq!(cache.free_count(), 30);
        assert_eq!(cache.available_dates().first(), Some(&d("2026-09-02")));
        assert_eq!(cache.available_dates().last(), Some(&d("2026-10-01")));
    }

    #[test]
    fn add_then_remove_restores_every_day() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        let before = cache.available_dates();
        let r = reservation("2026-09-10", "2026-09-12");
        cache.add(&r);
        assert_eq!(cache.free_count(), 27);
        assert_eq!(cache.get(d("2026-09-11")), Some(r.clone()));
        cache.remove(r.id);
        assert_eq!(cache.available_dates(), before);
    }

    #[test]
    fn remove_matches_by_identifier_not_current_span() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        let r = reservation("2026-09-10", "2026-09-12");
        cache.add(&r);
        // Mutate a copy's dates elsewhere; removal by id still clears the old days.
        let mut stale = r.clone();
        stale.span = DateSpan::new(d("2026-09-20"), d("2026-09-21"));
        cache.remove(stale.id);
        assert!(cache.get(d("2026-09-10")).is_none());
        assert!(cache.get(d("2026-09-12")).is_none());
    }

    #[test]
    fn range_lookup_is_inclusive_and_ascending() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        cache.add(&reservation("2026-09-03", "2026-09-05"));
        let free = cache.available_dates_in(&DateSpan::new(d("2026-09-02"), d("2026-09-06")));
        assert_eq!(free, vec![d("2026-09-02"), d("2026-09-06")]);
    }

    #[test]
    fn range_lookup_ignores_days_outside_coverage() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        // 2026-09-01 (today) is not a covered day.
        let free = cache.available_dates_in(&DateSpan::new(d("2026-08-30"), d("2026-09-03")));
        assert_eq!(free, vec![d("2026-09-02"), d("2026-09-03")]);
    }

    #[test]
    fn rotate_drops_today_and_opens_one_new_day() {
        let today = d("2026-09-02");
        let cache = AvailabilityCache::for_horizon(&Horizon::current(d("2026-09-01")));
        let before = cache.free_count();
        cache.rotate(today);
        // Today removed, 2026-10-02 opened: net count unchanged.
        assert_eq!(cache.free_count(), before);
        assert!(!cache.available_dates().contains(&today));
        assert!(cache.available_dates().contains(&d("2026-10-02")));
    }

    #[test]
    fn rotate_twice_same_day_removes_only_one_day() {
        let today = d("2026-09-02");
        let cache = AvailabilityCache::for_horizon(&Horizon::current(d("2026-09-01")));
        let before = cache.free_count();
        cache.rotate(today);
        cache.rotate(today);
        assert_eq!(cache.free_count(), before);
        assert!(cache.available_dates().contains(&(today + Days::new(1))));
    }

    #[test]
    fn rotate_does_not_clobber_a_booked_new_day() {
        let today = d("2026-09-02");
        let cache = AvailabilityCache::for_horizon(&Horizon::current(d("2026-09-01")));
        cache.rotate(today);
        let r = reservation("2026-10-02", "2026-10-02");
        cache.add(&r);
        cache.rotate(today);
        assert_eq!(cache.get(d("2026-10-02")), Some(r));
    }

    #[test]
    fn add_overwrites_existing_holder() {
        let cache = AvailabilityCache::for_horizon(&horizon());
        let a = reservation("2026-09-10", "2026-09-11");
        let b = reservation("2026-09-11", "2026-09-12");
        cache.add(&a);
        cache.add(&b);
        assert_eq!(cache.get(d("2026-09-11")), Some(b));
        assert_eq!(cache.get(d("2026-09-10")), Some(a));
    }
}
