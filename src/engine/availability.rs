use chrono::NaiveDate;

use crate::model::{DateSpan, Reservation};

// ── Availability Algorithm ────────────────────────────────────────

/// Expand a span into its individual days, ascending.
pub fn expand_dates(span: &DateSpan) -> Vec<NaiveDate> {
    span.days().collect()
}

/// Free days within `span`: the expanded day list minus every day covered by
/// one of the given reservations. Order stays ascending.
pub fn subtract_reserved(span: &DateSpan, reservations: &[Reservation]) -> Vec<NaiveDate> {
    span.days()
        .filter(|day| !reservations.iter().any(|r| r.span.contains(*day)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReservationDraft;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn span(start: &str, end: &str) -> DateSpan {
        DateSpan::new(d(start), d(end))
    }

    fn reservation(start: &str, end: &str) -> Reservation {
        Reservation::from_draft(ReservationDraft {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            span: span(start, end),
        })
    }

    #[test]
    fn expand_single_day() {
        assert_eq!(expand_dates(&span("2026-09-02", "2026-09-02")), vec![d("2026-09-02")]);
    }

    #[test]
    fn expand_crosses_month_boundary() {
        let days = expand_dates(&span("2026-09-29", "2026-10-02"));
        assert_eq!(
            days,
            vec![d("2026-09-29"), d("2026-09-30"), d("2026-10-01"), d("2026-10-02")]
        );
    }

    #[test]
    fn subtract_nothing_reserved() {
        let q = span("2026-09-01", "2026-09-05");
        assert_eq!(subtract_reserved(&q, &[]), expand_dates(&q));
    }

    #[test]
    fn subtract_middle_punch() {
        let q = span("2026-09-01", "2026-09-05");
        let free = subtract_reserved(&q, &[reservation("2026-09-02", "2026-09-04")]);
        assert_eq!(free, vec![d("2026-09-01"), d("2026-09-05")]);
    }

    #[test]
    fn subtract_reservation_hanging_over_edges() {
        // A reservation only partially inside the query still blocks its in-range days.
        let q = span("2026-09-03", "2026-09-05");
        let free = subtract_reserved(&q, &[reservation("2026-09-01", "2026-09-03")]);
        assert_eq!(free, vec![d("2026-09-04"), d("2026-09-05")]);
    }

    #[test]
    fn subtract_everything_reserved() {
        let q = span("2026-09-02", "2026-09-04");
        let free = subtract_reserved(&q, &[reservation("2026-09-01", "2026-09-10")]);
        assert!(free.is_empty());
    }

    #[test]
    fn subtract_disjoint_reservations() {
        let q = span("2026-09-01", "2026-09-07");
        let free = subtract_reserved(
            &q,
            &[reservation("2026-09-02", "2026-09-02"), reservation("2026-09-05", "2026-09-06")],
        );
        assert_eq!(free, vec![d("2026-09-01"), d("2026-09-03"), d("2026-09-04"), d("2026-09-07")]);
    }
}
