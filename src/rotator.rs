use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tracing::info;

use crate::engine::AvailabilityCache;
use crate::observability;

/// Daily rotation runs shortly after midnight local time.
fn rotation_time() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 5, 0).expect("00:05 is a valid wall-clock time")
}

/// Next scheduled rotation at or after `now`: today at 00:05, or tomorrow's
/// if that already passed.
pub fn next_rotation(now: NaiveDateTime) -> NaiveDateTime {
    let today_run = now.date().and_time(rotation_time());
    if now < today_run {
        today_run
    } else {
        today_run + Days::new(1)
    }
}

/// Background task that slides the cache's horizon forward once per day.
/// A missed tick is not retried; the cache stays one day stale until the next
/// scheduled run, which self-corrects by removing only that day's entry.
pub async fn run_rotator(cache: Arc<AvailabilityCache>) {
    loop {
        let now = Local::now().naive_local();
        let wait = (next_rotation(now) - now).to_std().unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        let today = Local::now().date_naive();
        info!("rotating availability horizon, dropping {today}");
        cache.rotate(today);
        metrics::counter!(observability::ROTATIONS_TOTAL).increment(1);
        metrics::gauge!(observability::CACHE_FREE_DATES).set(cache.free_count() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        let d: NaiveDate = date.parse().unwrap();
        d.and_time(time.parse().unwrap())
    }

    #[test]
    fn before_the_daily_run_schedules_today() {
        let now = at("2026-09-01", "00:01:00");
        assert_eq!(next_rotation(now), at("2026-09-01", "00:05:00"));
    }

    #[test]
    fn after_the_daily_run_schedules_tomorrow() {
        let now = at("2026-09-01", "09:30:00");
        assert_eq!(next_rotation(now), at("2026-09-02", "00:05:00"));
    }

    #[test]
    fn exactly_at_the_run_schedules_tomorrow() {
        let now = at("2026-09-01", "00:05:00");
        assert_eq!(next_rotation(now), at("2026-09-02", "00:05:00"));
    }
}
