//! Built-in daily schedule.
//!
//! Runs the monitor once a day at a fixed local time. External schedulers
//! (cron, systemd timers) can call `jobwatch run` instead.

use std::future::Future;

use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone};

use super::monitor::Monitor;

/// The next occurrence of `at` on the wall clock of `now`'s zone, strictly
/// after `now`.
///
/// A time skipped by a daylight-saving change runs an hour later that day; a
/// time that occurs twice runs at its first occurrence.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();

    loop {
        if let Some(next) = resolve_local(&tz, day.and_time(at)) {
            if next > *now {
                return next;
            }
        }
        day = day + Duration::days(1);
    }
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
}

/// Run the monitor every day at `at` until `shutdown` resolves.
///
/// A run in progress is allowed to finish; failed runs do not stop the loop.
pub async fn run_daily(monitor: &Monitor, at: NaiveTime, shutdown: impl Future<Output = ()>) {
    tokio::pin!(shutdown);

    loop {
        let now = Local::now();
        let next = next_run_after(&now, at);
        let wait = next.signed_duration_since(now).to_std().unwrap_or_default();
        log::info!("Next run scheduled for {}", next.format("%Y-%m-%d %H:%M %:z"));

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                monitor.run_once().await;
            }
            _ = &mut shutdown => {
                log::info!("Schedule stopped");
                break;
            }
        }
    }
}
