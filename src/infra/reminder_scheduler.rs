use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime, Utc};
use tokio::time::sleep;
use tracing::{error, info};

use crate::use_cases::reminders::ReminderUseCases;

/// Runs the renewal reminder scan once a day at `hour_utc`.
pub async fn run_reminder_loop(reminder_use_cases: Arc<ReminderUseCases>, hour_utc: u32) {
    info!("Renewal reminder service started (daily at {:02}:00 UTC)", hour_utc);

    loop {
        let now = Utc::now().naive_utc();
        let next = next_run_after(now, hour_utc);
        let wait = (next - now).to_std().unwrap_or_default();
        sleep(wait).await;

        let today = Utc::now().date_naive();
        if let Err(e) = reminder_use_cases.run_daily_scan(today).await {
            error!(error = ?e, "Renewal reminder scan failed");
        }
    }
}

/// First `hour_utc:00` strictly after `now`.
pub fn next_run_after(now: NaiveDateTime, hour_utc: u32) -> NaiveDateTime {
    let at = NaiveTime::from_hms_opt(hour_utc.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}
