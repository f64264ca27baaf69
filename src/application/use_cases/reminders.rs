use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{ledger_store::LedgerStore, notifier::Notifier},
};

/// Reminder offsets in days, in dispatch order.
pub const REMINDER_OFFSETS: [u32; 4] = [3, 2, 1, 0];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReminderScanReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct ReminderUseCases {
    ledger: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderUseCases {
    pub fn new(ledger: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ledger, notifier }
    }

    /// Sends renewal reminders for subscriptions renewing 3, 2, 1 and 0 days after `today`.
    /// A failed send is counted and the batch carries on.
    #[instrument(skip(self))]
    pub async fn run_daily_scan(&self, today: NaiveDate) -> AppResult<ReminderScanReport> {
        let mut report = ReminderScanReport::default();

        for days_ahead in REMINDER_OFFSETS {
            let target = today
                .checked_add_days(Days::new(days_ahead.into()))
                .ok_or_else(|| AppError::Internal("Reminder date out of range".into()))?;

            let due = self.ledger.list_active_renewing_on(target).await?;
            if due.is_empty() {
                info!(days_ahead, "No subscriptions renewing");
                continue;
            }
            info!(days_ahead, count = due.len(), "Sending renewal reminders");

            for subscription in &due {
                match self.notifier.renewal_reminder(subscription, days_ahead).await {
                    Ok(()) => report.sent += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(
                            subscription_id = %subscription.id,
                            days_ahead,
                            error = %e,
                            "Failed to send renewal reminder"
                        );
                    }
                }
            }
        }

        info!(sent = report.sent, failed = report.failed, "Renewal reminder scan finished");
        Ok(report)
    }
}
