//! Notifier doubles that record what would have been sent.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::notifier::Notifier,
    domain::entities::subscription::Subscription,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    RenewalReminder {
        subscription_id: Uuid,
        days_until: u32,
    },
    PriceChanged {
        subscription_id: Uuid,
        old_price: Decimal,
        new_price: Decimal,
    },
    PaymentFailed {
        subscription_id: Uuid,
    },
    Cancelled {
        subscription_id: Uuid,
    },
}

/// Records every call. A failing instance records the attempt and then errors.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn record(&self, notification: SentNotification) -> AppResult<()> {
        self.sent.lock().unwrap().push(notification);
        if self.fail {
            return Err(AppError::Internal("Simulated notifier failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn renewal_reminder(
        &self,
        subscription: &Subscription,
        days_until: u32,
    ) -> AppResult<()> {
        self.record(SentNotification::RenewalReminder {
            subscription_id: subscription.id,
            days_until,
        })
    }

    async fn price_changed(
        &self,
        subscription: &Subscription,
        old_price: Decimal,
        new_price: Decimal,
    ) -> AppResult<()> {
        self.record(SentNotification::PriceChanged {
            subscription_id: subscription.id,
            old_price,
            new_price,
        })
    }

    async fn payment_failed(&self, subscription: &Subscription) -> AppResult<()> {
        self.record(SentNotification::PaymentFailed {
            subscription_id: subscription.id,
        })
    }

    async fn cancelled(&self, subscription: &Subscription) -> AppResult<()> {
        self.record(SentNotification::Cancelled {
            subscription_id: subscription.id,
        })
    }
}
