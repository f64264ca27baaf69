use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{app_error::AppResult, domain::entities::subscription::Subscription};

/// Outbound side channel for user-facing notifications.
///
/// Callers treat every method as best effort: an `Err` is logged and never
/// undoes the state change that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn renewal_reminder(&self, subscription: &Subscription, days_until: u32)
    -> AppResult<()>;

    async fn price_changed(
        &self,
        subscription: &Subscription,
        old_price: Decimal,
        new_price: Decimal,
    ) -> AppResult<()>;

    async fn payment_failed(&self, subscription: &Subscription) -> AppResult<()>;

    async fn cancelled(&self, subscription: &Subscription) -> AppResult<()>;
}
