use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        billing_event::BillingEvent, price_change::PriceChange, subscription::Subscription,
    },
};

/// Result of appending a billing event keyed by its external reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAppend {
    Inserted,
    /// The external reference was already recorded; nothing was written.
    Duplicate,
}

/// Durable storage for subscriptions and their append-only history.
///
/// Reads on the store see committed data only. Every write goes through a
/// [`LedgerTx`] so that a subscription update and the record it produces
/// become visible together or not at all.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_subscription(&self, id: Uuid) -> AppResult<Option<Subscription>>;

    async fn get_subscription_by_external_ref(
        &self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>>;

    async fn find_event_by_external_ref(
        &self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>>;

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>>;

    /// Active subscriptions with notifications on whose renewal falls on `date`.
    async fn list_active_renewing_on(&self, date: NaiveDate) -> AppResult<Vec<Subscription>>;

    /// Newest first.
    async fn list_price_changes(&self, subscription_id: Uuid) -> AppResult<Vec<PriceChange>>;

    /// Newest first.
    async fn list_billing_events(&self, subscription_id: Uuid) -> AppResult<Vec<BillingEvent>>;

    /// Price changes across all of an owner's subscriptions since `since`, newest first.
    async fn list_recent_price_changes(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<PriceChange>>;

    /// Billing events across all of an owner's subscriptions since `since`, newest first.
    async fn list_recent_billing_events(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<BillingEvent>>;

    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>>;

    async fn save(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let mut tx = self.begin().await?;
        let saved = tx.save(subscription).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn append_price_change(&self, change: &PriceChange) -> AppResult<()> {
        let mut tx = self.begin().await?;
        tx.append_price_change(change).await?;
        tx.commit().await
    }

    async fn append_billing_event(&self, event: &BillingEvent) -> AppResult<EventAppend> {
        let mut tx = self.begin().await?;
        let outcome = tx.append_billing_event(event).await?;
        if outcome == EventAppend::Inserted {
            tx.commit().await?;
        }
        Ok(outcome)
    }
}

/// A unit of work against the ledger.
///
/// Subscription reads take a row lock held until commit or drop. Dropping the
/// transaction without calling [`LedgerTx::commit`] discards every staged write.
#[async_trait]
pub trait LedgerTx: Send {
    async fn get_subscription(&mut self, id: Uuid) -> AppResult<Option<Subscription>>;

    async fn get_subscription_by_external_ref(
        &mut self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>>;

    async fn find_event_by_external_ref(
        &mut self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>>;

    /// Inserts or replaces the subscription by id.
    async fn save(&mut self, subscription: &Subscription) -> AppResult<Subscription>;

    async fn append_price_change(&mut self, change: &PriceChange) -> AppResult<()>;

    async fn append_billing_event(&mut self, event: &BillingEvent) -> AppResult<EventAppend>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
