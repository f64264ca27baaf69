use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{ledger_store::LedgerStore, notifier::Notifier, owner_directory::OwnerDirectory},
        validators,
    },
    domain::entities::{
        billing_event::BillingEvent,
        price_change::PriceChange,
        subscription::{NewSubscription, Subscription, SubscriptionStatus, SubscriptionUpdate},
    },
};

/// User-driven lifecycle operations on a single subscription.
#[derive(Clone)]
pub struct SubscriptionUseCases {
    ledger: Arc<dyn LedgerStore>,
    owners: Arc<dyn OwnerDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl SubscriptionUseCases {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        owners: Arc<dyn OwnerDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ledger,
            owners,
            notifier,
        }
    }

    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn create(&self, input: NewSubscription) -> AppResult<Subscription> {
        let now = Utc::now().naive_utc();

        validators::validate_name(&input.name)?;
        validators::validate_price(input.price)?;
        validators::validate_future_renewal(input.next_renewal, now)?;
        if let Some(currency) = input.currency.as_deref() {
            validators::validate_currency(currency)?;
        }

        self.owners
            .get_owner(input.owner_id)
            .await?
            .ok_or(AppError::OwnerNotFound)?;

        let (subscription, initial_price) = Subscription::create(input, now);

        let mut tx = self.ledger.begin().await?;
        let saved = tx.save(&subscription).await?;
        tx.append_price_change(&initial_price).await?;
        tx.commit().await?;

        info!(subscription_id = %saved.id, name = %saved.name, "Subscription created");
        Ok(saved)
    }

    #[instrument(skip(self, update))]
    pub async fn apply_manual_update(
        &self,
        id: Uuid,
        update: SubscriptionUpdate,
    ) -> AppResult<Subscription> {
        validators::validate_name(&update.name)?;
        validators::validate_price(update.price)?;

        let now = Utc::now().naive_utc();
        let mut tx = self.ledger.begin().await?;
        let mut subscription = tx.get_subscription(id).await?.ok_or(AppError::NotFound)?;

        let change = subscription.apply_manual_update(update, now);
        let saved = tx.save(&subscription).await?;
        if let Some(change) = &change {
            tx.append_price_change(change).await?;
        }
        tx.commit().await?;

        // Manual edits only alert on increases.
        if let Some(change) = change.filter(PriceChange::is_increase) {
            info!(
                subscription_id = %saved.id,
                old_price = %change.old_price_or_zero(),
                new_price = %change.new_price,
                "Price increased by manual update"
            );
            if let Err(e) = self
                .notifier
                .price_changed(&saved, change.old_price_or_zero(), change.new_price)
                .await
            {
                warn!(subscription_id = %saved.id, error = %e, "Failed to send price change notice");
            }
        }

        Ok(saved)
    }

    /// Cancels the subscription. Cancelling an already terminal subscription is a no-op.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid) -> AppResult<Subscription> {
        let now = Utc::now().naive_utc();
        let mut tx = self.ledger.begin().await?;
        let mut subscription = tx.get_subscription(id).await?.ok_or(AppError::NotFound)?;

        if !subscription.cancel(now) {
            debug!(
                subscription_id = %id,
                status = %subscription.status,
                "Subscription already terminal, skipping cancel"
            );
            return Ok(subscription);
        }

        let saved = tx.save(&subscription).await?;
        tx.commit().await?;

        info!(subscription_id = %saved.id, "Subscription cancelled");
        if let Err(e) = self.notifier.cancelled(&saved).await {
            warn!(subscription_id = %saved.id, error = %e, "Failed to send cancellation notice");
        }

        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Subscription> {
        self.ledger
            .get_subscription(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Everything the owner still tracks, i.e. all but cancelled subscriptions.
    #[instrument(skip(self))]
    pub async fn list_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
        let subscriptions = self.ledger.list_by_owner(owner_id).await?;
        Ok(subscriptions
            .into_iter()
            .filter(|s| s.status != SubscriptionStatus::Cancelled)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn list_active(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
        let subscriptions = self.ledger.list_by_owner(owner_id).await?;
        Ok(subscriptions.into_iter().filter(|s| s.is_active()).collect())
    }

    #[instrument(skip(self))]
    pub async fn price_history(&self, id: Uuid) -> AppResult<Vec<PriceChange>> {
        self.get(id).await?;
        self.ledger.list_price_changes(id).await
    }

    #[instrument(skip(self))]
    pub async fn payment_history(&self, id: Uuid) -> AppResult<Vec<BillingEvent>> {
        self.get(id).await?;
        self.ledger.list_billing_events(id).await
    }
}
