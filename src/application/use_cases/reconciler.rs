use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::{
            ledger_store::{EventAppend, LedgerStore},
            notifier::Notifier,
        },
        validators,
    },
    domain::entities::billing_event::{BillingEvent, BillingEventKind},
};

/// What a reconciliation call did. Every variant is a success from the
/// provider's point of view; only errors should trigger a redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Applied,
    /// The external event reference was already processed.
    Duplicate,
    /// The reported value matched what is stored, or the subscription was already terminal.
    Unchanged,
    /// No tracked subscription carries the external reference.
    UnknownSubscription,
}

/// Applies billing-provider events to tracked subscriptions.
///
/// Each operation runs as one ledger transaction. Notifications go out only
/// after the transaction commits.
#[derive(Clone)]
pub struct BillingReconciler {
    ledger: Arc<dyn LedgerStore>,
    notifier: Arc<dyn Notifier>,
}

impl BillingReconciler {
    pub fn new(ledger: Arc<dyn LedgerStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { ledger, notifier }
    }

    #[instrument(skip(self))]
    pub async fn process_event(
        &self,
        external_subscription_ref: &str,
        kind: BillingEventKind,
        amount: Decimal,
        currency: &str,
        external_event_ref: &str,
    ) -> AppResult<ReconcileOutcome> {
        validators::validate_amount(amount)?;
        validators::validate_currency(currency)?;
        if external_event_ref.trim().is_empty() {
            return Err(AppError::InvalidInput("Event reference is required".into()));
        }

        let now = Utc::now().naive_utc();
        let mut tx = self.ledger.begin().await?;

        if tx
            .find_event_by_external_ref(external_event_ref)
            .await?
            .is_some()
        {
            debug!(event_ref = %external_event_ref, "Billing event already processed");
            return Ok(ReconcileOutcome::Duplicate);
        }

        let Some(mut subscription) = tx
            .get_subscription_by_external_ref(external_subscription_ref)
            .await?
        else {
            warn!(
                external_ref = %external_subscription_ref,
                event_ref = %external_event_ref,
                "No subscription for billing event, dropping"
            );
            return Ok(ReconcileOutcome::UnknownSubscription);
        };

        let event = BillingEvent::from_provider(
            subscription.id,
            kind,
            amount,
            currency,
            external_event_ref,
            now,
        );
        if tx.append_billing_event(&event).await? == EventAppend::Duplicate {
            debug!(event_ref = %external_event_ref, "Billing event recorded concurrently");
            return Ok(ReconcileOutcome::Duplicate);
        }

        match kind {
            BillingEventKind::PaymentSuccess => {
                subscription.record_payment_success(now).ok_or_else(|| {
                    AppError::Internal("Next renewal date out of range".into())
                })?;
            }
            BillingEventKind::PaymentFailed => subscription.record_payment_failure(now),
        }

        let saved = tx.save(&subscription).await?;
        tx.commit().await?;

        info!(
            subscription_id = %saved.id,
            event_ref = %external_event_ref,
            kind = %kind,
            status = %saved.status,
            "Billing event applied"
        );

        if kind.is_failure() {
            if let Err(e) = self.notifier.payment_failed(&saved).await {
                warn!(subscription_id = %saved.id, error = %e, "Failed to send payment failure notice");
            }
        }

        Ok(ReconcileOutcome::Applied)
    }

    /// Applies a provider price. Unlike manual edits, any change in either direction is announced.
    #[instrument(skip(self))]
    pub async fn handle_price_change(
        &self,
        external_subscription_ref: &str,
        new_price: Decimal,
    ) -> AppResult<ReconcileOutcome> {
        validators::validate_amount(new_price)?;

        let now = Utc::now().naive_utc();
        let mut tx = self.ledger.begin().await?;

        let Some(mut subscription) = tx
            .get_subscription_by_external_ref(external_subscription_ref)
            .await?
        else {
            warn!(external_ref = %external_subscription_ref, "No subscription for price change");
            return Ok(ReconcileOutcome::UnknownSubscription);
        };

        let Some(change) = subscription.apply_provider_price(new_price, now) else {
            return Ok(ReconcileOutcome::Unchanged);
        };

        let saved = tx.save(&subscription).await?;
        tx.append_price_change(&change).await?;
        tx.commit().await?;

        info!(
            subscription_id = %saved.id,
            old_price = %change.old_price_or_zero(),
            new_price = %change.new_price,
            "Price changed by billing provider"
        );

        if let Err(e) = self
            .notifier
            .price_changed(&saved, change.old_price_or_zero(), change.new_price)
            .await
        {
            warn!(subscription_id = %saved.id, error = %e, "Failed to send price change notice");
        }

        Ok(ReconcileOutcome::Applied)
    }

    /// An upcoming invoice whose amount differs from the stored price is treated as a price change.
    #[instrument(skip(self))]
    pub async fn handle_upcoming_renewal(
        &self,
        external_subscription_ref: &str,
        renewal_amount: Decimal,
    ) -> AppResult<ReconcileOutcome> {
        validators::validate_amount(renewal_amount)?;

        let Some(subscription) = self
            .ledger
            .get_subscription_by_external_ref(external_subscription_ref)
            .await?
        else {
            warn!(external_ref = %external_subscription_ref, "No subscription for upcoming renewal");
            return Ok(ReconcileOutcome::UnknownSubscription);
        };

        if subscription.price == renewal_amount {
            return Ok(ReconcileOutcome::Unchanged);
        }

        self.handle_price_change(external_subscription_ref, renewal_amount)
            .await
    }

    #[instrument(skip(self))]
    pub async fn handle_external_cancellation(
        &self,
        external_subscription_ref: &str,
    ) -> AppResult<ReconcileOutcome> {
        let now = Utc::now().naive_utc();
        let mut tx = self.ledger.begin().await?;

        let Some(mut subscription) = tx
            .get_subscription_by_external_ref(external_subscription_ref)
            .await?
        else {
            warn!(external_ref = %external_subscription_ref, "No subscription for cancellation");
            return Ok(ReconcileOutcome::UnknownSubscription);
        };

        if !subscription.cancel(now) {
            debug!(subscription_id = %subscription.id, "Subscription already terminal");
            return Ok(ReconcileOutcome::Unchanged);
        }

        let saved = tx.save(&subscription).await?;
        tx.commit().await?;

        info!(subscription_id = %saved.id, "Subscription cancelled by billing provider");
        if let Err(e) = self.notifier.cancelled(&saved).await {
            warn!(subscription_id = %saved.id, error = %e, "Failed to send cancellation notice");
        }

        Ok(ReconcileOutcome::Applied)
    }
}
