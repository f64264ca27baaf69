use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        notification_templates::{
            cancellation_email, payment_failed_email, price_change_email, renewal_reminder_email,
        },
        ports::{notifier::Notifier, owner_directory::OwnerDirectory},
    },
    domain::entities::{owner::Owner, subscription::Subscription},
};

const RESEND_EMAILS_URL: &str = "https://api.resend.com/emails";

/// Sends subscription notifications through the Resend email API.
///
/// `client` should come from `infra::http_client` so sends are bounded by its timeouts.
#[derive(Clone)]
pub struct ResendNotifier {
    client: Client,
    api_key: SecretString,
    from: String,
    app_origin: String,
    owners: Arc<dyn OwnerDirectory>,
}

impl ResendNotifier {
    pub fn new(
        client: Client,
        api_key: SecretString,
        from: String,
        app_origin: String,
        owners: Arc<dyn OwnerDirectory>,
    ) -> Self {
        Self {
            client,
            api_key,
            from,
            app_origin,
            owners,
        }
    }

    /// The owner to email, or `None` when they cannot be found or opted out.
    async fn recipient(&self, subscription: &Subscription) -> AppResult<Option<Owner>> {
        let Some(owner) = self.owners.get_owner(subscription.owner_id).await? else {
            warn!(
                subscription_id = %subscription.id,
                owner_id = %subscription.owner_id,
                "Owner not found, skipping notification"
            );
            return Ok(None);
        };

        if !owner.email_notifications {
            debug!(owner_id = %owner.id, "Email notifications disabled, skipping");
            return Ok(None);
        }

        Ok(Some(owner))
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        let body = ResendReq {
            from: &self.from,
            to: [to],
            subject,
            html,
        };
        self.client
            .post(RESEND_EMAILS_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Internal(format!("Email API error: {e}")))?;

        debug!(subject = %subject, "Notification email sent");
        Ok(())
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn renewal_reminder(
        &self,
        subscription: &Subscription,
        days_until: u32,
    ) -> AppResult<()> {
        if !subscription.notifications_enabled {
            return Ok(());
        }
        let Some(owner) = self.recipient(subscription).await? else {
            return Ok(());
        };
        let (subject, html) =
            renewal_reminder_email(&self.app_origin, &owner.name, subscription, days_until);
        self.send(&owner.email, &subject, &html).await
    }

    async fn price_changed(
        &self,
        subscription: &Subscription,
        old_price: Decimal,
        new_price: Decimal,
    ) -> AppResult<()> {
        let Some(owner) = self.recipient(subscription).await? else {
            return Ok(());
        };
        let (subject, html) = price_change_email(
            &self.app_origin,
            &owner.name,
            subscription,
            old_price,
            new_price,
        );
        self.send(&owner.email, &subject, &html).await
    }

    async fn payment_failed(&self, subscription: &Subscription) -> AppResult<()> {
        let Some(owner) = self.recipient(subscription).await? else {
            return Ok(());
        };
        let (subject, html) = payment_failed_email(&self.app_origin, &owner.name, subscription);
        self.send(&owner.email, &subject, &html).await
    }

    async fn cancelled(&self, subscription: &Subscription) -> AppResult<()> {
        let Some(owner) = self.recipient(subscription).await? else {
            return Ok(());
        };
        let cancelled_on = subscription
            .end_date
            .unwrap_or_else(|| Utc::now().date_naive());
        let (subject, html) =
            cancellation_email(&self.app_origin, &owner.name, subscription, cancelled_on);
        self.send(&owner.email, &subject, &html).await
    }
}
