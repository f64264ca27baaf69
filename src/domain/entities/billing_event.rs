use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

pub const PROVIDER_EVENT_DESCRIPTION: &str = "Payment event from billing provider webhook";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    AsRefStr,
    Display,
    EnumString,
)]
#[sqlx(type_name = "billing_event_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BillingEventKind {
    PaymentSuccess,
    PaymentFailed,
}

impl BillingEventKind {
    pub fn is_failure(&self) -> bool {
        matches!(self, BillingEventKind::PaymentFailed)
    }

    /// "PAYMENT_FAILED" -> "payment failed"
    pub fn label(&self) -> String {
        self.as_ref().replace('_', " ").to_lowercase()
    }
}

/// Append-only record of a payment reported by the billing provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingEvent {
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub kind: BillingEventKind,
    pub amount: Decimal,
    pub currency: String,
    /// Provider event id; unique across all billing events.
    pub external_event_ref: String,
    pub description: String,
    pub processed: bool,
    pub occurred_at: NaiveDateTime,
}

impl BillingEvent {
    pub fn from_provider(
        subscription_id: Uuid,
        kind: BillingEventKind,
        amount: Decimal,
        currency: &str,
        external_event_ref: &str,
        now: NaiveDateTime,
    ) -> Self {
        BillingEvent {
            id: Uuid::new_v4(),
            subscription_id,
            kind,
            amount,
            currency: currency.to_ascii_uppercase(),
            external_event_ref: external_event_ref.to_string(),
            description: PROVIDER_EVENT_DESCRIPTION.to_string(),
            processed: true,
            occurred_at: now,
        }
    }
}
