use chrono::{Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use super::price_change::{PriceChange, PriceChangeReason};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_CATEGORY: &str = "Other";

/// Lifecycle status of a tracked subscription.
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
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[derive(Default)]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Cancelled,
    Expired,
    Paused,
    PaymentFailed,
    Trial,
}

impl SubscriptionStatus {
    /// Terminal statuses never have their renewal advanced by cancellation handling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionStatus::Cancelled | SubscriptionStatus::Expired)
    }
}

/// A recurring subscription owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub plan_name: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_renewal: NaiveDateTime,
    pub category: Option<String>,
    pub card: Option<String>,
    pub external_ref: Option<String>,
    pub auto_payment: bool,
    pub notifications_enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fields supplied when a subscription is first tracked.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub plan_name: Option<String>,
    pub price: Decimal,
    pub currency: Option<String>,
    pub next_renewal: NaiveDateTime,
    pub category: Option<String>,
    pub card: Option<String>,
    pub external_ref: Option<String>,
}

/// Fields a user may overwrite in place.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionUpdate {
    pub name: String,
    pub plan_name: Option<String>,
    pub price: Decimal,
    pub category: Option<String>,
    pub card: Option<String>,
    pub next_renewal: NaiveDateTime,
}

/// Calendar-month arithmetic; the day of month is clamped to the target month's length.
pub fn add_months(ts: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    ts.checked_add_months(Months::new(months))
}

impl Subscription {
    /// Starts tracking a subscription in `ACTIVE` and produces its initial price record.
    pub fn create(input: NewSubscription, now: NaiveDateTime) -> (Self, PriceChange) {
        let subscription = Subscription {
            id: Uuid::new_v4(),
            owner_id: input.owner_id,
            name: input.name.trim().to_string(),
            description: input.description,
            plan_name: input.plan_name,
            price: input.price,
            currency: input
                .currency
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            status: SubscriptionStatus::Active,
            start_date: now.date(),
            end_date: None,
            next_renewal: input.next_renewal,
            category: input.category,
            card: input.card,
            external_ref: input.external_ref,
            auto_payment: true,
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
        };

        let initial = PriceChange::record(
            subscription.id,
            Decimal::ZERO,
            subscription.price,
            PriceChangeReason::Initial,
            now,
        );

        (subscription, initial)
    }

    /// Overwrites the user-editable fields. Returns a price record when the price moved.
    /// Status is left untouched.
    pub fn apply_manual_update(
        &mut self,
        update: SubscriptionUpdate,
        now: NaiveDateTime,
    ) -> Option<PriceChange> {
        let change = (update.price != self.price).then(|| {
            PriceChange::record(
                self.id,
                self.price,
                update.price,
                PriceChangeReason::Manual,
                now,
            )
        });

        self.name = update.name.trim().to_string();
        self.plan_name = update.plan_name;
        self.price = update.price;
        self.category = update.category;
        self.card = update.card;
        self.next_renewal = update.next_renewal;
        self.updated_at = now;

        change
    }

    /// Applies a provider-reported price. No-op when equal to the stored price.
    pub fn apply_provider_price(
        &mut self,
        new_price: Decimal,
        now: NaiveDateTime,
    ) -> Option<PriceChange> {
        if new_price == self.price {
            return None;
        }

        let change = PriceChange::record(
            self.id,
            self.price,
            new_price,
            PriceChangeReason::Provider,
            now,
        );
        self.price = new_price;
        self.updated_at = now;
        Some(change)
    }

    /// Moves a non-terminal subscription to `CANCELLED`.
    /// Returns `false` when the subscription was already terminal.
    pub fn cancel(&mut self, now: NaiveDateTime) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SubscriptionStatus::Cancelled;
        self.updated_at = now;
        true
    }

    /// Marks the subscription paid: `ACTIVE` from any status and renewal pushed one month.
    /// Returns `None`, leaving the record untouched, if the renewal would overflow the calendar.
    pub fn record_payment_success(&mut self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let next = add_months(self.next_renewal, 1)?;
        self.status = SubscriptionStatus::Active;
        self.next_renewal = next;
        self.updated_at = now;
        Some(next)
    }

    pub fn record_payment_failure(&mut self, now: NaiveDateTime) {
        self.status = SubscriptionStatus::PaymentFailed;
        self.updated_at = now;
    }

    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Category used for grouping; blank and missing categories fall back to "Other".
    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}
