//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{
    billing_event::{BillingEvent, BillingEventKind, PROVIDER_EVENT_DESCRIPTION},
    owner::Owner,
    price_change::{PriceChange, PriceChangeReason},
    subscription::{Subscription, SubscriptionStatus},
};

/// Create a test owner with sensible defaults.
pub fn create_test_owner(overrides: impl FnOnce(&mut Owner)) -> Owner {
    let mut owner = Owner {
        id: Uuid::new_v4(),
        email: "user@example.com".to_string(),
        name: "Test User".to_string(),
        email_notifications: true,
    };
    overrides(&mut owner);
    owner
}

/// Create an active test subscription renewing 30 days after [`test_datetime`].
pub fn create_test_subscription(
    owner_id: Uuid,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        owner_id,
        name: "Netflix".to_string(),
        description: None,
        plan_name: Some("Premium".to_string()),
        price: Decimal::new(999, 2),
        currency: "USD".to_string(),
        status: SubscriptionStatus::Active,
        start_date: test_datetime().date(),
        end_date: None,
        next_renewal: test_datetime() + Duration::days(30),
        category: Some("Entertainment".to_string()),
        card: Some("Visa 4242".to_string()),
        external_ref: None,
        auto_payment: true,
        notifications_enabled: true,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut subscription);
    subscription
}

/// Create a test price change from 0 to 9.99.
pub fn create_test_price_change(
    subscription_id: Uuid,
    overrides: impl FnOnce(&mut PriceChange),
) -> PriceChange {
    let mut change = PriceChange::record(
        subscription_id,
        Decimal::ZERO,
        Decimal::new(999, 2),
        PriceChangeReason::Initial,
        test_datetime(),
    );
    overrides(&mut change);
    change
}

/// Create a successful test payment of 9.99 USD with a unique event reference.
pub fn create_test_billing_event(
    subscription_id: Uuid,
    overrides: impl FnOnce(&mut BillingEvent),
) -> BillingEvent {
    let mut event = BillingEvent {
        id: Uuid::new_v4(),
        subscription_id,
        kind: BillingEventKind::PaymentSuccess,
        amount: Decimal::new(999, 2),
        currency: "USD".to_string(),
        external_event_ref: format!("evt_{}", Uuid::new_v4().simple()),
        description: PROVIDER_EVENT_DESCRIPTION.to_string(),
        processed: true,
        occurred_at: test_datetime(),
    };
    overrides(&mut event);
    event
}

/// Fixed datetime for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}
