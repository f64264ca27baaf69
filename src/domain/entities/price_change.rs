use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Why a price record was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceChangeReason {
    Initial,
    Manual,
    Provider,
}

impl PriceChangeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceChangeReason::Initial => "Initial subscription",
            PriceChangeReason::Manual => "Manual price update",
            PriceChangeReason::Provider => "Price change via webhook",
        }
    }
}

/// Append-only record of a subscription price movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChange {
    pub id: Uuid,
    pub subscription_id: Uuid,
    /// Only legacy rows lack this; treated as zero.
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub changed_at: NaiveDateTime,
    pub reason: String,
}

impl PriceChange {
    pub fn record(
        subscription_id: Uuid,
        old_price: Decimal,
        new_price: Decimal,
        reason: PriceChangeReason,
        now: NaiveDateTime,
    ) -> Self {
        PriceChange {
            id: Uuid::new_v4(),
            subscription_id,
            old_price: Some(old_price),
            new_price,
            changed_at: now,
            reason: reason.as_str().to_string(),
        }
    }

    pub fn old_price_or_zero(&self) -> Decimal {
        self.old_price.unwrap_or(Decimal::ZERO)
    }

    pub fn is_increase(&self) -> bool {
        self.new_price > self.old_price_or_zero()
    }
}
