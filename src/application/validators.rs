use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::app_error::{AppError, AppResult};

const MAX_NAME_LEN: usize = 200;

/// Money columns are `NUMERIC(12, 2)`: at most two decimal places, below 10^10.
const MONEY_SCALE: u32 = 2;
const MONEY_INTEGER_DIGITS: u32 = 10;

/// Smallest price a tracked subscription may carry (0.01).
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// ISO-4217 style code: exactly three ASCII letters.
pub fn is_valid_currency(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn validate_name(name: &str) -> AppResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Subscription name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Subscription name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Exclusive upper bound for any stored money value (10^10).
fn max_money() -> Decimal {
    Decimal::from(10_i64.pow(MONEY_INTEGER_DIGITS))
}

/// Rejects values the ledger cannot store exactly.
fn validate_storable(value: Decimal) -> AppResult<()> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::InvalidInput(format!(
            "Amount must have at most {} decimal places",
            MONEY_SCALE
        )));
    }
    if value >= max_money() {
        return Err(AppError::InvalidInput(format!(
            "Amount must be less than {}",
            max_money()
        )));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> AppResult<()> {
    if price < min_price() {
        return Err(AppError::InvalidInput(
            "Price must be at least 0.01".into(),
        ));
    }
    validate_storable(price)
}

/// Amounts reported by the billing provider may be zero but never negative.
pub fn validate_amount(amount: Decimal) -> AppResult<()> {
    if amount < Decimal::ZERO {
        return Err(AppError::InvalidInput("Amount must not be negative".into()));
    }
    validate_storable(amount)
}

pub fn validate_currency(code: &str) -> AppResult<()> {
    if !is_valid_currency(code) {
        return Err(AppError::InvalidInput(format!(
            "Invalid currency code: {}",
            code
        )));
    }
    Ok(())
}

pub fn validate_future_renewal(next_renewal: NaiveDateTime, now: NaiveDateTime) -> AppResult<()> {
    if next_renewal <= now {
        return Err(AppError::InvalidInput(
            "Next renewal date must be in the future".into(),
        ));
    }
    Ok(())
}
