use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Half-up rounding to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders an amount with exactly two decimals, e.g. `9.9` -> `"9.90"`.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = round_half_up(value, 2);
    rounded.rescale(2);
    rounded.to_string()
}

/// `part / whole` rounded to four places, then scaled to a percentage.
/// Returns 0 when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.checked_div(whole)
        .map(|ratio| round_half_up(ratio, 4) * Decimal::ONE_HUNDRED)
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0)
}
