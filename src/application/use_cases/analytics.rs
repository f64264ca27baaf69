use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        helpers::money::{format_amount, percent_of, round_half_up},
        ports::ledger_store::LedgerStore,
    },
    domain::entities::{
        billing_event::BillingEvent,
        price_change::PriceChange,
        subscription::{Subscription, SubscriptionStatus},
    },
};

pub const MAX_TREND_MONTHS: u32 = 120;
pub const DEFAULT_TREND_MONTHS: u32 = 12;

const ACTIVITY_WINDOW_DAYS: i64 = 30;
const ACTIVITY_PER_SOURCE: usize = 5;
const ACTIVITY_LIMIT: usize = 10;
const UPCOMING_WINDOW_DAYS: i64 = 7;
const NO_SUBSCRIPTION: &str = "None";
const PRICE_CHANGE_ACTIVITY: &str = "PRICE_CHANGE";

// ============================================================================
// Report Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivitySeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    /// `PRICE_CHANGE` or the billing event kind.
    #[serde(rename = "type")]
    pub kind: String,
    pub subscription_id: Uuid,
    pub subscription_name: String,
    pub description: String,
    pub timestamp: NaiveDateTime,
    pub severity: ActivitySeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpending {
    pub category: String,
    pub total_spending: Decimal,
    pub subscription_count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub owner_id: Uuid,
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub cancelled_subscriptions: usize,
    pub total_monthly_spending: Decimal,
    pub total_yearly_spending: Decimal,
    pub average_subscription_cost: Decimal,
    pub upcoming_renewals: usize,
    pub upcoming_renewals_this_month: usize,
    pub most_expensive_subscription: String,
    pub most_expensive_amount: Decimal,
    pub newest_subscription: String,
    pub recent_activity: Vec<ActivityItem>,
    pub category_breakdown: Vec<CategorySpending>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySpending {
    /// e.g. "Mar 2024"
    pub month: String,
    pub month_start: NaiveDate,
    pub spending: Decimal,
    pub subscription_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingTrend {
    pub owner_id: Uuid,
    pub period_months: u32,
    pub monthly_data: Vec<MonthlySpending>,
    pub trend_direction: TrendDirection,
    pub trend_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub owner_id: Uuid,
    pub total_spending: Decimal,
    pub categories: Vec<CategorySpending>,
}

// ============================================================================
// Use Cases
// ============================================================================

/// Read-only spending reports over one owner's subscriptions.
#[derive(Clone)]
pub struct AnalyticsUseCases {
    ledger: Arc<dyn LedgerStore>,
}

impl AnalyticsUseCases {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, owner_id: Uuid) -> AppResult<DashboardSummary> {
        let now = Utc::now().naive_utc();
        let since = now - Duration::days(ACTIVITY_WINDOW_DAYS);

        let subscriptions = self.ledger.list_by_owner(owner_id).await?;
        let price_changes = self
            .ledger
            .list_recent_price_changes(owner_id, since)
            .await?;
        let billing_events = self
            .ledger
            .list_recent_billing_events(owner_id, since)
            .await?;

        Ok(summarize_dashboard(
            owner_id,
            &subscriptions,
            &price_changes,
            &billing_events,
            now,
        ))
    }

    #[instrument(skip(self))]
    pub async fn spending_trend(&self, owner_id: Uuid, months: u32) -> AppResult<SpendingTrend> {
        if months > MAX_TREND_MONTHS {
            return Err(AppError::InvalidInput(format!(
                "months must be at most {}",
                MAX_TREND_MONTHS
            )));
        }

        let subscriptions = self.ledger.list_by_owner(owner_id).await?;
        let monthly_data = monthly_spending(&subscriptions, months, Utc::now().naive_utc())?;

        Ok(SpendingTrend {
            owner_id,
            period_months: months,
            trend_direction: trend_direction(&monthly_data),
            trend_percentage: trend_percentage(&monthly_data),
            monthly_data,
        })
    }

    #[instrument(skip(self))]
    pub async fn category_breakdown(&self, owner_id: Uuid) -> AppResult<CategoryBreakdown> {
        let subscriptions = self.ledger.list_by_owner(owner_id).await?;
        let active: Vec<&Subscription> = subscriptions.iter().filter(|s| s.is_active()).collect();

        Ok(CategoryBreakdown {
            owner_id,
            total_spending: active.iter().map(|s| s.price).sum(),
            categories: categorize(&active),
        })
    }
}

// ============================================================================
// Aggregation
// ============================================================================

pub fn summarize_dashboard(
    owner_id: Uuid,
    subscriptions: &[Subscription],
    price_changes: &[PriceChange],
    billing_events: &[BillingEvent],
    now: NaiveDateTime,
) -> DashboardSummary {
    let active: Vec<&Subscription> = subscriptions.iter().filter(|s| s.is_active()).collect();

    let monthly: Decimal = active.iter().map(|s| s.price).sum();
    let average = if active.is_empty() {
        Decimal::ZERO
    } else {
        round_half_up(monthly / Decimal::from(active.len()), 2)
    };

    let next_week = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let month_end = start_of_next_month(now);

    // Strictly greater keeps the first of equally priced subscriptions.
    let (most_expensive, most_expensive_amount) =
        active
            .iter()
            .fold((NO_SUBSCRIPTION, Decimal::ZERO), |(name, max), s| {
                if s.price > max {
                    (s.name.as_str(), s.price)
                } else {
                    (name, max)
                }
            });

    let newest = subscriptions
        .iter()
        .fold(None::<&Subscription>, |newest, s| match newest {
            Some(n) if n.created_at >= s.created_at => Some(n),
            _ => Some(s),
        })
        .map(|s| s.name.clone())
        .unwrap_or_else(|| NO_SUBSCRIPTION.to_string());

    DashboardSummary {
        owner_id,
        total_subscriptions: subscriptions.len(),
        active_subscriptions: active.len(),
        cancelled_subscriptions: subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Cancelled)
            .count(),
        total_monthly_spending: monthly,
        total_yearly_spending: monthly * Decimal::from(12),
        average_subscription_cost: average,
        upcoming_renewals: active.iter().filter(|s| s.next_renewal < next_week).count(),
        upcoming_renewals_this_month: active
            .iter()
            .filter(|s| month_end.is_none_or(|end| s.next_renewal < end))
            .count(),
        most_expensive_subscription: most_expensive.to_string(),
        most_expensive_amount,
        newest_subscription: newest,
        recent_activity: recent_activity(subscriptions, price_changes, billing_events),
        category_breakdown: categorize(&active),
    }
}

/// Merges the latest price changes and payments into one feed, newest first.
pub fn recent_activity(
    subscriptions: &[Subscription],
    price_changes: &[PriceChange],
    billing_events: &[BillingEvent],
) -> Vec<ActivityItem> {
    let names: HashMap<Uuid, &str> = subscriptions
        .iter()
        .map(|s| (s.id, s.name.as_str()))
        .collect();

    let mut changes: Vec<&PriceChange> = price_changes.iter().collect();
    changes.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
    let mut events: Vec<&BillingEvent> = billing_events.iter().collect();
    events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

    let price_items = changes
        .into_iter()
        .take(ACTIVITY_PER_SOURCE)
        .filter_map(|change| {
            let name = names.get(&change.subscription_id)?;
            Some(ActivityItem {
                kind: PRICE_CHANGE_ACTIVITY.to_string(),
                subscription_id: change.subscription_id,
                subscription_name: name.to_string(),
                description: format!(
                    "{} price changed from ${} to ${}",
                    name,
                    format_amount(change.old_price_or_zero()),
                    format_amount(change.new_price)
                ),
                timestamp: change.changed_at,
                severity: if change.is_increase() {
                    ActivitySeverity::Warning
                } else {
                    ActivitySeverity::Info
                },
            })
        });

    let payment_items = events
        .into_iter()
        .take(ACTIVITY_PER_SOURCE)
        .filter_map(|event| {
            let name = names.get(&event.subscription_id)?;
            Some(ActivityItem {
                kind: event.kind.to_string(),
                subscription_id: event.subscription_id,
                subscription_name: name.to_string(),
                description: format!(
                    "{}: ${} for {}",
                    event.kind.label(),
                    format_amount(event.amount),
                    name
                ),
                timestamp: event.occurred_at,
                severity: if event.kind.is_failure() {
                    ActivitySeverity::Error
                } else {
                    ActivitySeverity::Info
                },
            })
        });

    let mut items: Vec<ActivityItem> = price_items.chain(payment_items).collect();
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(ACTIVITY_LIMIT);
    items
}

/// Groups subscriptions by category, largest spend first.
pub fn categorize(subscriptions: &[&Subscription]) -> Vec<CategorySpending> {
    let total: Decimal = subscriptions.iter().map(|s| s.price).sum();

    let mut groups: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for s in subscriptions {
        let entry = groups
            .entry(s.category_or_default())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += s.price;
        entry.1 += 1;
    }

    let mut categories: Vec<CategorySpending> = groups
        .into_iter()
        .map(|(category, (spend, count))| CategorySpending {
            category: category.to_string(),
            total_spending: spend,
            subscription_count: count,
            percentage: percent_of(spend, total),
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_spending
            .cmp(&a.total_spending)
            .then_with(|| a.category.cmp(&b.category))
    });
    categories
}

/// One bucket per calendar month, oldest first, ending with the month containing `now`.
///
/// A bucket holds the subscriptions created during that month. Its spend only
/// counts those currently active; its count includes every status.
pub fn monthly_spending(
    subscriptions: &[Subscription],
    months: u32,
    now: NaiveDateTime,
) -> AppResult<Vec<MonthlySpending>> {
    let current_month = first_of_month(now.date());

    (0..months)
        .rev()
        .map(|back| {
            let start = current_month
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| AppError::Internal("Trend window out of range".into()))?;
            let end = start.checked_add_months(Months::new(1));

            let in_month: Vec<&Subscription> = subscriptions
                .iter()
                .filter(|s| {
                    let created = s.created_at.date();
                    created >= start && end.is_none_or(|end| created < end)
                })
                .collect();

            Ok(MonthlySpending {
                month: start.format("%b %Y").to_string(),
                month_start: start,
                spending: in_month
                    .iter()
                    .filter(|s| s.is_active())
                    .map(|s| s.price)
                    .sum(),
                subscription_count: in_month.len(),
            })
        })
        .collect()
}

pub fn trend_direction(monthly: &[MonthlySpending]) -> TrendDirection {
    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return TrendDirection::Stable;
    };
    if monthly.len() < 2 {
        return TrendDirection::Stable;
    }

    match last.spending.cmp(&first.spending) {
        std::cmp::Ordering::Greater => TrendDirection::Increasing,
        std::cmp::Ordering::Less => TrendDirection::Decreasing,
        std::cmp::Ordering::Equal => TrendDirection::Stable,
    }
}

pub fn trend_percentage(monthly: &[MonthlySpending]) -> f64 {
    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return 0.0;
    };
    if monthly.len() < 2 {
        return 0.0;
    }
    percent_of(last.spending - first.spending, first.spending)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn start_of_next_month(now: NaiveDateTime) -> Option<NaiveDateTime> {
    first_of_month(now.date())
        .checked_add_months(Months::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
