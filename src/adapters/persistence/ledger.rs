use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::ports::ledger_store::{EventAppend, LedgerStore, LedgerTx},
    domain::entities::{
        billing_event::BillingEvent, price_change::PriceChange, subscription::Subscription,
    },
};

const SUBSCRIPTION_COLS: &str = r#"
    id, owner_id, name, description, plan_name, price, currency, status,
    start_date, end_date, next_renewal, category, card, external_ref,
    auto_payment, notifications_enabled, created_at, updated_at
"#;

const PRICE_CHANGE_COLS: &str = "id, subscription_id, old_price, new_price, changed_at, reason";

const BILLING_EVENT_COLS: &str = r#"
    id, subscription_id, kind, amount, currency, external_event_ref,
    description, processed, occurred_at
"#;

fn row_to_subscription(row: &PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        description: row.get("description"),
        plan_name: row.get("plan_name"),
        price: row.get("price"),
        currency: row.get("currency"),
        status: row.get("status"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        next_renewal: row.get("next_renewal"),
        category: row.get("category"),
        card: row.get("card"),
        external_ref: row.get("external_ref"),
        auto_payment: row.get("auto_payment"),
        notifications_enabled: row.get("notifications_enabled"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_price_change(row: &PgRow) -> PriceChange {
    PriceChange {
        id: row.get("id"),
        subscription_id: row.get("subscription_id"),
        old_price: row.get("old_price"),
        new_price: row.get("new_price"),
        changed_at: row.get("changed_at"),
        reason: row.get("reason"),
    }
}

fn row_to_billing_event(row: &PgRow) -> BillingEvent {
    BillingEvent {
        id: row.get("id"),
        subscription_id: row.get("subscription_id"),
        kind: row.get("kind"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        external_event_ref: row.get("external_event_ref"),
        description: row.get("description"),
        processed: row.get("processed"),
        occurred_at: row.get("occurred_at"),
    }
}

#[async_trait]
impl LedgerStore for PostgresPersistence {
    async fn get_subscription(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SUBSCRIPTION_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn get_subscription_by_external_ref(
        &self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE external_ref = $1",
            SUBSCRIPTION_COLS
        ))
        .bind(external_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn find_event_by_external_ref(
        &self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM billing_events WHERE external_event_ref = $1",
            BILLING_EVENT_COLS
        ))
        .bind(external_event_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_billing_event))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE owner_id = $1 ORDER BY created_at DESC",
            SUBSCRIPTION_COLS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }

    async fn list_active_renewing_on(&self, date: NaiveDate) -> AppResult<Vec<Subscription>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE status = 'ACTIVE'
              AND notifications_enabled = TRUE
              AND next_renewal::date = $1
            ORDER BY next_renewal ASC
            "#,
            SUBSCRIPTION_COLS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }

    async fn list_price_changes(&self, subscription_id: Uuid) -> AppResult<Vec<PriceChange>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM price_changes WHERE subscription_id = $1 ORDER BY changed_at DESC",
            PRICE_CHANGE_COLS
        ))
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_price_change).collect())
    }

    async fn list_billing_events(&self, subscription_id: Uuid) -> AppResult<Vec<BillingEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM billing_events WHERE subscription_id = $1 ORDER BY occurred_at DESC",
            BILLING_EVENT_COLS
        ))
        .bind(subscription_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_billing_event).collect())
    }

    async fn list_recent_price_changes(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<PriceChange>> {
        let rows = sqlx::query(
            r#"
            SELECT pc.id, pc.subscription_id, pc.old_price, pc.new_price, pc.changed_at, pc.reason
            FROM price_changes pc
            JOIN subscriptions s ON pc.subscription_id = s.id
            WHERE s.owner_id = $1 AND pc.changed_at >= $2
            ORDER BY pc.changed_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_price_change).collect())
    }

    async fn list_recent_billing_events(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<BillingEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT be.id, be.subscription_id, be.kind, be.amount, be.currency,
                   be.external_event_ref, be.description, be.processed, be.occurred_at
            FROM billing_events be
            JOIN subscriptions s ON be.subscription_id = s.id
            WHERE s.owner_id = $1 AND be.occurred_at >= $2
            ORDER BY be.occurred_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_billing_event).collect())
    }

    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        let tx = self.pool.begin().await.map_err(AppError::from)?;
        Ok(Box::new(PostgresLedgerTx { tx }))
    }
}

/// Rolls back on drop unless committed.
pub struct PostgresLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PostgresLedgerTx {
    async fn get_subscription(&mut self, id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 FOR UPDATE",
            SUBSCRIPTION_COLS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn get_subscription_by_external_ref(
        &mut self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE external_ref = $1 FOR UPDATE",
            SUBSCRIPTION_COLS
        ))
        .bind(external_ref)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn find_event_by_external_ref(
        &mut self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM billing_events WHERE external_event_ref = $1",
            BILLING_EVENT_COLS
        ))
        .bind(external_event_ref)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_billing_event))
    }

    async fn save(&mut self, subscription: &Subscription) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                plan_name = EXCLUDED.plan_name,
                price = EXCLUDED.price,
                currency = EXCLUDED.currency,
                status = EXCLUDED.status,
                end_date = EXCLUDED.end_date,
                next_renewal = EXCLUDED.next_renewal,
                category = EXCLUDED.category,
                card = EXCLUDED.card,
                external_ref = EXCLUDED.external_ref,
                auto_payment = EXCLUDED.auto_payment,
                notifications_enabled = EXCLUDED.notifications_enabled,
                updated_at = EXCLUDED.updated_at
            RETURNING {cols}
            "#,
            cols = SUBSCRIPTION_COLS
        ))
        .bind(subscription.id)
        .bind(subscription.owner_id)
        .bind(&subscription.name)
        .bind(&subscription.description)
        .bind(&subscription.plan_name)
        .bind(subscription.price)
        .bind(&subscription.currency)
        .bind(subscription.status)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.next_renewal)
        .bind(&subscription.category)
        .bind(&subscription.card)
        .bind(&subscription.external_ref)
        .bind(subscription.auto_payment)
        .bind(subscription.notifications_enabled)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }

    async fn append_price_change(&mut self, change: &PriceChange) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO price_changes ({}) VALUES ($1, $2, $3, $4, $5, $6)",
            PRICE_CHANGE_COLS
        ))
        .bind(change.id)
        .bind(change.subscription_id)
        .bind(change.old_price)
        .bind(change.new_price)
        .bind(change.changed_at)
        .bind(&change.reason)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn append_billing_event(&mut self, event: &BillingEvent) -> AppResult<EventAppend> {
        let result = sqlx::query(&format!(
            r#"
            INSERT INTO billing_events ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (external_event_ref) DO NOTHING
            "#,
            BILLING_EVENT_COLS
        ))
        .bind(event.id)
        .bind(event.subscription_id)
        .bind(event.kind)
        .bind(event.amount)
        .bind(&event.currency)
        .bind(&event.external_event_ref)
        .bind(&event.description)
        .bind(event.processed)
        .bind(event.occurred_at)
        .execute(&mut *self.tx)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            Ok(EventAppend::Duplicate)
        } else {
            Ok(EventAppend::Inserted)
        }
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(AppError::from)
    }
}
