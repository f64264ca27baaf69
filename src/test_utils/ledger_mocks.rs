//! In-memory implementation of the ledger ports.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::ledger_store::{EventAppend, LedgerStore, LedgerTx},
    domain::entities::{
        billing_event::BillingEvent, price_change::PriceChange,
        subscription::{Subscription, SubscriptionStatus},
    },
};

#[derive(Default)]
struct LedgerState {
    subscriptions: Vec<Subscription>,
    price_changes: Vec<PriceChange>,
    billing_events: Vec<BillingEvent>,
}

impl LedgerState {
    fn upsert(&mut self, subscription: Subscription) {
        match self
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription.id)
        {
            Some(existing) => *existing = subscription,
            None => self.subscriptions.push(subscription),
        }
    }

    fn owner_of(&self, subscription_id: Uuid) -> Option<Uuid> {
        self.subscriptions
            .iter()
            .find(|s| s.id == subscription_id)
            .map(|s| s.owner_id)
    }
}

// ============================================================================
// InMemoryLedgerStore
// ============================================================================

/// Transactions are serialized through a single async gate, so a unit of work
/// behaves like it holds every row lock at once.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: Arc<Mutex<LedgerState>>,
    gate: Arc<AsyncMutex<()>>,
    fail_commits: Arc<AtomicBool>,
    hide_committed_events: Arc<AtomicBool>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let store = Self::default();
        store.state.lock().unwrap().subscriptions = subscriptions;
        store
    }

    pub fn insert_price_change(&self, change: PriceChange) {
        self.state.lock().unwrap().price_changes.push(change);
    }

    pub fn insert_billing_event(&self, event: BillingEvent) {
        self.state.lock().unwrap().billing_events.push(event);
    }

    /// Makes every following commit fail with a database error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Hides committed events from transactional lookups but not from the
    /// unique check on append, like an insert that commits between the two.
    pub fn hide_committed_events(&self, hide: bool) {
        self.hide_committed_events.store(hide, Ordering::SeqCst);
    }

    pub fn subscription(&self, id: Uuid) -> Option<Subscription> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.state.lock().unwrap().subscriptions.clone()
    }

    pub fn price_changes(&self) -> Vec<PriceChange> {
        self.state.lock().unwrap().price_changes.clone()
    }

    pub fn billing_events(&self) -> Vec<BillingEvent> {
        self.state.lock().unwrap().billing_events.clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get_subscription(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.subscription(id))
    }

    async fn get_subscription_by_external_ref(
        &self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| s.external_ref.as_deref() == Some(external_ref))
            .cloned())
    }

    async fn find_event_by_external_ref(
        &self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .billing_events
            .iter()
            .find(|e| e.external_event_ref == external_event_ref)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Subscription>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| s.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_active_renewing_on(&self, date: NaiveDate) -> AppResult<Vec<Subscription>> {
        let mut due: Vec<Subscription> = self
            .state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && s.notifications_enabled
                    && s.next_renewal.date() == date
            })
            .cloned()
            .collect();
        due.sort_by_key(|s| s.next_renewal);
        Ok(due)
    }

    async fn list_price_changes(&self, subscription_id: Uuid) -> AppResult<Vec<PriceChange>> {
        let mut changes: Vec<PriceChange> = self
            .state
            .lock()
            .unwrap()
            .price_changes
            .iter()
            .filter(|c| c.subscription_id == subscription_id)
            .cloned()
            .collect();
        changes.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(changes)
    }

    async fn list_billing_events(&self, subscription_id: Uuid) -> AppResult<Vec<BillingEvent>> {
        let mut events: Vec<BillingEvent> = self
            .state
            .lock()
            .unwrap()
            .billing_events
            .iter()
            .filter(|e| e.subscription_id == subscription_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events)
    }

    async fn list_recent_price_changes(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<PriceChange>> {
        let state = self.state.lock().unwrap();
        let mut changes: Vec<PriceChange> = state
            .price_changes
            .iter()
            .filter(|c| c.changed_at >= since && state.owner_of(c.subscription_id) == Some(owner_id))
            .cloned()
            .collect();
        changes.sort_by(|a, b| b.changed_at.cmp(&a.changed_at));
        Ok(changes)
    }

    async fn list_recent_billing_events(
        &self,
        owner_id: Uuid,
        since: NaiveDateTime,
    ) -> AppResult<Vec<BillingEvent>> {
        let state = self.state.lock().unwrap();
        let mut events: Vec<BillingEvent> = state
            .billing_events
            .iter()
            .filter(|e| e.occurred_at >= since && state.owner_of(e.subscription_id) == Some(owner_id))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(events)
    }

    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        let gate = self.gate.clone().lock_owned().await;
        Ok(Box::new(InMemoryLedgerTx {
            _gate: gate,
            state: self.state.clone(),
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
            hide_committed_events: self.hide_committed_events.load(Ordering::SeqCst),
            subscriptions: Vec::new(),
            price_changes: Vec::new(),
            billing_events: Vec::new(),
        }))
    }
}

// ============================================================================
// InMemoryLedgerTx
// ============================================================================

pub struct InMemoryLedgerTx {
    _gate: OwnedMutexGuard<()>,
    state: Arc<Mutex<LedgerState>>,
    fail_commit: bool,
    hide_committed_events: bool,
    subscriptions: Vec<Subscription>,
    price_changes: Vec<PriceChange>,
    billing_events: Vec<BillingEvent>,
}

impl InMemoryLedgerTx {
    fn find_subscription(&self, pred: impl Fn(&Subscription) -> bool) -> Option<Subscription> {
        if let Some(staged) = self.subscriptions.iter().rev().find(|s| pred(s)) {
            return Some(staged.clone());
        }
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| pred(s))
            .cloned()
    }

    fn event_exists(&self, external_event_ref: &str) -> Option<BillingEvent> {
        if let Some(staged) = self
            .billing_events
            .iter()
            .find(|e| e.external_event_ref == external_event_ref)
        {
            return Some(staged.clone());
        }
        self.state
            .lock()
            .unwrap()
            .billing_events
            .iter()
            .find(|e| e.external_event_ref == external_event_ref)
            .cloned()
    }
}

#[async_trait]
impl LedgerTx for InMemoryLedgerTx {
    async fn get_subscription(&mut self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.find_subscription(|s| s.id == id))
    }

    async fn get_subscription_by_external_ref(
        &mut self,
        external_ref: &str,
    ) -> AppResult<Option<Subscription>> {
        Ok(self.find_subscription(|s| s.external_ref.as_deref() == Some(external_ref)))
    }

    async fn find_event_by_external_ref(
        &mut self,
        external_event_ref: &str,
    ) -> AppResult<Option<BillingEvent>> {
        if self.hide_committed_events {
            return Ok(self
                .billing_events
                .iter()
                .find(|e| e.external_event_ref == external_event_ref)
                .cloned());
        }
        Ok(self.event_exists(external_event_ref))
    }

    async fn save(&mut self, subscription: &Subscription) -> AppResult<Subscription> {
        self.subscriptions.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn append_price_change(&mut self, change: &PriceChange) -> AppResult<()> {
        self.price_changes.push(change.clone());
        Ok(())
    }

    async fn append_billing_event(&mut self, event: &BillingEvent) -> AppResult<EventAppend> {
        if self.event_exists(&event.external_event_ref).is_some() {
            return Ok(EventAppend::Duplicate);
        }
        self.billing_events.push(event.clone());
        Ok(EventAppend::Inserted)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let tx = *self;
        if tx.fail_commit {
            return Err(AppError::Database("Simulated commit failure".into()));
        }

        let mut state = tx.state.lock().unwrap();
        for subscription in tx.subscriptions {
            state.upsert(subscription);
        }
        state.price_changes.extend(tx.price_changes);
        state.billing_events.extend(tx.billing_events);
        Ok(())
    }
}
