//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates an `AppState`
//! backed by in-memory mocks for testing HTTP endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::{owner::Owner, subscription::Subscription},
    infra::config::AppConfig,
    test_utils::{InMemoryLedgerStore, InMemoryOwnerDirectory, RecordingNotifier},
    use_cases::{
        analytics::AnalyticsUseCases, reconciler::BillingReconciler,
        reminders::ReminderUseCases, subscription::SubscriptionUseCases,
    },
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let owner = create_test_owner(|_| {});
/// let sub = create_test_subscription(owner.id, |s| s.name = "Spotify".to_string());
///
/// let (app_state, ledger, notifier) = TestAppStateBuilder::new()
///     .with_owner(owner)
///     .with_subscription(sub)
///     .build_with_mocks();
/// ```
#[derive(Default)]
pub struct TestAppStateBuilder {
    owners: Vec<Owner>,
    subscriptions: Vec<Subscription>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an owner the directory can resolve.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owners.push(owner);
        self
    }

    /// Seed the ledger with a subscription.
    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Build the AppState and return the ledger and notifier for assertions.
    pub fn build_with_mocks(self) -> (AppState, Arc<InMemoryLedgerStore>, Arc<RecordingNotifier>) {
        let ledger = Arc::new(InMemoryLedgerStore::with_subscriptions(self.subscriptions));
        let notifier = Arc::new(RecordingNotifier::new());
        let owners = Arc::new(InMemoryOwnerDirectory::with_owners(self.owners));

        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            ledger.clone(),
            owners,
            notifier.clone(),
        ));
        let reconciler = Arc::new(BillingReconciler::new(ledger.clone(), notifier.clone()));
        let analytics_use_cases = Arc::new(AnalyticsUseCases::new(ledger.clone()));
        let reminder_use_cases = Arc::new(ReminderUseCases::new(ledger.clone(), notifier.clone()));

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            database_url: String::new(),
            database_max_connections: 1,
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            resend_api_key: SecretString::new("re_test".into()),
            email_from: "noreply@example.com".to_string(),
            app_origin: Url::parse("http://localhost:3000").unwrap(),
            reminder_hour_utc: 16,
            notify_timeout_secs: 1,
            log_file: None,
        });

        let app_state = AppState {
            config,
            subscription_use_cases,
            reconciler,
            analytics_use_cases,
            reminder_use_cases,
        };

        (app_state, ledger, notifier)
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }
}
