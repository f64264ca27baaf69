use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        analytics::AnalyticsUseCases, reconciler::BillingReconciler,
        reminders::ReminderUseCases, subscription::SubscriptionUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub reconciler: Arc<BillingReconciler>,
    pub analytics_use_cases: Arc<AnalyticsUseCases>,
    pub reminder_use_cases: Arc<ReminderUseCases>,
}

impl FromRef<AppState> for Arc<SubscriptionUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.subscription_use_cases.clone()
    }
}

impl FromRef<AppState> for Arc<BillingReconciler> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.reconciler.clone()
    }
}

impl FromRef<AppState> for Arc<AnalyticsUseCases> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.analytics_use_cases.clone()
    }
}
