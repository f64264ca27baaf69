pub mod analytics;
pub mod billing_events;
pub mod subscriptions;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscriptions", subscriptions::router())
        .nest("/analytics", analytics::router())
        .nest("/billing", billing_events::router())
}
