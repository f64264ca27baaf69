use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    domain::entities::subscription::{NewSubscription, SubscriptionUpdate},
    use_cases::subscription::SubscriptionUseCases,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_subscription))
        .route(
            "/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(cancel_subscription),
        )
        .route("/{id}/price-history", get(get_price_history))
        .route("/{id}/payment-history", get(get_payment_history))
        .route("/owner/{owner_id}", get(list_owner_subscriptions))
        .route("/owner/{owner_id}/active", get(list_active_subscriptions))
}

async fn create_subscription(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Json(payload): Json<NewSubscription>,
) -> AppResult<impl IntoResponse> {
    let subscription = use_cases.create(payload).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn get_subscription(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.get(id).await?))
}

async fn update_subscription(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubscriptionUpdate>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.apply_manual_update(id, payload).await?))
}

async fn cancel_subscription(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.cancel(id).await?))
}

async fn get_price_history(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.price_history(id).await?))
}

async fn get_payment_history(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.payment_history(id).await?))
}

async fn list_owner_subscriptions(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(owner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.list_for_owner(owner_id).await?))
}

async fn list_active_subscriptions(
    State(use_cases): State<Arc<SubscriptionUseCases>>,
    Path(owner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.list_active(owner_id).await?))
}
