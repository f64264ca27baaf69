use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    use_cases::analytics::{AnalyticsUseCases, DEFAULT_TREND_MONTHS},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/{owner_id}", get(get_dashboard))
        .route("/spending-trends/{owner_id}", get(get_spending_trends))
        .route("/categories/{owner_id}", get(get_categories))
}

#[derive(Deserialize)]
struct TrendQuery {
    months: Option<u32>,
}

async fn get_dashboard(
    State(use_cases): State<Arc<AnalyticsUseCases>>,
    Path(owner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.dashboard(owner_id).await?))
}

async fn get_spending_trends(
    State(use_cases): State<Arc<AnalyticsUseCases>>,
    Path(owner_id): Path<Uuid>,
    Query(query): Query<TrendQuery>,
) -> AppResult<impl IntoResponse> {
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    Ok(Json(use_cases.spending_trend(owner_id, months).await?))
}

async fn get_categories(
    State(use_cases): State<Arc<AnalyticsUseCases>>,
    Path(owner_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(use_cases.category_breakdown(owner_id).await?))
}
