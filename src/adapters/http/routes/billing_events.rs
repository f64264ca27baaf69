use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    domain::entities::billing_event::BillingEventKind,
    use_cases::reconciler::{BillingReconciler, ReconcileOutcome},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/events", post(receive_billing_event))
}

/// A billing-provider event that has already been authenticated and decoded
/// by the webhook transport.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BillingCommand {
    Payment {
        external_subscription_ref: String,
        kind: BillingEventKind,
        amount: Decimal,
        currency: String,
        external_event_ref: String,
    },
    PriceChange {
        external_subscription_ref: String,
        new_price: Decimal,
    },
    UpcomingRenewal {
        external_subscription_ref: String,
        amount: Decimal,
    },
    Cancellation {
        external_subscription_ref: String,
    },
}

impl BillingCommand {
    fn name(&self) -> &'static str {
        match self {
            BillingCommand::Payment { .. } => "payment",
            BillingCommand::PriceChange { .. } => "price_change",
            BillingCommand::UpcomingRenewal { .. } => "upcoming_renewal",
            BillingCommand::Cancellation { .. } => "cancellation",
        }
    }
}

#[derive(Serialize)]
struct BillingEventResponse {
    outcome: ReconcileOutcome,
}

/// Returns `true` if the error is retryable (transient), meaning we should
/// return 5xx so the provider redelivers the event.
///
/// Returns `false` if the error is non-retryable (malformed event), meaning a
/// redelivery would fail the same way.
fn is_retryable_error(error: &AppError) -> bool {
    match error {
        // Transient errors - retry may succeed
        AppError::Database(_) => true,
        AppError::Internal(_) => true,

        // Expected conditions - won't change with retry
        AppError::NotFound => false,
        AppError::OwnerNotFound => false,
        AppError::InvalidInput(_) => false,
    }
}

async fn receive_billing_event(
    State(reconciler): State<Arc<BillingReconciler>>,
    Json(command): Json<BillingCommand>,
) -> AppResult<impl IntoResponse> {
    let command_name = command.name();

    match dispatch(&reconciler, command).await {
        Ok(outcome) => {
            info!(command = command_name, outcome = ?outcome, "Billing event handled");
            Ok(Json(BillingEventResponse { outcome }))
        }
        Err(e) if is_retryable_error(&e) => {
            error!(
                error = %e,
                command = command_name,
                retryable = true,
                "Billing event failed, provider should retry"
            );
            Err(e)
        }
        Err(e) => {
            tracing::debug!(
                error = %e,
                command = command_name,
                retryable = false,
                "Billing event rejected"
            );
            Err(AppError::InvalidInput(e.to_string()))
        }
    }
}

async fn dispatch(
    reconciler: &BillingReconciler,
    command: BillingCommand,
) -> AppResult<ReconcileOutcome> {
    match command {
        BillingCommand::Payment {
            external_subscription_ref,
            kind,
            amount,
            currency,
            external_event_ref,
        } => {
            reconciler
                .process_event(
                    &external_subscription_ref,
                    kind,
                    amount,
                    &currency,
                    &external_event_ref,
                )
                .await
        }
        BillingCommand::PriceChange {
            external_subscription_ref,
            new_price,
        } => {
            reconciler
                .handle_price_change(&external_subscription_ref, new_price)
                .await
        }
        BillingCommand::UpcomingRenewal {
            external_subscription_ref,
            amount,
        } => {
            reconciler
                .handle_upcoming_renewal(&external_subscription_ref, amount)
                .await
        }
        BillingCommand::Cancellation {
            external_subscription_ref,
        } => {
            reconciler
                .handle_external_cancellation(&external_subscription_ref)
                .await
        }
    }
}
