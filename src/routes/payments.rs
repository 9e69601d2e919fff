use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use eventdesk_lifecycle::{CompletePaymentInput, PaymentOrder, Settlement};
use eventdesk_payment::Payment;
use serde::Serialize;

use crate::{auth::Auth, error::AppResult, server::AppState};

/// POST /registrations/{id}/payment - open a gateway order
pub async fn post_initiate(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(registration_id): Path<String>,
) -> AppResult<(StatusCode, Json<PaymentOrder>)> {
    let order = state
        .lifecycle
        .initiate_payment(&caller, &registration_id)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Serialize)]
pub struct CompletedPayment {
    #[serde(flatten)]
    pub payment: Payment,
    pub settlement: Settlement,
}

/// POST /payments/{id}/complete - signed confirmation from the checkout
pub async fn post_complete(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(payment_id): Path<String>,
    Json(input): Json<CompletePaymentInput>,
) -> AppResult<Json<CompletedPayment>> {
    let settlement = state
        .lifecycle
        .complete_payment(&caller, &payment_id, input)
        .await?;

    let payment = state.lifecycle.payment_for(&caller, &payment_id).await?;

    Ok(Json(CompletedPayment {
        payment,
        settlement,
    }))
}

/// POST /payments/{id}/fail - checkout abandoned or declined
pub async fn post_fail(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(payment_id): Path<String>,
) -> AppResult<StatusCode> {
    state.lifecycle.fail_payment(&caller, &payment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /payments/{id}
pub async fn get_payment(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(payment_id): Path<String>,
) -> AppResult<Json<Payment>> {
    Ok(Json(state.lifecycle.payment_for(&caller, &payment_id).await?))
}
