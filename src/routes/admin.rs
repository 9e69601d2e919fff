use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use eventdesk_event::{CreateEventInput, EventPatch};
use eventdesk_lifecycle::{Dashboard, ReconcileReport};
use eventdesk_payment::EventPayment;
use eventdesk_registration::Participant;
use eventdesk_user::User;
use serde_json::json;

use crate::{auth::Auth, error::AppResult, server::AppState};

/// GET /admin/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> AppResult<Json<Dashboard>> {
    Ok(Json(state.lifecycle.dashboard(&caller).await?))
}

/// POST /admin/events
pub async fn post_create_event(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(input): Json<CreateEventInput>,
) -> AppResult<impl IntoResponse> {
    let id = state.lifecycle.create_event(&caller, input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// POST /admin/events/{id}
pub async fn post_update_event(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> AppResult<impl IntoResponse> {
    let updated = state.lifecycle.update_event(&caller, &id, patch).await?;

    Ok(Json(json!({ "updated": updated })))
}

/// DELETE /admin/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let notified = state.lifecycle.cancel_event(&caller, &id).await?;

    Ok(Json(json!({ "notified": notified })))
}

/// GET /admin/events/{id}/participants
pub async fn get_participants(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Participant>>> {
    Ok(Json(state.lifecycle.participants(&caller, &id).await?))
}

/// GET /admin/events/{id}/payments
pub async fn get_event_payments(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<EventPayment>>> {
    Ok(Json(state.lifecycle.event_payments(&caller, &id).await?))
}

/// GET /admin/users
pub async fn get_users(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.lifecycle.list_users(&caller).await?))
}

/// POST /admin/reconcile
pub async fn post_reconcile(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> AppResult<Json<ReconcileReport>> {
    caller.require_admin()?;

    Ok(Json(state.lifecycle.reconcile().await?))
}
