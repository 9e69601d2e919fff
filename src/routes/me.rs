use axum::{Json, extract::State};
use eventdesk_payment::UserPayment;
use eventdesk_registration::UserRegistration;
use eventdesk_shared::Error;
use eventdesk_user::{ProfilePatch, User};

use crate::{auth::Auth, error::AppResult, server::AppState};

/// GET /me
pub async fn get_me(State(state): State<AppState>, Auth(caller): Auth) -> AppResult<Json<User>> {
    let Some(user) = state.lifecycle.users.find(&caller.user_id).await? else {
        return Err(Error::NotFound("user").into());
    };

    Ok(Json(user))
}

/// POST /me - update name and phone
pub async fn post_me(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<User>> {
    state
        .lifecycle
        .users
        .update_profile(&caller.user_id, patch)
        .await?;

    get_me(State(state), Auth(caller)).await
}

/// GET /me/registrations
pub async fn get_my_registrations(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> AppResult<Json<Vec<UserRegistration>>> {
    Ok(Json(
        state
            .lifecycle
            .registrations
            .list_by_user(&caller.user_id)
            .await?,
    ))
}

/// GET /me/payments
pub async fn get_my_payments(
    State(state): State<AppState>,
    Auth(caller): Auth,
) -> AppResult<Json<Vec<UserPayment>>> {
    Ok(Json(
        state
            .lifecycle
            .payments
            .list_by_user(&caller.user_id)
            .await?,
    ))
}
