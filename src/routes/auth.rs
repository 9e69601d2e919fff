use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use eventdesk_user::{LoginInput, SignUpInput, User};
use serde::Serialize;
use serde_json::json;

use crate::{auth::generate_token, error::AppResult, server::AppState};

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /auth/sign-up
#[tracing::instrument(skip(state, input), fields(email = %input.email))]
pub async fn post_sign_up(
    State(state): State<AppState>,
    Json(input): Json<SignUpInput>,
) -> AppResult<impl IntoResponse> {
    let id = state.lifecycle.users.sign_up(input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// POST /auth/login
#[tracing::instrument(skip(state, input), fields(email = %input.email))]
pub async fn post_login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let user = state.lifecycle.users.login(input).await?;

    let token = generate_token(&state.jwt, &user.id, user.role)
        .map_err(|err| eventdesk_shared::Error::Server(err.to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse { token, user }))
}
