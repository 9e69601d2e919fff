use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use eventdesk_event::Event;
use eventdesk_lifecycle::RegisterOutcome;
use eventdesk_shared::Error;
use serde::Deserialize;

use crate::{auth::Auth, error::AppResult, server::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// GET /events - upcoming events, optionally narrowed by category or keyword
pub async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<Vec<Event>>> {
    let events = &state.lifecycle.events;

    let list = match (query.category, query.q) {
        (_, Some(q)) if !q.trim().is_empty() => events.search(&q).await?,
        (Some(category), _) if !category.trim().is_empty() => {
            events.list_by_category(category.trim()).await?
        }
        _ => events.list_upcoming().await?,
    };

    Ok(Json(list))
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Event>> {
    let Some(event) = state.lifecycle.events.find(id).await? else {
        return Err(Error::NotFound("event").into());
    };

    Ok(Json(event))
}

/// POST /events/{id}/register
pub async fn post_register(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<RegisterOutcome>)> {
    let outcome = state.lifecycle.register(&caller, &id).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /events/{id}/cancel
pub async fn post_cancel(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.lifecycle.cancel(&caller, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
